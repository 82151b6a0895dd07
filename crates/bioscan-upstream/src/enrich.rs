use crate::error::Result;
use async_trait::async_trait;
use bioscan_core::{EnrichmentSuggestion, ProfileSummary};

/// Suggests descriptive fields for a profile from its public text.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn suggest(&self, profile: &ProfileSummary) -> Result<EnrichmentSuggestion>;
}

const SYSTEM_PROMPT: &str = "You describe social media accounts for a lead list. \
Reply with a JSON object with the keys \"description\" (one sentence about what the account \
does), \"location\" (city or region if stated, else null) and \"category\" (a short business \
category, else null). Do not invent contact details.";

pub fn build_prompt(profile: &ProfileSummary) -> String {
    let mut lines = vec![format!("Username: {}", profile.username)];
    if !profile.full_name.is_empty() {
        lines.push(format!("Name: {}", profile.full_name));
    }
    if let Some(category) = &profile.category {
        lines.push(format!("Listed category: {category}"));
    }
    if let Some(location) = &profile.location {
        lines.push(format!("Listed location: {location}"));
    }
    if let Some(url) = &profile.external_url {
        lines.push(format!("Link: {url}"));
    }
    lines.push(format!("Bio: {}", profile.bio));
    lines.join("\n")
}

#[cfg(feature = "llm-enrich")]
pub use openai::OpenAiEnricher;

#[cfg(feature = "llm-enrich")]
mod openai {
    use super::{build_prompt, Enricher, SYSTEM_PROMPT};
    use crate::error::{Result, UpstreamError};
    use async_trait::async_trait;
    use bioscan_core::{EnrichmentSuggestion, ProfileSummary};
    use reqwest::Client;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use url::Url;

    /// Enricher for any OpenAI-compatible chat completions endpoint.
    pub struct OpenAiEnricher {
        client: Client,
        endpoint: Url,
        api_key: String,
        model: String,
    }

    #[derive(Debug, Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: Vec<ChatMessage<'a>>,
        response_format: ResponseFormat,
        temperature: f32,
    }

    #[derive(Debug, Serialize)]
    struct ChatMessage<'a> {
        role: &'a str,
        content: &'a str,
    }

    #[derive(Debug, Serialize)]
    struct ResponseFormat {
        #[serde(rename = "type")]
        kind: &'static str,
    }

    #[derive(Debug, Deserialize)]
    struct ChatResponse {
        choices: Vec<ChatChoice>,
    }

    #[derive(Debug, Deserialize)]
    struct ChatChoice {
        message: ChatReply,
    }

    #[derive(Debug, Deserialize)]
    struct ChatReply {
        #[serde(default)]
        content: Option<String>,
    }

    impl OpenAiEnricher {
        pub fn new(
            api_base: &str,
            api_key: impl Into<String>,
            model: impl Into<String>,
            timeout: Duration,
        ) -> Result<Self> {
            let mut base = Url::parse(api_base)?;
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            let endpoint = base.join("chat/completions")?;
            let client = Client::builder().timeout(timeout).build()?;
            Ok(Self {
                client,
                endpoint,
                api_key: api_key.into(),
                model: model.into(),
            })
        }

        pub fn endpoint(&self) -> &Url {
            &self.endpoint
        }
    }

    #[async_trait]
    impl Enricher for OpenAiEnricher {
        async fn suggest(&self, profile: &ProfileSummary) -> Result<EnrichmentSuggestion> {
            let prompt = build_prompt(profile);
            let request = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: &prompt,
                    },
                ],
                response_format: ResponseFormat {
                    kind: "json_object",
                },
                temperature: 0.2,
            };

            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(UpstreamError::Http {
                    status: status.as_u16(),
                    message: body,
                });
            }
            parse_completion(&body)
        }
    }

    /// Extracts the suggestion from a chat completions response body.
    pub fn parse_completion(body: &str) -> Result<EnrichmentSuggestion> {
        let response: ChatResponse = serde_json::from_str(body)?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Decode("completion without content".to_string()))?;
        let suggestion: EnrichmentSuggestion = serde_json::from_str(content.trim())?;
        Ok(suggestion)
    }

    #[cfg(test)]
    mod tests {
        use super::{parse_completion, OpenAiEnricher};
        use std::time::Duration;

        #[test]
        fn endpoint_joins_api_base() {
            let enricher = OpenAiEnricher::new(
                "https://api.openai.com/v1",
                "sk-test",
                "gpt-4o-mini",
                Duration::from_secs(5),
            )
            .expect("enricher");
            assert_eq!(
                enricher.endpoint().as_str(),
                "https://api.openai.com/v1/chat/completions"
            );
        }

        #[test]
        fn parses_json_object_reply() {
            let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"description\":\"Neighborhood bakery\",\"location\":\"Austin, TX\",\"category\":null}"}}]}"#;
            let suggestion = parse_completion(body).expect("parse");
            assert_eq!(suggestion.description.as_deref(), Some("Neighborhood bakery"));
            assert_eq!(suggestion.location.as_deref(), Some("Austin, TX"));
            assert!(suggestion.category.is_none());
        }

        #[test]
        fn missing_content_is_decode_error() {
            let body = r#"{"choices":[]}"#;
            assert!(parse_completion(body).is_err());
        }
    }
}
