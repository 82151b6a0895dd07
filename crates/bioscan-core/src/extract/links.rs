use regex::Regex;
use std::sync::LazyLock;

/// Hosts treated as social rather than a profile's own website.
const SOCIAL_HOSTS: [&str; 3] = ["instagram.com", "facebook.com", "fb.com"];

/// Top-level domains accepted for scheme-less links that carry neither `www.` nor a path.
const BARE_LINK_TLDS: [&str; 14] = [
    "com", "net", "org", "io", "co", "me", "shop", "store", "biz", "info", "app", "dev", "us",
    "uk",
];

static PAGE_URL_STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?(?:facebook|fb)\.com/[a-z0-9.]+").expect("page regex")
});
static PAGE_URL_BROAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?(?:facebook|fb)\.com/[a-z0-9./-]+").expect("page regex")
});
static PAGE_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:facebook|fb)\.com/[a-z0-9.]+").expect("page regex"));
static HANDLE_BEFORE_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9._%+-])@([a-z0-9.]+).*facebook").expect("page regex")
});
static HANDLE_AFTER_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)facebook.*[^a-z0-9._%+-]@([a-z0-9.]+)").expect("page regex")
});
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://)?(?:www\.)?[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}(?:/[^\s]*)?")
        .expect("link regex")
});

enum PageMatch {
    /// The whole match is a link.
    Link,
    /// Capture group 1 is a bare handle.
    Handle,
}

struct PagePattern {
    regex: &'static LazyLock<Regex>,
    kind: PageMatch,
}

/// Most to least specific.
static PAGE_PATTERNS: [PagePattern; 5] = [
    PagePattern {
        regex: &PAGE_URL_STRICT,
        kind: PageMatch::Link,
    },
    PagePattern {
        regex: &PAGE_URL_BROAD,
        kind: PageMatch::Link,
    },
    PagePattern {
        regex: &PAGE_BARE,
        kind: PageMatch::Link,
    },
    PagePattern {
        regex: &HANDLE_BEFORE_PAGE,
        kind: PageMatch::Handle,
    },
    PagePattern {
        regex: &HANDLE_AFTER_PAGE,
        kind: PageMatch::Handle,
    },
];

pub fn first_page_link(text: &str) -> Option<String> {
    page_candidates(text)
        .into_iter()
        .next()
        .map(|candidate| normalize_page_link(&candidate))
}

/// All page candidates in pattern order, then appearance order within a pattern.
/// Handle matches are returned as `@handle`.
fn page_candidates(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for pattern in &PAGE_PATTERNS {
        match pattern.kind {
            PageMatch::Link => {
                out.extend(
                    pattern
                        .regex
                        .find_iter(text)
                        .map(|found| trim_link(found.as_str()).to_string()),
                );
            }
            PageMatch::Handle => {
                out.extend(pattern.regex.captures_iter(text).filter_map(|caps| {
                    let handle = caps.get(1)?.as_str().trim_end_matches('.');
                    if handle.is_empty() {
                        None
                    } else {
                        Some(format!("@{handle}"))
                    }
                }));
            }
        }
    }
    out
}

fn normalize_page_link(candidate: &str) -> String {
    let with_scheme = if has_scheme(candidate) {
        candidate.to_string()
    } else {
        format!("https://{candidate}")
    };
    let lower = with_scheme.to_ascii_lowercase();
    if lower.contains("facebook.com") || lower.contains("fb.com") {
        return with_scheme;
    }
    format!("https://facebook.com/{}", candidate.trim_start_matches('@'))
}

/// Prefers the first link whose host is not social; falls back to the first link at all.
pub fn first_website(text: &str) -> Option<String> {
    let links = website_candidates(text);
    let preferred = links
        .iter()
        .position(|link| !is_social_host(link))
        .unwrap_or(0);
    links.into_iter().nth(preferred).map(|link| {
        if has_scheme(&link) {
            link
        } else {
            format!("https://{link}")
        }
    })
}

fn website_candidates(text: &str) -> Vec<String> {
    LINK.find_iter(text)
        .filter_map(|found| {
            let link = trim_link(found.as_str());
            let before = text[..found.start()].chars().next_back();
            let after = text[found.end()..].chars().next();
            if before.is_some_and(|ch| matches!(ch, '@' | '.' | '/')) || after == Some('@') {
                return None;
            }
            if !has_scheme(link) && in_email_token(text, found.start(), found.end()) {
                return None;
            }
            if !has_scheme(link) && !is_plausible_bare_link(link) {
                return None;
            }
            Some(link.to_string())
        })
        .collect()
}

/// Whether the whitespace-delimited token around `start..end` has an `@` outside the match.
fn in_email_token(text: &str, start: usize, end: usize) -> bool {
    let token_start = text[..start]
        .rfind(char::is_whitespace)
        .map_or(0, |idx| idx + 1);
    let token_end = text[end..]
        .find(char::is_whitespace)
        .map_or(text.len(), |idx| end + idx);
    text[token_start..start].contains('@') || text[end..token_end].contains('@')
}

fn is_plausible_bare_link(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    if lower.starts_with("www.") || lower.contains('/') {
        return true;
    }
    lower
        .rsplit('.')
        .next()
        .is_some_and(|tld| BARE_LINK_TLDS.contains(&tld))
}

fn is_social_host(link: &str) -> bool {
    let host = host_of(link).to_ascii_lowercase();
    SOCIAL_HOSTS.iter().any(|social| host.contains(social))
}

fn host_of(link: &str) -> &str {
    let rest = link.split_once("://").map(|(_, rest)| rest).unwrap_or(link);
    rest.split(['/', '?', '#']).next().unwrap_or(rest)
}

fn has_scheme(link: &str) -> bool {
    let lower = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn trim_link(link: &str) -> &str {
    link.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '\'', '"'])
}
