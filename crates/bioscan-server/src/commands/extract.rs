use super::print_json;
use anyhow::{Context as _, Result};
use bioscan_core::ProfileSummary;
use bioscan_server::error::invalid_input;
use clap::Args;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Raw profile JSON; reads stdin when omitted or `-`
    pub file: Option<PathBuf>,
}

pub fn extract(args: ExtractArgs) -> Result<()> {
    let text = match args.file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(&path)
            .with_context(|| format!("read profile {}", path.display()))?,
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .with_context(|| "read profile from stdin")?;
            text
        }
    };

    let raw: Value = serde_json::from_str(&text).with_context(|| "parse profile json")?;
    let raw = match raw {
        Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
            map.remove("user").unwrap_or_default()
        }
        Value::Object(map) => Value::Object(map),
        _ => return Err(invalid_input("profile must be a JSON object")),
    };
    print_json(&ProfileSummary::from_raw(&raw))
}
