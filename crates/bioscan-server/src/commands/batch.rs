use super::{print_json, runtime, Context};
use anyhow::{Context as _, Result};
use bioscan_server::check_batch_size;
use bioscan_server::error::invalid_input;
use bioscan_server::util::now_utc;
use bioscan_store::csv::read_usernames;
use bioscan_store::SavedList;
use clap::Args;
use serde_json::json;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// CSV file with a `username` column (or usernames in the first column)
    #[arg(long)]
    pub input: PathBuf,
    /// Save the results as a named list
    #[arg(long)]
    pub save: Option<String>,
}

pub fn batch(ctx: Context, args: BatchArgs) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("open {}", args.input.display()))?;
    let usernames = read_usernames(file)?;
    if usernames.is_empty() {
        return Err(invalid_input(format!(
            "no usernames found in {}",
            args.input.display()
        )));
    }
    check_batch_size(&usernames)?;

    let state = ctx.build_state()?;
    let profiles = runtime()?.block_on(state.service.batch(&usernames));

    if let Some(name) = args.save {
        let list = SavedList {
            name,
            target_username: None,
            saved_at: now_utc(),
            profiles: profiles.clone(),
        };
        let path = state.lists.save(&list)?;
        info!(list = %list.name, path = %path.display(), "batch saved");
    }

    print_json(&json!({ "count": profiles.len(), "profiles": profiles }))
}
