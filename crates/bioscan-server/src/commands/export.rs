use super::Context;
use anyhow::{Context as _, Result};
use bioscan_store::csv::write_summaries;
use bioscan_store::paths;
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long)]
    pub list: String,
    /// Output CSV path; writes to stdout when omitted
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn export(ctx: &Context, args: ExportArgs) -> Result<()> {
    let list = ctx
        .lists()
        .load(&args.list)
        .with_context(|| format!("load list {}", args.list))?;

    match args.out {
        Some(path) => {
            paths::ensure_parent_dir(&path)?;
            let file = File::create(&path)
                .with_context(|| format!("create {}", path.display()))?;
            write_summaries(BufWriter::new(file), &list.profiles)?;
            info!(
                list = %list.name,
                rows = list.profiles.len(),
                path = %path.display(),
                "exported"
            );
        }
        None => {
            write_summaries(io::stdout().lock(), &list.profiles)?;
        }
    }
    Ok(())
}
