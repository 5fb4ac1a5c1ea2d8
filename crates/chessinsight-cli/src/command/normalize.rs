use std::path::PathBuf;

use anyhow::Context;
use chessinsight_analysis::extract;
use clap::Args;

use crate::{command::ConfigArg, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct NormalizeArg {
    /// Path to the game archive JSON file
    pub games: PathBuf,

    #[clap(flatten)]
    pub config: ConfigArg,

    /// Output CSV path (stdout if omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &NormalizeArg) -> anyhow::Result<()> {
    let config = arg.config.load()?;
    config.validate()?;

    let archive = util::read_archive_file(&arg.games)?;
    tracing::info!(records = archive.entries().len(), path = %arg.games.display(), "loaded game archive");

    let (store, report) = extract::extract_archive(&archive, &config);
    if report.extracted == 0 {
        tracing::warn!(
            username = %config.tracked_username,
            "no games of the tracked player were found"
        );
    }

    let mut output = util::Output::from_output_path(arg.output.clone())?;
    store
        .write_csv(&mut output)
        .with_context(|| format!("Failed to write rows to {}", output.display_path()))?;
    tracing::info!(rows = store.len(), output = %output.display_path(), "saved row table");

    Ok(())
}
