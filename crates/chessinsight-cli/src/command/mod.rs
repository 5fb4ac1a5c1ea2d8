use std::{io, path::PathBuf};

use chessinsight_analysis::config::AnalysisConfig;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use self::{analyze::AnalyzeArg, normalize::NormalizeArg};
use crate::util;

mod analyze;
mod normalize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Extract normalized rows from a game archive and save them as CSV
    Normalize(#[clap(flatten)] NormalizeArg),
    /// Run the win-rate analyses over a row table or a game archive
    Analyze(#[clap(flatten)] AnalyzeArg),
}

/// Settings shared by every command that extracts rows.
#[derive(Debug, Clone, Args)]
pub(crate) struct ConfigArg {
    /// Account whose games are analyzed
    #[arg(long)]
    pub username: Option<String>,

    /// Only use games of this time class (bullet, blitz, rapid, daily)
    #[arg(long)]
    pub time_class: Option<String>,

    /// JSON file with analysis settings; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub fn load(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<AnalysisConfig, _>("config", path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(username) = &self.username {
            config.tracked_username.clone_from(username);
        }
        if let Some(time_class) = &self.time_class {
            config.time_class = Some(time_class.clone());
        }
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.log_json);
    match &args.mode {
        Mode::Normalize(arg) => normalize::run(arg)?,
        Mode::Analyze(arg) => analyze::run(arg)?,
    }
    Ok(())
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}
