//! Win-rate analysis command
//!
//! Loads normalized rows (or extracts them from an archive on the fly), runs
//! every grouped analysis and prints the report as text tables or JSON.

mod table;

use std::{io::Write, path::PathBuf};

use anyhow::Context;
use chessinsight_analysis::{
    analysis::{AnalysisReport, Analyzer},
    config::{AnalysisConfig, EloBucketScheme},
};
use chessinsight_stats::hypothesis::VarianceAssumption;
use clap::{Args, ValueEnum};

use self::table::WinRateTableRow;
use crate::{
    command::ConfigArg,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Path to a row table (.csv) or a game archive (.json)
    pub input: PathBuf,

    #[clap(flatten)]
    pub config: ConfigArg,

    /// Elo differential bucketing
    #[arg(long)]
    pub elo_scheme: Option<EloScheme>,

    /// Minimum number of games for an opening to be analyzed
    #[arg(long)]
    pub min_opening_games: Option<usize>,

    /// Two-sample test variant
    #[arg(long)]
    pub variance: Option<Variance>,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Output path (stdout if omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum EloScheme {
    /// Edges -500, 0, 100, 200
    Wide,
    /// Edges -100, 0, 100
    Narrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Variance {
    /// Welch's t-test (unequal variances)
    Welch,
    /// Student's t-test (pooled variance)
    Student,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl AnalyzeArg {
    fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = self.config.load()?;
        if let Some(scheme) = self.elo_scheme {
            config.elo_scheme = match scheme {
                EloScheme::Wide => EloBucketScheme::Wide,
                EloScheme::Narrow => EloBucketScheme::Narrow,
            };
        }
        if let Some(min_games) = self.min_opening_games {
            config.min_opening_games = min_games;
        }
        if let Some(variance) = self.variance {
            config.variance = match variance {
                Variance::Welch => VarianceAssumption::Unequal,
                Variance::Student => VarianceAssumption::Equal,
            };
        }
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = arg.analysis_config()?;
    let (store, extraction) = util::load_rows(&arg.input, &config)?;
    if store.is_empty() {
        tracing::warn!(input = %arg.input.display(), "no rows to analyze");
    }

    let mut report = Analyzer::new(&store, &config)?.report();
    if let Some(extraction) = extraction {
        report = report.with_extraction(extraction);
    }

    match arg.format {
        OutputFormat::Json => Output::save_json(&report, arg.output.clone())?,
        OutputFormat::Text => {
            let mut output = Output::from_output_path(arg.output.clone())?;
            write_report(&mut output, &report)
                .and_then(|()| output.flush())
                .with_context(|| format!("Failed to write report to {}", output.display_path()))?;
        }
    }

    Ok(())
}

fn write_report<W>(out: &mut W, report: &AnalysisReport) -> std::io::Result<()>
where
    W: Write,
{
    writeln!(out, "Game Analysis Report ({})", report.tracked_username)?;
    writeln!(out, "==========================================\n")?;

    table::write_legend(out, report.significance_level)?;
    writeln!(out)?;

    if let Some(extraction) = &report.extraction {
        table::write_extraction(out, extraction)?;
        writeln!(out)?;
    }

    write_overall(out, report)?;
    writeln!(out)?;

    writeln!(out, "Win Rate by Color")?;
    let rows = WinRateTableRow::from_table(&report.by_color.table);
    table::write_win_rate_table(out, "Color", "Win Rate", &rows)?;
    writeln!(out)?;

    let time = &report.by_time_of_day;
    writeln!(out, "Win Rate by Time of Day (UTC)")?;
    let rows = WinRateTableRow::from_table(&time.table);
    table::write_win_rate_table(out, "Period", "Win Rate", &rows)?;
    if time.missing_timestamp > 0 {
        writeln!(out, "  ({} games without end time left out)", time.missing_timestamp)?;
    }
    table::write_test(out, "Day (<= 17h) vs night t-test", &time.day_vs_night)?;
    writeln!(out)?;

    let elo = &report.by_elo_diff;
    writeln!(out, "Score by Elo Differential")?;
    let rows = WinRateTableRow::from_table(&elo.table);
    table::write_win_rate_table(out, "Elo Diff", "Score", &rows)?;
    if elo.missing_elo_diff > 0 {
        writeln!(out, "  ({} games without both ratings left out)", elo.missing_elo_diff)?;
    }
    table::write_test(out, "ANOVA across buckets", &elo.anova)?;
    writeln!(out)?;

    let openings = &report.by_opening;
    writeln!(out, "Score by Opening (at least {} games)", openings.min_games)?;
    let mut rows = WinRateTableRow::from_table(&openings.table);
    rows.sort_by(|a, b| b.stats.count.cmp(&a.stats.count).then_with(|| a.label.cmp(&b.label)));
    table::write_win_rate_table(out, "Opening", "Score", &rows)?;
    if openings.excluded_openings > 0 {
        writeln!(
            out,
            "  ({} openings with {} games below the threshold left out)",
            openings.excluded_openings, openings.excluded_games
        )?;
    }
    table::write_test(out, "ANOVA across openings", &openings.anova)?;
    writeln!(out)?;

    let castling = &report.by_castling;
    writeln!(out, "Score by Castling")?;
    let rows = WinRateTableRow::from_table(&castling.table);
    table::write_win_rate_table(out, "Castling", "Score", &rows)?;
    table::write_test(out, "ANOVA across categories", &castling.anova)?;
    table::write_test(out, "Castled vs not t-test", &castling.castled_vs_not)?;
    writeln!(out)?;

    writeln!(out, "Game Length")?;
    let length = &report.game_length;
    table::write_descriptive(out, "Moves", length.move_count.as_ref())?;
    table::write_descriptive(out, "Duration (min)", length.duration_minutes.as_ref())?;

    Ok(())
}

fn write_overall<W>(out: &mut W, report: &AnalysisReport) -> std::io::Result<()>
where
    W: Write,
{
    let overall = &report.overall;
    let percent = |rate: Option<f64>| rate.map_or("N/A".to_owned(), |r| format!("{:.1}%", r * 100.0));

    writeln!(out, "Overall")?;
    writeln!(out, "  Games      : {}", overall.games)?;
    writeln!(
        out,
        "  W / D / L  : {} / {} / {}",
        overall.wins, overall.draws, overall.losses
    )?;
    if overall.unknown > 0 {
        writeln!(out, "  Unknown    : {}", overall.unknown)?;
    }
    writeln!(out, "  Win Rate   : {}", percent(overall.win_rate_strict))?;
    writeln!(out, "  Score      : {}", percent(overall.win_rate_with_draws))
}
