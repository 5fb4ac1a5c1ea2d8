//! Text table rendering for analysis reports

use std::io::{self, Write};

use chessinsight_analysis::{
    aggregate::{GroupStats, GroupTable, SignificanceTest},
    extract::ExtractionReport,
};
use chessinsight_stats::descriptive::DescriptiveStats;

const LABEL_WIDTH: usize = 28;

/// A row in a win-rate table
pub(super) struct WinRateTableRow<'a> {
    /// Label for this row (e.g., color, bucket, opening)
    pub label: String,
    pub stats: &'a GroupStats,
}

impl<'a> WinRateTableRow<'a> {
    pub fn from_table<K>(table: &'a GroupTable<K>) -> Vec<Self>
    where
        K: ToString,
    {
        table
            .iter()
            .map(|entry| WinRateTableRow {
                label: entry.group.to_string(),
                stats: &entry.stats,
            })
            .collect()
    }
}

fn write_win_rate_table_header<W>(out: &mut W, label_col: &str, rate_col: &str) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        out,
        "  {label_col:<LABEL_WIDTH$} {:>8} {:>12} {:>6}",
        "Games", rate_col, "Note",
    )?;
    // label + games(8) + rate(12) + note(6) + spaces(3)
    writeln!(out, "  {}", "-".repeat(LABEL_WIDTH + 29))
}

fn write_win_rate_table_row<W>(out: &mut W, row: &WinRateTableRow) -> io::Result<()>
where
    W: Write,
{
    let note = if row.stats.low_confidence { "low" } else { "" };
    writeln!(
        out,
        "  {:<LABEL_WIDTH$} {:>8} {:>11.1}% {:>6}",
        row.label,
        row.stats.count,
        row.stats.mean * 100.0,
        note,
    )
}

/// Write a formatted win-rate table
pub(super) fn write_win_rate_table<W>(
    out: &mut W,
    label_col: &str,
    rate_col: &str,
    rows: &[WinRateTableRow],
) -> io::Result<()>
where
    W: Write,
{
    if rows.is_empty() {
        return writeln!(out, "  (no games)");
    }
    write_win_rate_table_header(out, label_col, rate_col)?;
    for row in rows {
        write_win_rate_table_row(out, row)?;
    }
    Ok(())
}

/// Write the outcome of a significance test on one line
pub(super) fn write_test<W>(out: &mut W, name: &str, test: &SignificanceTest) -> io::Result<()>
where
    W: Write,
{
    match test {
        SignificanceTest::Tested(outcome) => {
            let verdict = if outcome.significant {
                "significant"
            } else {
                "not significant"
            };
            writeln!(
                out,
                "  {name}: statistic = {:.4}, p = {:.4} ({verdict})",
                outcome.statistic, outcome.p_value,
            )
        }
        SignificanceTest::InsufficientData {
            testable_groups,
            required_groups,
        } => writeln!(
            out,
            "  {name}: not enough data ({testable_groups} of {required_groups} required groups have at least 2 games)",
        ),
    }
}

/// Write a descriptive statistics line, or a placeholder when there is no data
pub(super) fn write_descriptive<W>(
    out: &mut W,
    label: &str,
    stats: Option<&DescriptiveStats>,
) -> io::Result<()>
where
    W: Write,
{
    match stats {
        Some(stats) => writeln!(
            out,
            "  {label:<18} n={:<6} min={:<8.1} median={:<8.1} mean={:<8.1} max={:<8.1} std={:.1}",
            stats.count, stats.min, stats.median, stats.mean, stats.max, stats.std_dev,
        ),
        None => writeln!(out, "  {label:<18} N/A"),
    }
}

/// Write how the archive's records were used
pub(super) fn write_extraction<W>(out: &mut W, report: &ExtractionReport) -> io::Result<()>
where
    W: Write,
{
    writeln!(out, "Records")?;
    writeln!(out, "  Total      : {}", report.total)?;
    writeln!(out, "  Extracted  : {}", report.extracted)?;
    writeln!(out, "  Other games: {}", report.not_participant)?;
    if report.time_class_filtered > 0 {
        writeln!(out, "  Filtered   : {} (time class)", report.time_class_filtered)?;
    }
    writeln!(out, "  Malformed  : {}", report.malformed)
}

/// Write legend explaining table columns
pub(super) fn write_legend<W>(out: &mut W, significance_level: f64) -> io::Result<()>
where
    W: Write,
{
    writeln!(out, "Legend:")?;
    writeln!(out, "  Win Rate   : Share of games won outright (draws count as losses)")?;
    writeln!(out, "  Score      : Average score with a win as 1, a draw as 0.5 and a loss as 0")?;
    writeln!(out, "  low        : Fewer than 2 games; shown but left out of significance tests")?;
    writeln!(out, "  significant: p-value below {significance_level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = vec![];
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_win_rate_row_marks_low_confidence() {
        let stats = GroupStats {
            count: 1,
            mean: 0.5,
            low_confidence: true,
        };
        let rows = [WinRateTableRow {
            label: "Night".to_owned(),
            stats: &stats,
        }];
        let text = render(|out| write_win_rate_table(out, "Period", "Win Rate", &rows));
        let last = text.lines().last().unwrap();
        assert!(last.contains("Night"));
        assert!(last.contains("50.0%"));
        assert!(last.ends_with("low"));
    }

    #[test]
    fn test_extraction_counts() {
        let report = ExtractionReport {
            total: 5,
            extracted: 2,
            not_participant: 1,
            time_class_filtered: 0,
            malformed: 2,
        };
        let text = render(|out| write_extraction(out, &report));
        assert!(text.starts_with("Records\n"));
        assert!(text.contains("  Extracted  : 2\n"));
        assert!(text.contains("  Malformed  : 2\n"));
        assert!(!text.contains("Filtered"));
    }

    #[test]
    fn test_insufficient_test_line() {
        let test = SignificanceTest::InsufficientData {
            testable_groups: 1,
            required_groups: 2,
        };
        let text = render(|out| write_test(out, "ANOVA", &test));
        assert_eq!(
            text.trim_end(),
            "  ANOVA: not enough data (1 of 2 required groups have at least 2 games)"
        );
    }
}
