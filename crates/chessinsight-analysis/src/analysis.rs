//! Statistical analyses over a row store
//!
//! [`Analyzer`] runs every grouping the report needs against one immutable
//! [`RowStore`]:
//!
//! | analysis                     | groups                                   | value              | test                     |
//! |------------------------------|------------------------------------------|--------------------|--------------------------|
//! | [`Analyzer::by_color`]       | white, black                             | strict win         | none                     |
//! | [`Analyzer::by_time_of_day`] | morning, afternoon, evening, night       | strict win         | day vs night t-test      |
//! | [`Analyzer::by_elo_diff`]    | Elo differential buckets                 | win with draws     | ANOVA across buckets     |
//! | [`Analyzer::by_opening`]     | openings with enough games               | win with draws     | ANOVA across openings    |
//! | [`Analyzer::by_castling`]    | kingside, queenside, not castled         | win with draws     | ANOVA, castled vs not    |
//!
//! Each analysis filters and groups its own view of the store; no analysis
//! sees rows dropped or modified by another.
//!
//! # Time of Day
//!
//! Hours are taken from the UTC end timestamp and bucketed half-open:
//!
//! ```text
//! [0, 9)   Morning
//! [9, 17)  Afternoon
//! [17, 21) Evening
//! [21, 24) Night
//! ```
//!
//! The day/night comparison splits at a different point: hours up to and
//! including 17 count as day, later hours as night.
//!
//! # Examples
//!
//! ```
//! use chessinsight_analysis::{
//!     analysis::Analyzer, config::AnalysisConfig, store::RowStore,
//! };
//!
//! let store = RowStore::default();
//! let config = AnalysisConfig::new("alice");
//! let analyzer = Analyzer::new(&store, &config).unwrap();
//!
//! let report = analyzer.report();
//! assert_eq!(report.overall.games, 0);
//! assert!(report.by_elo_diff.table.is_empty());
//! assert!(report.by_elo_diff.anova.outcome().is_none());
//! ```

use chessinsight_stats::{
    binning::HalfOpenBins, descriptive::DescriptiveStats, hypothesis::SIGNIFICANCE_LEVEL,
};
use serde::Serialize;

use crate::{
    aggregate::{self, GroupTable, GroupedValues, SignificanceTest},
    config::{self, AnalysisConfig, ConfigError, EloBucketScheme},
    extract::ExtractionReport,
    row::{Castling, Color, GameResult, NormalizedRow},
    store::{NumericColumn, RowStore},
};

/// Part of the day a game ended in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..9 => TimeOfDay::Morning,
            9..17 => TimeOfDay::Afternoon,
            17..21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// Day/night split used by the time-of-day test.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Day,
    Night,
}

impl DayPeriod {
    /// Last hour that still counts as day.
    pub const LAST_DAY_HOUR: u32 = 17;

    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        if hour <= Self::LAST_DAY_HOUR {
            DayPeriod::Day
        } else {
            DayPeriod::Night
        }
    }
}

/// One Elo differential bucket, ordered by position in its scheme.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display)]
#[display("{label}")]
pub struct EloBucket {
    pub index: usize,
    pub label: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum CastlingCategory {
    #[display("Kingside Castled")]
    KingsideCastled,
    #[display("Queenside Castled")]
    QueensideCastled,
    #[display("Not Castled")]
    NotCastled,
}

impl CastlingCategory {
    #[must_use]
    pub fn has_castled(self) -> bool {
        !matches!(self, CastlingCategory::NotCastled)
    }
}

impl From<Castling> for CastlingCategory {
    fn from(castling: Castling) -> Self {
        match castling {
            Castling::Kingside => CastlingCategory::KingsideCastled,
            Castling::Queenside => CastlingCategory::QueensideCastled,
            Castling::None => CastlingCategory::NotCastled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallSummary {
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub unknown: usize,
    pub win_rate_strict: Option<f64>,
    pub win_rate_with_draws: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorAnalysis {
    pub table: GroupTable<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayAnalysis {
    pub table: GroupTable<TimeOfDay>,
    /// Rows without a timestamp, left out of this analysis only
    pub missing_timestamp: usize,
    pub day_vs_night: SignificanceTest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EloAnalysis {
    pub scheme: EloBucketScheme,
    pub table: GroupTable<EloBucket>,
    pub missing_elo_diff: usize,
    pub anova: SignificanceTest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpeningAnalysis {
    pub min_games: usize,
    pub table: GroupTable<String>,
    /// Openings played fewer than `min_games` times
    pub excluded_openings: usize,
    pub excluded_games: usize,
    pub anova: SignificanceTest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastlingAnalysis {
    pub table: GroupTable<CastlingCategory>,
    pub anova: SignificanceTest,
    pub castled_vs_not: SignificanceTest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameLengthSummary {
    pub move_count: Option<DescriptiveStats>,
    pub duration_minutes: Option<DescriptiveStats>,
}

/// Every analysis of one run, ready to render or serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub tracked_username: String,
    pub significance_level: f64,
    pub overall: OverallSummary,
    pub by_color: ColorAnalysis,
    pub by_time_of_day: TimeOfDayAnalysis,
    pub by_elo_diff: EloAnalysis,
    pub by_opening: OpeningAnalysis,
    pub by_castling: CastlingAnalysis,
    pub game_length: GameLengthSummary,
    /// Record counts of the extraction the rows came from, when they were
    /// extracted in the same run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionReport>,
}

impl AnalysisReport {
    #[must_use]
    pub fn with_extraction(self, extraction: ExtractionReport) -> Self {
        Self {
            extraction: Some(extraction),
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analyzer<'a> {
    store: &'a RowStore,
    config: &'a AnalysisConfig,
    elo_bins: HalfOpenBins<i32>,
}

impl<'a> Analyzer<'a> {
    /// Fails only if the configured Elo bucket edges are invalid.
    pub fn new(store: &'a RowStore, config: &'a AnalysisConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            config,
            elo_bins: config.elo_scheme.bins()?,
        })
    }

    #[must_use]
    pub fn overall(&self) -> OverallSummary {
        let count = |is: fn(&GameResult) -> bool| {
            self.store.iter().filter(|row| is(&row.result)).count()
        };
        OverallSummary {
            games: self.store.len(),
            wins: count(GameResult::is_win),
            draws: count(GameResult::is_draw),
            losses: count(GameResult::is_loss),
            unknown: count(GameResult::is_unknown),
            win_rate_strict: aggregate::win_rate_strict(self.store),
            win_rate_with_draws: aggregate::win_rate_with_draws(self.store),
        }
    }

    #[must_use]
    pub fn by_color(&self) -> ColorAnalysis {
        ColorAnalysis {
            table: aggregate::aggregate(self.store, |row| Some(row.color), win_strict),
        }
    }

    #[must_use]
    pub fn by_time_of_day(&self) -> TimeOfDayAnalysis {
        let table = aggregate::aggregate(
            self.store,
            |row| row.hour().map(TimeOfDay::from_hour),
            win_strict,
        );
        let periods = GroupedValues::collect_by_group(
            self.store,
            |row| row.hour().map(DayPeriod::from_hour),
            win_strict,
        );
        let day_vs_night = periods.t_test(
            &DayPeriod::Day,
            &DayPeriod::Night,
            self.config.variance,
            SIGNIFICANCE_LEVEL,
        );
        warn_if_insufficient("time of day", &day_vs_night);

        TimeOfDayAnalysis {
            table,
            missing_timestamp: self.store.iter().filter(|row| row.timestamp.is_none()).count(),
            day_vs_night,
        }
    }

    #[must_use]
    pub fn by_elo_diff(&self) -> EloAnalysis {
        let grouped = GroupedValues::collect_by_group(
            self.store,
            |row| row.elo_diff.map(|diff| self.elo_bucket(diff)),
            win_with_draws,
        );
        let anova = grouped.anova(SIGNIFICANCE_LEVEL);
        warn_if_insufficient("Elo differential", &anova);

        EloAnalysis {
            scheme: self.config.elo_scheme.clone(),
            table: grouped.table(),
            missing_elo_diff: self.store.iter().filter(|row| row.elo_diff.is_none()).count(),
            anova,
        }
    }

    #[must_use]
    pub fn by_opening(&self) -> OpeningAnalysis {
        let min_games = self.config.min_opening_games;
        let by_opening = self.store.group_by(|row| Some(row.opening.clone()));
        let is_frequent = |opening: &String| {
            by_opening
                .get(opening)
                .is_some_and(|rows| rows.len() >= min_games)
        };

        let frequent = self.store.filter(|row| is_frequent(&row.opening));
        let grouped = GroupedValues::collect_by_group(
            &frequent,
            |row| Some(row.opening.clone()),
            win_with_draws,
        );
        let anova = grouped.anova(SIGNIFICANCE_LEVEL);
        warn_if_insufficient("opening", &anova);

        OpeningAnalysis {
            min_games,
            table: grouped.table(),
            excluded_openings: by_opening.keys().filter(|opening| !is_frequent(opening)).count(),
            excluded_games: self.store.len() - frequent.len(),
            anova,
        }
    }

    #[must_use]
    pub fn by_castling(&self) -> CastlingAnalysis {
        let grouped = GroupedValues::collect_by_group(
            self.store,
            |row| Some(CastlingCategory::from(row.castle_self)),
            win_with_draws,
        );
        let anova = grouped.anova(SIGNIFICANCE_LEVEL);
        warn_if_insufficient("castling", &anova);

        let castled = GroupedValues::collect_by_group(
            self.store,
            |row| Some(CastlingCategory::from(row.castle_self).has_castled()),
            win_with_draws,
        );
        let castled_vs_not =
            castled.t_test(&true, &false, self.config.variance, SIGNIFICANCE_LEVEL);

        CastlingAnalysis {
            table: grouped.table(),
            anova,
            castled_vs_not,
        }
    }

    #[must_use]
    pub fn game_length(&self) -> GameLengthSummary {
        GameLengthSummary {
            move_count: DescriptiveStats::new(self.store.numeric_column(NumericColumn::MoveCount)),
            duration_minutes: DescriptiveStats::new(
                self.store.numeric_column(NumericColumn::DurationMinutes),
            ),
        }
    }

    #[must_use]
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            tracked_username: self.config.tracked_username.clone(),
            significance_level: SIGNIFICANCE_LEVEL,
            overall: self.overall(),
            by_color: self.by_color(),
            by_time_of_day: self.by_time_of_day(),
            by_elo_diff: self.by_elo_diff(),
            by_opening: self.by_opening(),
            by_castling: self.by_castling(),
            game_length: self.game_length(),
            extraction: None,
        }
    }

    fn elo_bucket(&self, diff: i32) -> EloBucket {
        let index = self.elo_bins.bin_of(diff);
        EloBucket {
            index,
            label: config::elo_bucket_label(&self.elo_bins, index),
        }
    }
}

fn win_strict(row: &NormalizedRow) -> Option<f64> {
    row.result.win_strict()
}

fn win_with_draws(row: &NormalizedRow) -> Option<f64> {
    row.result.win_with_draws()
}

fn warn_if_insufficient(analysis: &str, test: &SignificanceTest) {
    if let SignificanceTest::InsufficientData {
        testable_groups,
        required_groups,
    } = test
    {
        tracing::warn!(
            analysis,
            testable_groups,
            required_groups,
            "not enough data for a significance test"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn row(result: GameResult) -> NormalizedRow {
        NormalizedRow {
            result,
            color: Color::White,
            opening: "Italian Game".to_owned(),
            timestamp: None,
            white_rating: None,
            black_rating: None,
            elo_diff: None,
            castle_self: Castling::None,
            castle_opponent: Castling::None,
            move_count: None,
            duration_minutes: None,
        }
    }

    fn at_hour(result: GameResult, hour: u32) -> NormalizedRow {
        NormalizedRow {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 5, hour, 30, 0).single(),
            ..row(result)
        }
    }

    #[test]
    fn test_time_of_day_buckets() {
        let expected = [
            (0, TimeOfDay::Morning),
            (8, TimeOfDay::Morning),
            (9, TimeOfDay::Afternoon),
            (16, TimeOfDay::Afternoon),
            (17, TimeOfDay::Evening),
            (20, TimeOfDay::Evening),
            (21, TimeOfDay::Night),
            (23, TimeOfDay::Night),
        ];
        for (hour, bucket) in expected {
            assert_eq!(TimeOfDay::from_hour(hour), bucket, "hour {hour}");
        }
        assert_eq!(DayPeriod::from_hour(17), DayPeriod::Day);
        assert_eq!(DayPeriod::from_hour(18), DayPeriod::Night);
    }

    #[test]
    fn test_by_time_of_day_drops_rows_without_timestamp() {
        let store = RowStore::new(vec![
            at_hour(GameResult::Win, 10),
            at_hour(GameResult::Draw, 12),
            at_hour(GameResult::Loss, 22),
            row(GameResult::Win),
        ]);
        let config = AnalysisConfig::new("alice");
        let analysis = Analyzer::new(&store, &config).unwrap().by_time_of_day();

        assert_eq!(analysis.missing_timestamp, 1);
        let afternoon = analysis.table.get(&TimeOfDay::Afternoon).unwrap();
        assert_eq!((afternoon.count, afternoon.mean), (2, 0.5));
        let night = analysis.table.get(&TimeOfDay::Night).unwrap();
        assert!(night.low_confidence);
        assert_eq!(analysis.table.get(&TimeOfDay::Morning), None);
        assert_eq!(
            analysis.day_vs_night,
            SignificanceTest::InsufficientData {
                testable_groups: 1,
                required_groups: 2
            }
        );
    }

    #[test]
    fn test_day_vs_night_is_tested_with_enough_data() {
        let store = [(1, GameResult::Win), (10, GameResult::Win), (17, GameResult::Loss)]
            .into_iter()
            .chain([(18, GameResult::Loss), (23, GameResult::Loss), (20, GameResult::Win)])
            .map(|(hour, result)| at_hour(result, hour))
            .collect::<RowStore>();
        let config = AnalysisConfig::new("alice");
        let analysis = Analyzer::new(&store, &config).unwrap().by_time_of_day();
        let outcome = analysis.day_vs_night.outcome().unwrap();
        assert!(outcome.statistic > 0.0);
        assert!(!outcome.significant);
    }

    #[test]
    fn test_by_castling_categories_and_tests() {
        let mut rows = vec![];
        for (castling, results) in [
            (Castling::Kingside, [GameResult::Win, GameResult::Win, GameResult::Draw]),
            (Castling::Queenside, [GameResult::Loss, GameResult::Win, GameResult::Draw]),
            (Castling::None, [GameResult::Loss, GameResult::Loss, GameResult::Draw]),
        ] {
            for result in results {
                rows.push(NormalizedRow {
                    castle_self: castling,
                    ..row(result)
                });
            }
        }
        let store = RowStore::new(rows);
        let config = AnalysisConfig::new("alice");
        let analysis = Analyzer::new(&store, &config).unwrap().by_castling();

        assert_eq!(analysis.table.len(), 3);
        let kingside = analysis
            .table
            .get(&CastlingCategory::KingsideCastled)
            .unwrap();
        assert!((kingside.mean - 2.5 / 3.0).abs() < 1e-12);
        assert!(analysis.anova.outcome().is_some());
        assert!(analysis.castled_vs_not.outcome().is_some());
    }

    #[test]
    fn test_overall_counts() {
        let store = RowStore::new(vec![
            row(GameResult::Win),
            row(GameResult::Draw),
            row(GameResult::Loss),
            row(GameResult::Unknown),
        ]);
        let config = AnalysisConfig::new("alice");
        let overall = Analyzer::new(&store, &config).unwrap().overall();
        assert_eq!(
            (overall.games, overall.wins, overall.draws, overall.losses, overall.unknown),
            (4, 1, 1, 1, 1)
        );
        assert_eq!(overall.win_rate_strict, Some(1.0 / 3.0));
        assert_eq!(overall.win_rate_with_draws, Some(0.5));
    }

    #[test]
    fn test_invalid_elo_scheme_is_rejected() {
        let store = RowStore::default();
        let config = AnalysisConfig::new("alice").with_elo_scheme(EloBucketScheme::Custom(vec![]));
        assert!(Analyzer::new(&store, &config).is_err());
    }

    #[test]
    fn test_report_serializes() {
        let store = RowStore::new(vec![row(GameResult::Win)]);
        let config = AnalysisConfig::new("alice");
        let report = Analyzer::new(&store, &config).unwrap().report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overall"]["games"], 1);
        assert_eq!(json["by_color"]["table"][0]["group"], "white");
        assert_eq!(json["by_color"]["table"][0]["count"], 1);
        assert_eq!(json["by_elo_diff"]["anova"]["status"], "insufficient_data");
        assert!(json.get("extraction").is_none());

        let extraction = ExtractionReport {
            total: 3,
            extracted: 1,
            malformed: 2,
            ..ExtractionReport::default()
        };
        let json = serde_json::to_value(report.with_extraction(extraction)).unwrap();
        assert_eq!(json["extraction"]["total"], 3);
        assert_eq!(json["extraction"]["malformed"], 2);
    }
}
