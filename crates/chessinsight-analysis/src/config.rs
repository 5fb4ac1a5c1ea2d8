//! Analysis configuration
//!
//! Everything that used to be a process-wide default (the tracked account,
//! the time-control filter, the Elo bucket edges) is carried in an explicit
//! [`AnalysisConfig`] handed to the pipeline.
//!
//! The configuration deserializes from JSON with every field optional:
//!
//! ```json
//! {
//!   "tracked_username": "alice",
//!   "time_class": "blitz",
//!   "elo_scheme": "narrow",
//!   "min_opening_games": 10,
//!   "variance": "unequal"
//! }
//! ```

use chessinsight_stats::{binning::HalfOpenBins, hypothesis::VarianceAssumption};
use serde::{Deserialize, Serialize};

/// Openings with fewer games than this are left out of the opening analysis.
pub const DEFAULT_MIN_OPENING_GAMES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("Elo bucket edges must be non-empty and strictly increasing, got {edges:?}")]
    InvalidEloEdges { edges: Vec<i32> },
    #[display("tracked username must not be empty")]
    EmptyUsername,
}

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Account whose games are analyzed (matched case-insensitively)
    pub tracked_username: String,
    /// Only games of this time-control class are extracted, when set
    pub time_class: Option<String>,
    /// Bucketing of the Elo differential
    pub elo_scheme: EloBucketScheme,
    /// Minimum number of games an opening needs to be analyzed
    pub min_opening_games: usize,
    /// Variance assumption of the two-sample mean-difference tests
    pub variance: VarianceAssumption,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tracked_username: String::new(),
            time_class: None,
            elo_scheme: EloBucketScheme::default(),
            min_opening_games: DEFAULT_MIN_OPENING_GAMES,
            variance: VarianceAssumption::default(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn new(tracked_username: impl Into<String>) -> Self {
        Self {
            tracked_username: tracked_username.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_time_class(mut self, time_class: impl Into<String>) -> Self {
        self.time_class = Some(time_class.into());
        self
    }

    #[must_use]
    pub fn with_elo_scheme(mut self, elo_scheme: EloBucketScheme) -> Self {
        self.elo_scheme = elo_scheme;
        self
    }

    /// Checks the username and the Elo bucket edges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracked_username.trim().is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        self.elo_scheme.bins()?;
        Ok(())
    }

    /// Whether a record of the given time class passes the time-class filter.
    #[must_use]
    pub fn accepts_time_class(&self, time_class: Option<&str>) -> bool {
        match (&self.time_class, time_class) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted.trim().eq_ignore_ascii_case(actual.trim()),
            (Some(_), None) => false,
        }
    }
}

/// Bucketing scheme for the Elo differential.
///
/// | scheme   | edges                  | buckets                                                   |
/// |----------|------------------------|-----------------------------------------------------------|
/// | `Wide`   | -500, 0, 100, 200      | `< -500`, `-500 to 0`, `0 to 100`, `100 to 200`, `200+`   |
/// | `Narrow` | -100, 0, 100           | `< -100`, `-100 to 0`, `0 to 100`, `100+`                 |
///
/// Buckets are lower-inclusive and upper-exclusive, so a differential of
/// exactly `0` lands in `0 to 100`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EloBucketScheme {
    #[default]
    Wide,
    Narrow,
    Custom(Vec<i32>),
}

impl EloBucketScheme {
    pub const WIDE_EDGES: [i32; 4] = [-500, 0, 100, 200];
    pub const NARROW_EDGES: [i32; 3] = [-100, 0, 100];

    #[must_use]
    pub fn edges(&self) -> &[i32] {
        match self {
            EloBucketScheme::Wide => &Self::WIDE_EDGES,
            EloBucketScheme::Narrow => &Self::NARROW_EDGES,
            EloBucketScheme::Custom(edges) => edges,
        }
    }

    pub fn bins(&self) -> Result<HalfOpenBins<i32>, ConfigError> {
        HalfOpenBins::new(self.edges().to_vec()).ok_or_else(|| ConfigError::InvalidEloEdges {
            edges: self.edges().to_vec(),
        })
    }
}

/// Human-readable label of an Elo bucket.
///
/// # Examples
///
/// ```
/// use chessinsight_analysis::config::{elo_bucket_label, EloBucketScheme};
///
/// let bins = EloBucketScheme::Wide.bins().unwrap();
/// assert_eq!(elo_bucket_label(&bins, 0), "< -500");
/// assert_eq!(elo_bucket_label(&bins, 1), "-500 to 0");
/// assert_eq!(elo_bucket_label(&bins, 4), "200+");
/// ```
#[must_use]
pub fn elo_bucket_label(bins: &HalfOpenBins<i32>, index: usize) -> String {
    match bins.bounds(index) {
        (None, Some(upper)) => format!("< {upper}"),
        (Some(lower), Some(upper)) => format!("{lower} to {upper}"),
        (Some(lower), None) => format!("{lower}+"),
        (None, None) => "all".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_labels() {
        let wide = EloBucketScheme::Wide.bins().unwrap();
        let labels = (0..wide.bin_count())
            .map(|i| elo_bucket_label(&wide, i))
            .collect::<Vec<_>>();
        assert_eq!(labels, ["< -500", "-500 to 0", "0 to 100", "100 to 200", "200+"]);

        let narrow = EloBucketScheme::Narrow.bins().unwrap();
        let labels = (0..narrow.bin_count())
            .map(|i| elo_bucket_label(&narrow, i))
            .collect::<Vec<_>>();
        assert_eq!(labels, ["< -100", "-100 to 0", "0 to 100", "100+"]);
    }

    #[test]
    fn test_invalid_custom_edges() {
        let scheme = EloBucketScheme::Custom(vec![100, 0]);
        assert_eq!(
            scheme.bins(),
            Err(ConfigError::InvalidEloEdges {
                edges: vec![100, 0]
            })
        );
        let config = AnalysisConfig::new("alice").with_elo_scheme(scheme);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_username() {
        assert_eq!(
            AnalysisConfig::new("  ").validate(),
            Err(ConfigError::EmptyUsername)
        );
        assert_eq!(AnalysisConfig::new("alice").validate(), Ok(()));
    }

    #[test]
    fn test_time_class_filter() {
        let all = AnalysisConfig::new("alice");
        assert!(all.accepts_time_class(None));
        assert!(all.accepts_time_class(Some("bullet")));

        let blitz = AnalysisConfig::new("alice").with_time_class("blitz");
        assert!(blitz.accepts_time_class(Some("Blitz")));
        assert!(!blitz.accepts_time_class(Some("rapid")));
        assert!(!blitz.accepts_time_class(None));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"tracked_username": "alice", "elo_scheme": "narrow"}"#)
                .unwrap();
        assert_eq!(config.tracked_username, "alice");
        assert_eq!(config.elo_scheme, EloBucketScheme::Narrow);
        assert_eq!(config.min_opening_games, DEFAULT_MIN_OPENING_GAMES);
        assert_eq!(config.variance, VarianceAssumption::Unequal);

        let custom: AnalysisConfig =
            serde_json::from_str(r#"{"elo_scheme": {"custom": [-200, 0, 200]}}"#).unwrap();
        assert_eq!(custom.elo_scheme.edges(), [-200, 0, 200]);
    }
}
