//! Grouped aggregation of row values
//!
//! The analyses all follow one pattern: assign each row a group key, turn it
//! into a numeric value (usually one of the win encodings), then report the
//! per-group mean and test whether the group means differ.
//!
//! ```text
//! rows ──key_fn──► group ─┐
//!      ──value_fn─► value ─┴─► GroupedValues ──► GroupTable (count, mean)
//!                                         └────► SignificanceTest
//! ```
//!
//! Rows whose key or value is absent are left out of both. Only groups that
//! received at least one value appear in a [`GroupTable`]; groups with fewer
//! than [`MIN_GROUP_SIZE`] values are flagged as low confidence and never
//! enter a significance test.
//!
//! # Examples
//!
//! ```
//! use chessinsight_analysis::{
//!     aggregate::aggregate,
//!     row::{Color, NormalizedRow},
//!     store::RowStore,
//! };
//!
//! let store = RowStore::default();
//! let table = aggregate(&store, |row: &NormalizedRow| Some(row.color), |row| row.result.win_strict());
//! assert!(table.is_empty());
//! assert_eq!(table.get(&Color::White), None);
//! ```

use std::collections::BTreeMap;

use chessinsight_stats::{
    descriptive,
    hypothesis::{self, MIN_GROUP_SIZE, TestOutcome, VarianceAssumption},
};
use serde::Serialize;

use crate::{row::NormalizedRow, store::RowStore};

/// Count and mean of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    /// Too few observations to take part in a significance test
    pub low_confidence: bool,
}

impl GroupStats {
    /// Returns `None` for an empty group.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            count: values.len(),
            mean: descriptive::mean(values)?,
            low_confidence: values.len() < MIN_GROUP_SIZE,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry<K> {
    pub group: K,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// Per-group statistics in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupTable<K> {
    pub entries: Vec<GroupEntry<K>>,
}

impl<K> Default for GroupTable<K> {
    fn default() -> Self {
        Self { entries: vec![] }
    }
}

impl<K> GroupTable<K> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupEntry<K>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, group: &K) -> Option<&GroupStats>
    where
        K: PartialEq,
    {
        self.entries
            .iter()
            .find(|entry| entry.group == *group)
            .map(|entry| &entry.stats)
    }
}

impl<'a, K> IntoIterator for &'a GroupTable<K> {
    type Item = &'a GroupEntry<K>;
    type IntoIter = std::slice::Iter<'a, GroupEntry<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Outcome of a significance test that may lack the data to run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignificanceTest {
    Tested(TestOutcome),
    InsufficientData {
        /// Groups with enough observations to be tested
        testable_groups: usize,
        /// Groups the test needs
        required_groups: usize,
    },
}

impl SignificanceTest {
    fn from_outcome(outcome: Option<TestOutcome>, testable_groups: usize) -> Self {
        match outcome {
            Some(outcome) => SignificanceTest::Tested(outcome),
            None => SignificanceTest::InsufficientData {
                testable_groups,
                required_groups: 2,
            },
        }
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&TestOutcome> {
        match self {
            SignificanceTest::Tested(outcome) => Some(outcome),
            SignificanceTest::InsufficientData { .. } => None,
        }
    }

    #[must_use]
    pub fn is_significant(&self) -> bool {
        self.outcome().is_some_and(|outcome| outcome.significant)
    }
}

/// Values collected per group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedValues<K> {
    pub map: BTreeMap<K, Vec<f64>>,
}

impl<K> GroupedValues<K>
where
    K: Ord,
{
    /// Collects values grouped by a key computed from each row.
    ///
    /// Rows for which either closure returns `None` are skipped.
    pub fn collect_by_group<G, V>(rows: &RowStore, mut group: G, mut value: V) -> Self
    where
        G: FnMut(&NormalizedRow) -> Option<K>,
        V: FnMut(&NormalizedRow) -> Option<f64>,
    {
        let mut map = BTreeMap::<K, Vec<f64>>::new();
        for row in rows {
            let Some(key) = group(row) else { continue };
            let Some(value) = value(row) else { continue };
            map.entry(key).or_default().push(value);
        }
        Self { map }
    }

    #[must_use]
    pub fn values(&self, group: &K) -> &[f64] {
        self.map.get(group).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn table(&self) -> GroupTable<K>
    where
        K: Clone,
    {
        let entries = self
            .map
            .iter()
            .filter_map(|(group, values)| {
                Some(GroupEntry {
                    group: group.clone(),
                    stats: GroupStats::from_values(values)?,
                })
            })
            .collect();
        GroupTable { entries }
    }

    /// Groups with enough observations to enter a test.
    pub fn testable_groups(&self) -> impl Iterator<Item = &[f64]> {
        self.map
            .values()
            .map(Vec::as_slice)
            .filter(|values| values.len() >= MIN_GROUP_SIZE)
    }

    /// One-way ANOVA across every testable group.
    #[must_use]
    pub fn anova(&self, alpha: f64) -> SignificanceTest {
        let groups = self.testable_groups().collect::<Vec<_>>();
        SignificanceTest::from_outcome(hypothesis::one_way_anova(&groups, alpha), groups.len())
    }

    /// Two-sample test between the groups `a` and `b`.
    #[must_use]
    pub fn t_test(&self, a: &K, b: &K, variance: VarianceAssumption, alpha: f64) -> SignificanceTest {
        let (a, b) = (self.values(a), self.values(b));
        let testable = [a, b]
            .iter()
            .filter(|values| values.len() >= MIN_GROUP_SIZE)
            .count();
        SignificanceTest::from_outcome(
            hypothesis::two_sample_t_test(a, b, variance, alpha),
            testable,
        )
    }
}

/// Mean of `value_fn` per group of `key_fn`.
pub fn aggregate<K, G, V>(rows: &RowStore, key_fn: G, value_fn: V) -> GroupTable<K>
where
    K: Ord + Clone,
    G: FnMut(&NormalizedRow) -> Option<K>,
    V: FnMut(&NormalizedRow) -> Option<f64>,
{
    GroupedValues::collect_by_group(rows, key_fn, value_fn).table()
}

/// Fraction of games won outright; `None` when no row has a known result.
pub fn win_rate_strict<'a, I>(rows: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let values = rows
        .into_iter()
        .filter_map(|row| row.result.win_strict())
        .collect::<Vec<_>>();
    descriptive::mean(&values)
}

/// Average score with draws as half a point; `None` when no row has a known result.
pub fn win_rate_with_draws<'a, I>(rows: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let values = rows
        .into_iter()
        .filter_map(|row| row.result.win_with_draws())
        .collect::<Vec<_>>();
    descriptive::mean(&values)
}

#[cfg(test)]
mod tests {
    use crate::row::{Castling, Color, GameResult};

    use super::*;

    fn row(result: GameResult, color: Color) -> NormalizedRow {
        NormalizedRow {
            result,
            color,
            opening: "Unknown Opening".to_owned(),
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

    #[test]
    fn test_win_rates() {
        let rows = [
            row(GameResult::Win, Color::White),
            row(GameResult::Draw, Color::White),
            row(GameResult::Loss, Color::Black),
            row(GameResult::Unknown, Color::Black),
        ];
        assert_eq!(win_rate_strict(&rows), Some(1.0 / 3.0));
        assert_eq!(win_rate_with_draws(&rows), Some(0.5));
        assert_eq!(win_rate_strict(&[row(GameResult::Unknown, Color::White)]), None);
        assert_eq!(win_rate_with_draws(&[]), None);
    }

    #[test]
    fn test_aggregate_flags_small_groups() {
        let store = RowStore::new(vec![
            row(GameResult::Win, Color::White),
            row(GameResult::Loss, Color::White),
            row(GameResult::Win, Color::Black),
        ]);
        let table = aggregate(&store, |row| Some(row.color), |row| row.result.win_strict());
        assert_eq!(
            table.get(&Color::White),
            Some(&GroupStats {
                count: 2,
                mean: 0.5,
                low_confidence: false
            })
        );
        assert_eq!(
            table.get(&Color::Black),
            Some(&GroupStats {
                count: 1,
                mean: 1.0,
                low_confidence: true
            })
        );
    }

    #[test]
    fn test_unknown_results_are_not_aggregated() {
        let store = RowStore::new(vec![
            row(GameResult::Unknown, Color::White),
            row(GameResult::Win, Color::Black),
        ]);
        let table = aggregate(&store, |row| Some(row.color), |row| row.result.win_strict());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&Color::White), None);
    }

    #[test]
    fn test_anova_skips_small_groups() {
        let grouped = GroupedValues {
            map: BTreeMap::from([
                ("a", vec![1.0, 0.0, 1.0, 1.0]),
                ("b", vec![0.0, 0.0, 0.5, 0.0]),
                ("c", vec![0.5, 1.0, 0.5, 1.0]),
                ("d", vec![1.0]),
            ]),
        };
        let SignificanceTest::Tested(outcome) = grouped.anova(0.05) else {
            panic!("expected a test result");
        };
        assert!((outcome.statistic - 3.947_368_421_052_631).abs() < 1e-9);
        assert!(!outcome.significant);
    }

    #[test]
    fn test_anova_insufficient_with_one_testable_group() {
        let grouped = GroupedValues {
            map: BTreeMap::from([(0, vec![1.0, 0.0, 0.5]), (1, vec![1.0])]),
        };
        assert_eq!(
            grouped.anova(0.05),
            SignificanceTest::InsufficientData {
                testable_groups: 1,
                required_groups: 2
            }
        );
        assert!(!grouped.anova(0.05).is_significant());
    }

    #[test]
    fn test_t_test_between_named_groups() {
        let grouped = GroupedValues {
            map: BTreeMap::from([
                ("day", vec![1.0, 0.0, 1.0, 1.0, 0.5]),
                ("night", vec![0.0, 0.0, 0.5, 0.0, 1.0]),
            ]),
        };
        let test = grouped.t_test(&"day", &"night", VarianceAssumption::Unequal, 0.05);
        let outcome = test.outcome().unwrap();
        assert!((outcome.p_value - 0.195_015_528_100_073_5).abs() < 1e-8);

        let missing = grouped.t_test(&"day", &"dawn", VarianceAssumption::Unequal, 0.05);
        assert_eq!(
            missing,
            SignificanceTest::InsufficientData {
                testable_groups: 1,
                required_groups: 2
            }
        );
    }
}
