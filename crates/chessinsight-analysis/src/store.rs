//! In-memory collection of normalized rows
//!
//! [`RowStore`] is the tabular container the analyses run on. It owns its
//! rows and never mutates them: [`RowStore::filter`] and
//! [`RowStore::group_by`] produce new stores, so every analysis can start
//! from the same unmodified input.
//!
//! Tabular persistence lives in [`crate::table`].

use std::{collections::BTreeMap, str::FromStr};

use crate::row::NormalizedRow;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowStore {
    rows: Vec<NormalizedRow>,
}

impl RowStore {
    #[must_use]
    pub fn new(rows: Vec<NormalizedRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<NormalizedRow> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching `predicate`, in their original order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> RowStore
    where
        P: FnMut(&NormalizedRow) -> bool,
    {
        self.rows.iter().filter(|row| predicate(row)).cloned().collect()
    }

    /// Partitions rows by key.
    ///
    /// Rows for which `key_fn` returns `None` belong to no group. Only keys
    /// with at least one row appear in the result.
    #[must_use]
    pub fn group_by<K, F>(&self, mut key_fn: F) -> BTreeMap<K, RowStore>
    where
        K: Ord,
        F: FnMut(&NormalizedRow) -> Option<K>,
    {
        let mut groups = BTreeMap::<K, RowStore>::new();
        for row in &self.rows {
            if let Some(key) = key_fn(row) {
                groups.entry(key).or_default().rows.push(row.clone());
            }
        }
        groups
    }

    /// Present values of a numeric column, in row order.
    #[must_use]
    pub fn numeric_column(&self, column: NumericColumn) -> Vec<f64> {
        self.rows.iter().filter_map(|row| column.value(row)).collect()
    }
}

impl FromIterator<NormalizedRow> for RowStore {
    fn from_iter<T: IntoIterator<Item = NormalizedRow>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RowStore {
    type Item = &'a NormalizedRow;
    type IntoIter = std::slice::Iter<'a, NormalizedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for RowStore {
    type Item = NormalizedRow;
    type IntoIter = std::vec::IntoIter<NormalizedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Numeric columns of [`NormalizedRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NumericColumn {
    #[display("white_rating")]
    WhiteRating,
    #[display("black_rating")]
    BlackRating,
    #[display("elo_diff")]
    EloDiff,
    #[display("move_count")]
    MoveCount,
    #[display("duration_minutes")]
    DurationMinutes,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 5] = [
        NumericColumn::WhiteRating,
        NumericColumn::BlackRating,
        NumericColumn::EloDiff,
        NumericColumn::MoveCount,
        NumericColumn::DurationMinutes,
    ];

    #[must_use]
    pub fn value(self, row: &NormalizedRow) -> Option<f64> {
        match self {
            NumericColumn::WhiteRating => row.white_rating.map(f64::from),
            NumericColumn::BlackRating => row.black_rating.map(f64::from),
            NumericColumn::EloDiff => row.elo_diff.map(f64::from),
            NumericColumn::MoveCount => row.move_count.map(f64::from),
            NumericColumn::DurationMinutes => row.duration_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown numeric column: {name}")]
pub struct UnknownColumn {
    pub name: String,
}

impl FromStr for NumericColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|column| column.to_string() == s)
            .ok_or_else(|| UnknownColumn { name: s.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use crate::row::{Castling, Color, GameResult};

    use super::*;

    fn row(result: GameResult, color: Color, opening: &str, move_count: Option<u32>) -> NormalizedRow {
        NormalizedRow {
            result,
            color,
            opening: opening.to_owned(),
            timestamp: None,
            white_rating: Some(1500),
            black_rating: None,
            elo_diff: None,
            castle_self: Castling::None,
            castle_opponent: Castling::None,
            move_count,
            duration_minutes: None,
        }
    }

    fn store() -> RowStore {
        RowStore::new(vec![
            row(GameResult::Win, Color::White, "Italian Game", Some(30)),
            row(GameResult::Loss, Color::Black, "Sicilian Defense", None),
            row(GameResult::Draw, Color::White, "Sicilian Defense", Some(50)),
        ])
    }

    #[test]
    fn test_filter_preserves_order_and_source() {
        let store = store();
        let whites = store.filter(|row| row.color == Color::White);
        assert_eq!(whites.len(), 2);
        assert_eq!(whites.rows()[0].result, GameResult::Win);
        assert_eq!(whites.rows()[1].result, GameResult::Draw);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_group_by_skips_absent_keys() {
        let store = store();
        let by_opening = store.group_by(|row| Some(row.opening.clone()));
        assert_eq!(
            by_opening.keys().collect::<Vec<_>>(),
            ["Italian Game", "Sicilian Defense"]
        );
        assert_eq!(by_opening["Sicilian Defense"].len(), 2);

        let by_moves = store.group_by(|row| row.move_count);
        assert_eq!(by_moves.len(), 2);
        assert_eq!(by_moves.values().map(RowStore::len).sum::<usize>(), 2);
    }

    #[test]
    fn test_numeric_column_drops_absent_values() {
        let store = store();
        assert_eq!(store.numeric_column(NumericColumn::MoveCount), [30.0, 50.0]);
        assert_eq!(
            store.numeric_column(NumericColumn::WhiteRating),
            [1500.0, 1500.0, 1500.0]
        );
        assert!(store.numeric_column(NumericColumn::EloDiff).is_empty());
    }

    #[test]
    fn test_numeric_column_names() {
        for column in NumericColumn::ALL {
            assert_eq!(column.to_string().parse::<NumericColumn>(), Ok(column));
        }
        assert!("opening".parse::<NumericColumn>().is_err());
    }
}
