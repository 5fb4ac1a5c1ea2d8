//! Raw game records as delivered by the archive fetcher
//!
//! A fetched archive is a sequence of nested JSON objects, one per finished
//! game. Field names follow the archive's wire format (`eco`, `end_time`,
//! `pgn`); the Rust-side names describe what the fields hold.
//!
//! # Data Structure
//!
//! ```text
//! RawGameRecord
//! ├─ white: RawPlayer (username, rating?, result)
//! ├─ black: RawPlayer (username, rating?, result)
//! ├─ eco          → opening_code   (URL-like opening identifier)
//! ├─ end_time     → end_time_epoch (seconds since the Unix epoch)
//! ├─ time_class   (bullet, blitz, rapid, daily, ...)
//! └─ pgn          → notation_text  (tag pairs followed by movetext)
//! ```
//!
//! Every field is optional at the type level so that partial upstream data
//! deserializes; deciding whether a record is usable is the extractor's job.
//! Numeric fields tolerate strings and floats, text fields ignore non-strings
//! and a player that is not an object is absent.
//!
//! # Archive Formats
//!
//! [`RawArchive`] accepts both shapes the fetcher produces:
//!
//! ```json
//! [ { "white": {...}, "black": {...}, ... } ]
//! { "games": [ { "white": {...}, "black": {...}, ... } ] }
//! ```
//!
//! Each element is read on its own. An element that is not a game object at
//! all (a number, a string, `null`) becomes [`ArchiveEntry::Unreadable`] and
//! is counted as malformed by the extractor instead of failing the archive.

use serde::{Deserialize, Serialize, de::IgnoredAny};

use crate::lenient;

/// One archived game, immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawGameRecord {
    /// Player with the white pieces
    #[serde(default, deserialize_with = "lenient::optional")]
    pub white: Option<RawPlayer>,
    /// Player with the black pieces
    #[serde(default, deserialize_with = "lenient::optional")]
    pub black: Option<RawPlayer>,
    /// Opening identifier, usually a URL whose last path segment names the opening
    #[serde(
        rename = "eco",
        alias = "opening_code",
        default,
        deserialize_with = "lenient::text"
    )]
    pub opening_code: Option<String>,
    /// Game end time in seconds since the Unix epoch
    #[serde(
        rename = "end_time",
        alias = "end_time_epoch",
        default,
        deserialize_with = "lenient::integer"
    )]
    pub end_time_epoch: Option<i64>,
    /// Time-control class (`bullet`, `blitz`, `rapid`, `daily`)
    #[serde(default, deserialize_with = "lenient::text")]
    pub time_class: Option<String>,
    /// Game notation: tag pairs followed by movetext
    #[serde(
        rename = "pgn",
        alias = "notation_text",
        default,
        deserialize_with = "lenient::text"
    )]
    pub notation_text: Option<String>,
}

/// Per-color participant information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawPlayer {
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub rating: Option<i64>,
    /// Side-specific outcome keyword (`win`, `checkmated`, `agreed`, ...)
    #[serde(default, deserialize_with = "lenient::text")]
    pub result: Option<String>,
}

/// One element of an archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArchiveEntry {
    Record(RawGameRecord),
    /// Anything that is not a game object
    Unreadable(IgnoredAny),
}

impl ArchiveEntry {
    #[must_use]
    pub fn record(&self) -> Option<&RawGameRecord> {
        match self {
            ArchiveEntry::Record(record) => Some(record),
            ArchiveEntry::Unreadable(_) => None,
        }
    }
}

impl From<RawGameRecord> for ArchiveEntry {
    fn from(record: RawGameRecord) -> Self {
        ArchiveEntry::Record(record)
    }
}

/// A fetched archive in either of its serialized shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawArchive {
    /// A flat list of games
    Games(Vec<ArchiveEntry>),
    /// A monthly archive object wrapping its games
    Monthly { games: Vec<ArchiveEntry> },
}

impl RawArchive {
    /// Every element in archive order, readable or not.
    #[must_use]
    pub fn entries(&self) -> &[ArchiveEntry] {
        match self {
            RawArchive::Games(games) | RawArchive::Monthly { games } => games,
        }
    }

    /// Number of elements that are not game objects.
    #[must_use]
    pub fn unreadable(&self) -> usize {
        self.entries()
            .iter()
            .filter(|entry| entry.record().is_none())
            .count()
    }

    /// The readable records, dropping unreadable elements.
    #[must_use]
    pub fn into_records(self) -> Vec<RawGameRecord> {
        match self {
            RawArchive::Games(games) | RawArchive::Monthly { games } => games
                .into_iter()
                .filter_map(|entry| match entry {
                    ArchiveEntry::Record(record) => Some(record),
                    ArchiveEntry::Unreadable(_) => None,
                })
                .collect(),
        }
    }
}

impl FromIterator<RawGameRecord> for RawArchive {
    fn from_iter<T: IntoIterator<Item = RawGameRecord>>(iter: T) -> Self {
        RawArchive::Games(iter.into_iter().map(ArchiveEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_archive_wire_names() {
        let json = r#"{
            "white": {"username": "Alice", "rating": 1500, "result": "win"},
            "black": {"username": "Bob", "rating": 1400, "result": "resigned"},
            "eco": "https://www.chess.com/openings/Italian-Game",
            "end_time": 1700000000,
            "time_class": "blitz",
            "pgn": "[Event \"Live Chess\"]\n\n1. e4 e5 1-0"
        }"#;
        let record: RawGameRecord = serde_json::from_str(json).unwrap();

        let white = record.white.unwrap();
        assert_eq!(white.username.as_deref(), Some("Alice"));
        assert_eq!(white.rating, Some(1500));
        assert_eq!(
            record.opening_code.as_deref(),
            Some("https://www.chess.com/openings/Italian-Game")
        );
        assert_eq!(record.end_time_epoch, Some(1_700_000_000));
        assert_eq!(record.time_class.as_deref(), Some("blitz"));
        assert!(record.notation_text.unwrap().contains("1. e4"));
    }

    #[test]
    fn test_deserialize_tolerates_partial_and_odd_values() {
        let json = r#"{
            "white": {"username": "Alice", "rating": "1510"},
            "black": {"rating": null},
            "end_time": "not a number"
        }"#;
        let record: RawGameRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.white.unwrap().rating, Some(1510));
        assert_eq!(record.black.unwrap().username, None);
        assert_eq!(record.end_time_epoch, None);
        assert_eq!(record.opening_code, None);
        assert_eq!(record.notation_text, None);
    }

    #[test]
    fn test_deserialize_spec_field_aliases() {
        let json = r#"{"opening_code": "sicilian-defense", "end_time_epoch": 12.0, "notation_text": "1. e4"}"#;
        let record: RawGameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.opening_code.as_deref(), Some("sicilian-defense"));
        assert_eq!(record.end_time_epoch, Some(12));
        assert_eq!(record.notation_text.as_deref(), Some("1. e4"));
    }

    #[test]
    fn test_wrongly_typed_fields_become_absent() {
        let json = r#"{
            "white": {"username": 42, "rating": 1500, "result": 1},
            "black": "bob",
            "eco": 7,
            "time_class": ["blitz"],
            "pgn": 12
        }"#;
        let record: RawGameRecord = serde_json::from_str(json).unwrap();

        let white = record.white.unwrap();
        assert_eq!(white.username, None);
        assert_eq!(white.rating, Some(1500));
        assert_eq!(white.result, None);
        assert_eq!(record.black, None);
        assert_eq!(record.opening_code, None);
        assert_eq!(record.time_class, None);
        assert_eq!(record.notation_text, None);
    }

    #[test]
    fn test_unreadable_element_keeps_the_rest_of_the_archive() {
        let json = r#"[
            {"white": {"username": "alice", "result": "win"}},
            {"white": {"username": 42, "result": "win"}, "black": "bob"},
            17,
            null,
            {"black": {"username": "alice", "result": "resigned"}}
        ]"#;
        let archive: RawArchive = serde_json::from_str(json).unwrap();

        assert_eq!(archive.entries().len(), 5);
        assert_eq!(archive.unreadable(), 2);
        let records = archive.into_records();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].white.as_ref().and_then(|p| p.username.as_deref()),
            Some("alice")
        );
        assert_eq!(records[1].white.as_ref().and_then(|p| p.username.as_deref()), None);
    }

    #[test]
    fn test_archive_shapes() {
        let flat: RawArchive = serde_json::from_str(r"[{}, {}]").unwrap();
        assert_eq!(flat.into_records().len(), 2);

        let monthly: RawArchive = serde_json::from_str(r#"{"games": [{}, "x"]}"#).unwrap();
        assert_eq!(monthly.unreadable(), 1);
        assert_eq!(monthly.into_records().len(), 1);

        let empty: RawArchive = serde_json::from_str("[]").unwrap();
        assert!(empty.into_records().is_empty());
    }
}
