//! Feature extraction from raw records
//!
//! [`extract`] turns one [`RawGameRecord`] into a [`NormalizedRow`] seen from
//! the tracked player's side, or reports why it cannot:
//!
//! - the tracked player did not take part: [`Extraction::Skip`]
//! - the record lacks both usernames or the tracked player's result: [`ExtractError`]
//!
//! Everything else that is missing or malformed (ratings, timestamp, opening,
//! notation) degrades to an absent field instead of rejecting the record.
//!
//! [`extract_all`] and [`extract_archive`] run the extractor over a whole archive, apply the
//! time-class filter of the [`AnalysisConfig`] and count every outcome in an
//! [`ExtractionReport`], so that malformed records are never silently
//! confused with games of other players.

use chrono::DateTime;
use serde::Serialize;

use crate::{
    config::AnalysisConfig,
    notation::Notation,
    record::{ArchiveEntry, RawArchive, RawGameRecord, RawPlayer},
    row::{Color, GameResult, NormalizedRow},
    store::RowStore,
};

/// Opening label used when a record carries no usable opening identifier.
pub const UNKNOWN_OPENING: &str = "Unknown Opening";

/// A record that cannot be turned into a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ExtractError {
    #[display("record has neither a white nor a black username")]
    MissingUsernames,
    #[display("record has no result for the tracked player playing {color}")]
    MissingTrackedResult { color: Color },
}

/// Why a well-formed record produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SkipReason {
    #[display("tracked player did not take part")]
    NotParticipant,
    #[display("time class filtered out")]
    TimeClassFiltered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Row(NormalizedRow),
    Skip(SkipReason),
}

/// Outcome counts of one [`extract_all`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub total: usize,
    pub extracted: usize,
    pub not_participant: usize,
    pub time_class_filtered: usize,
    pub malformed: usize,
}

/// Normalizes an opening identifier into a display label.
///
/// Takes the last `/` segment, turns hyphens into spaces and drops everything
/// from the first `:` on.
///
/// # Examples
///
/// ```
/// use chessinsight_analysis::extract::normalize_opening;
///
/// assert_eq!(
///     normalize_opening(Some("https://www.chess.com/openings/Queens-Gambit-Declined:-Exchange-Variation")),
///     "Queens Gambit Declined"
/// );
/// assert_eq!(normalize_opening(Some("Sicilian-Defense")), "Sicilian Defense");
/// assert_eq!(normalize_opening(None), "Unknown Opening");
/// ```
#[must_use]
pub fn normalize_opening(code: Option<&str>) -> String {
    let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) else {
        return UNKNOWN_OPENING.to_owned();
    };
    let segment = code
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(code);
    let spaced = segment.replace('-', " ");
    let label = spaced.split(':').next().unwrap_or_default().trim();
    if label.is_empty() {
        UNKNOWN_OPENING.to_owned()
    } else {
        label.to_owned()
    }
}

fn username(player: Option<&RawPlayer>) -> Option<&str> {
    player
        .and_then(|player| player.username.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn rating(player: Option<&RawPlayer>) -> Option<i32> {
    player
        .and_then(|player| player.rating)
        .and_then(|rating| i32::try_from(rating).ok())
}

/// Extracts the tracked player's view of one record.
///
/// Usernames are compared case-insensitively. When both sides carry the
/// tracked name, white wins.
///
/// # Examples
///
/// ```
/// use chessinsight_analysis::{
///     extract::{extract, Extraction},
///     record::{RawGameRecord, RawPlayer},
///     row::{Color, GameResult},
/// };
///
/// let record = RawGameRecord {
///     white: Some(RawPlayer {
///         username: Some("Alice".into()),
///         rating: Some(1500),
///         result: Some("win".into()),
///     }),
///     black: Some(RawPlayer {
///         username: Some("Bob".into()),
///         rating: Some(1400),
///         result: Some("resigned".into()),
///     }),
///     ..RawGameRecord::default()
/// };
///
/// let Ok(Extraction::Row(row)) = extract(&record, "alice") else { panic!() };
/// assert_eq!(row.color, Color::White);
/// assert_eq!(row.result, GameResult::Win);
/// assert_eq!(row.elo_diff, Some(100));
/// ```
pub fn extract(raw: &RawGameRecord, tracked_username: &str) -> Result<Extraction, ExtractError> {
    let white_name = username(raw.white.as_ref());
    let black_name = username(raw.black.as_ref());
    if white_name.is_none() && black_name.is_none() {
        return Err(ExtractError::MissingUsernames);
    }

    let tracked = tracked_username.trim().to_lowercase();
    let is_tracked = |name: Option<&str>| name.is_some_and(|name| name.to_lowercase() == tracked);
    let color = if is_tracked(white_name) {
        Color::White
    } else if is_tracked(black_name) {
        Color::Black
    } else {
        return Ok(Extraction::Skip(SkipReason::NotParticipant));
    };

    let own = match color {
        Color::White => raw.white.as_ref(),
        Color::Black => raw.black.as_ref(),
    };
    let result = own
        .and_then(|player| player.result.as_deref())
        .map(GameResult::from_raw)
        .ok_or(ExtractError::MissingTrackedResult { color })?;

    let white_rating = rating(raw.white.as_ref());
    let black_rating = rating(raw.black.as_ref());
    let (own_rating, opponent_rating) = match color {
        Color::White => (white_rating, black_rating),
        Color::Black => (black_rating, white_rating),
    };
    let elo_diff = own_rating
        .zip(opponent_rating)
        .and_then(|(own, opponent)| own.checked_sub(opponent));

    // A zero or negative epoch is a placeholder, not a real end time.
    let timestamp = raw
        .end_time_epoch
        .filter(|epoch| *epoch > 0)
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0));

    let notation = raw.notation_text.as_deref().map(Notation::parse);
    let notation = notation.as_ref();

    Ok(Extraction::Row(NormalizedRow {
        result,
        color,
        opening: normalize_opening(raw.opening_code.as_deref()),
        timestamp,
        white_rating,
        black_rating,
        elo_diff,
        castle_self: notation.and_then(|n| n.castling_of(color)).into(),
        castle_opponent: notation.and_then(|n| n.castling_of(color.opponent())).into(),
        move_count: notation.and_then(Notation::move_count),
        duration_minutes: notation.and_then(Notation::duration_minutes),
    }))
}

/// Extracts every record of an archive into a [`RowStore`].
///
/// Records outside the configured time class are skipped before extraction.
/// Rows keep the order of their source records.
pub fn extract_all<'a, I>(records: I, config: &AnalysisConfig) -> (RowStore, ExtractionReport)
where
    I: IntoIterator<Item = &'a RawGameRecord>,
{
    extract_entries(records.into_iter().map(Some), config)
}

/// Like [`extract_all`], also counting the archive's unreadable elements as
/// malformed records.
pub fn extract_archive(
    archive: &RawArchive,
    config: &AnalysisConfig,
) -> (RowStore, ExtractionReport) {
    extract_entries(archive.entries().iter().map(ArchiveEntry::record), config)
}

fn extract_entries<'a, I>(entries: I, config: &AnalysisConfig) -> (RowStore, ExtractionReport)
where
    I: Iterator<Item = Option<&'a RawGameRecord>>,
{
    let mut report = ExtractionReport::default();
    let mut rows = vec![];

    for (index, entry) in entries.enumerate() {
        report.total += 1;
        let Some(record) = entry else {
            report.malformed += 1;
            tracing::debug!(index, "malformed record: not a game object");
            continue;
        };
        if !config.accepts_time_class(record.time_class.as_deref()) {
            report.time_class_filtered += 1;
            tracing::debug!(index, time_class = ?record.time_class, "skipping record: {}", SkipReason::TimeClassFiltered);
            continue;
        }
        match extract(record, &config.tracked_username) {
            Ok(Extraction::Row(row)) => {
                report.extracted += 1;
                rows.push(row);
            }
            Ok(Extraction::Skip(reason)) => {
                report.not_participant += 1;
                tracing::debug!(index, "skipping record: {reason}");
            }
            Err(error) => {
                report.malformed += 1;
                tracing::debug!(index, "malformed record: {error}");
            }
        }
    }

    tracing::info!(
        total = report.total,
        extracted = report.extracted,
        not_participant = report.not_participant,
        time_class_filtered = report.time_class_filtered,
        malformed = report.malformed,
        "extracted rows"
    );
    if report.malformed > 0 {
        tracing::warn!(
            malformed = report.malformed,
            "some records were unreadable or lacked usernames or the tracked player's result"
        );
    }

    (RowStore::new(rows), report)
}
