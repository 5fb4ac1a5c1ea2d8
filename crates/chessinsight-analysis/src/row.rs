//! Normalized analytic rows
//!
//! A [`NormalizedRow`] is the flat, per-game view of a raw record from the
//! tracked player's perspective. Rows are created once by the extractor and
//! never mutated afterwards.
//!
//! # Win Encodings
//!
//! Two numeric encodings of [`GameResult`] are used by the analyses and are
//! deliberately kept apart:
//!
//! | result  | [`GameResult::win_strict`] | [`GameResult::win_with_draws`] |
//! |---------|----------------------------|--------------------------------|
//! | Win     | 1.0                        | 1.0                            |
//! | Draw    | 0.0                        | 0.5                            |
//! | Loss    | 0.0                        | 0.0                            |
//! | Unknown | excluded                   | excluded                       |

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{lenient, notation::CastlingSide};

/// Outcome of a game for the tracked player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
    Unknown,
}

impl GameResult {
    /// Maps an archive result keyword to an outcome.
    ///
    /// Every drawing reason collapses to [`GameResult::Draw`]; unrecognized
    /// keywords become [`GameResult::Unknown`].
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "win" => GameResult::Win,
            "agreed" | "repetition" | "stalemate" | "insufficient" | "50move"
            | "timevsinsufficient" | "draw" => GameResult::Draw,
            "checkmated" | "timeout" | "resigned" | "lose" | "loss" | "abandoned"
            | "kingofthehill" | "threecheck" | "bughousepartnerlose" => GameResult::Loss,
            _ => GameResult::Unknown,
        }
    }

    /// Win indicator: only an exact win counts.
    #[must_use]
    pub fn win_strict(self) -> Option<f64> {
        match self {
            GameResult::Win => Some(1.0),
            GameResult::Loss | GameResult::Draw => Some(0.0),
            GameResult::Unknown => None,
        }
    }

    /// Win score with draws as half a point.
    #[must_use]
    pub fn win_with_draws(self) -> Option<f64> {
        match self {
            GameResult::Win => Some(1.0),
            GameResult::Draw => Some(0.5),
            GameResult::Loss => Some(0.0),
            GameResult::Unknown => None,
        }
    }
}

/// Side played by the tracked player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// Castling behavior of one side over a whole game.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Castling {
    Kingside,
    Queenside,
    #[default]
    None,
}

impl From<Option<CastlingSide>> for Castling {
    fn from(side: Option<CastlingSide>) -> Self {
        match side {
            Some(CastlingSide::Kingside) => Castling::Kingside,
            Some(CastlingSide::Queenside) => Castling::Queenside,
            None => Castling::None,
        }
    }
}

/// One game the tracked player took part in, flattened for analysis.
///
/// Field names double as the tabular column names. When read back, only
/// `color` and `opening` must decode: an unrecognized result becomes
/// [`GameResult::Unknown`] and every other unusable cell becomes absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    #[serde(deserialize_with = "result_keyword")]
    pub result: GameResult,
    pub color: Color,
    pub opening: String,
    /// Game end instant; rows without it are left out of time-of-day analyses only
    #[serde(default, deserialize_with = "lenient::parsed")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub white_rating: Option<i32>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub black_rating: Option<i32>,
    /// Tracked player's rating minus the opponent's
    #[serde(default, deserialize_with = "lenient::integer")]
    pub elo_diff: Option<i32>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub castle_self: Castling,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub castle_opponent: Castling,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub move_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub duration_minutes: Option<f64>,
}

fn result_keyword<'de, D>(deserializer: D) -> Result<GameResult, D::Error>
where
    D: Deserializer<'de>,
{
    let keyword = lenient::text(deserializer)?;
    Ok(keyword.map_or(GameResult::Unknown, |keyword| GameResult::from_raw(&keyword)))
}

impl NormalizedRow {
    /// Rating of the tracked player.
    #[must_use]
    pub fn own_rating(&self) -> Option<i32> {
        match self.color {
            Color::White => self.white_rating,
            Color::Black => self.black_rating,
        }
    }

    /// Rating of the opponent.
    #[must_use]
    pub fn opponent_rating(&self) -> Option<i32> {
        match self.color {
            Color::White => self.black_rating,
            Color::Black => self.white_rating,
        }
    }

    /// Hour of day (UTC) at which the game ended.
    #[must_use]
    pub fn hour(&self) -> Option<u32> {
        self.timestamp.map(|t| t.hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_vocabulary() {
        assert_eq!(GameResult::from_raw("win"), GameResult::Win);
        assert_eq!(GameResult::from_raw("WIN "), GameResult::Win);
        for draw in [
            "agreed",
            "repetition",
            "stalemate",
            "insufficient",
            "50move",
            "timevsinsufficient",
        ] {
            assert_eq!(GameResult::from_raw(draw), GameResult::Draw, "{draw}");
        }
        for loss in ["checkmated", "timeout", "resigned", "abandoned", "lose"] {
            assert_eq!(GameResult::from_raw(loss), GameResult::Loss, "{loss}");
        }
        assert_eq!(GameResult::from_raw("loss"), GameResult::Loss);
        assert_eq!(GameResult::from_raw("unknown"), GameResult::Unknown);
        assert_eq!(GameResult::from_raw("bughouse???"), GameResult::Unknown);
        assert_eq!(GameResult::from_raw(""), GameResult::Unknown);
    }

    #[test]
    fn test_win_encodings_differ_only_on_draws() {
        assert_eq!(GameResult::Draw.win_strict(), Some(0.0));
        assert_eq!(GameResult::Draw.win_with_draws(), Some(0.5));
        for result in [GameResult::Win, GameResult::Loss] {
            assert_eq!(result.win_strict(), result.win_with_draws());
        }
        assert_eq!(GameResult::Unknown.win_strict(), None);
        assert_eq!(GameResult::Unknown.win_with_draws(), None);
    }

    #[test]
    fn test_perspective_ratings() {
        let row = NormalizedRow {
            result: GameResult::Win,
            color: Color::Black,
            opening: "Unknown Opening".to_owned(),
            timestamp: None,
            white_rating: Some(1600),
            black_rating: Some(1500),
            elo_diff: Some(-100),
            castle_self: Castling::None,
            castle_opponent: Castling::None,
            move_count: None,
            duration_minutes: None,
        };
        assert_eq!(row.own_rating(), Some(1500));
        assert_eq!(row.opponent_rating(), Some(1600));
        assert_eq!(row.color.opponent(), Color::White);
        assert_eq!(row.hour(), None);
    }

    #[test]
    fn test_castling_from_side() {
        assert_eq!(Castling::from(Some(CastlingSide::Kingside)), Castling::Kingside);
        assert_eq!(Castling::from(Some(CastlingSide::Queenside)), Castling::Queenside);
        assert_eq!(Castling::from(None), Castling::None);
    }
}
