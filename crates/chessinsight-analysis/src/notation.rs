//! Tokenizer for embedded game notation
//!
//! Archived games carry their moves as a single free-text string: a block of
//! `[Name "Value"]` tag pairs followed by movetext that interleaves move
//! numbers, moves, clock comments, annotation glyphs and a result marker:
//!
//! ```text
//! [Date "2024.01.05"]
//! [StartTime "18:00:00"]
//! [EndTime "18:10:30"]
//!
//! 1. e4 {[%clk 0:09:58.2]} 1... e5 {[%clk 0:09:57.1]} 2. Nf3 Nc6 3. O-O 1-0
//! ```
//!
//! [`Notation::parse`] turns this into tag pairs plus an indexed ply stream.
//! Comments (`{...}`, `; ...`), variations (`(...)`), NAGs (`$n`), move-number
//! prefixes and result markers are dropped; every remaining token becomes a
//! [`Ply`] whose index decides which side played it. White plays the even
//! indices and black the odd ones. Every move number re-anchors the index
//! (`N.` at `2(N-1)`, `N...` at `2(N-1)+1`), so a stray token such as `e.p.`
//! or a detached `!` never shifts later plies onto the wrong side.
//!
//! All derived features ([`Notation::castling_of`], [`Notation::move_count`],
//! [`Notation::duration_minutes`]) read the parsed stream and degrade to
//! "absent" rather than failing.
//!
//! # Examples
//!
//! ```
//! use chessinsight_analysis::{
//!     notation::{CastlingSide, Notation},
//!     row::Color,
//! };
//!
//! let notation = Notation::parse("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O d6 1/2-1/2");
//! assert_eq!(notation.plies().len(), 8);
//! assert_eq!(notation.castling_of(Color::White), Some(CastlingSide::Kingside));
//! assert_eq!(notation.castling_of(Color::Black), None);
//! assert_eq!(notation.move_count(), Some(4));
//! ```

use std::{collections::BTreeSet, sync::LazyLock};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::row::Color;

static TAG_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[\s*([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\s*\]$"#).expect("valid tag regex")
});

static MOVE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(\.*)(.*)$").expect("valid move number regex"));

const RESULT_MARKERS: [&str; 5] = ["1-0", "0-1", "1/2-1/2", "½-½", "*"];

/// A `[Name "Value"]` pair from the notation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPair<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// One half-move together with its position in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ply<'a> {
    /// Ply index; even for white, odd for black
    pub index: usize,
    /// Move token as written (SAN, possibly with check or annotation suffixes)
    pub san: &'a str,
}

impl Ply<'_> {
    /// The side that played this ply.
    #[must_use]
    pub fn color(&self) -> Color {
        if self.index.is_multiple_of(2) {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Castling side, if this ply is a castling move.
    #[must_use]
    pub fn castling(&self) -> Option<CastlingSide> {
        CastlingSide::from_san(self.san)
    }
}

/// Which wing the king castled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

impl CastlingSide {
    /// Recognizes `O-O` / `O-O-O` in any casing, with zeros instead of letters,
    /// and with trailing check or annotation marks.
    ///
    /// The queenside form is matched on the whole token before the kingside
    /// form, so `O-O-O` is never taken for `O-O`.
    #[must_use]
    pub fn from_san(san: &str) -> Option<Self> {
        let core = san
            .trim_end_matches(['+', '#', '!', '?'])
            .to_ascii_uppercase()
            .replace('0', "O");
        if core == "O-O-O" {
            Some(CastlingSide::Queenside)
        } else if core == "O-O" {
            Some(CastlingSide::Kingside)
        } else {
            None
        }
    }
}

/// Parsed game notation: header tags and the mainline ply stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notation<'a> {
    tags: Vec<TagPair<'a>>,
    plies: Vec<Ply<'a>>,
    move_numbers: BTreeSet<u32>,
}

impl<'a> Notation<'a> {
    /// Tokenizes notation text. Never fails; unrecognized input is skipped.
    #[must_use]
    pub fn parse(text: &'a str) -> Self {
        let mut notation = Notation::default();
        let mut next_index = 0;
        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b if b.is_ascii_whitespace() => pos += 1,
                b'{' => pos = skip_past(bytes, pos, b'}'),
                b';' => pos = skip_past(bytes, pos, b'\n'),
                b'(' => pos = skip_variation(bytes, pos),
                b')' => pos += 1,
                b'[' => {
                    let end = tag_end(bytes, pos);
                    if let Some(tag) = parse_tag(&text[pos..end]) {
                        notation.tags.push(tag);
                    }
                    pos = end;
                }
                _ => {
                    let end = token_end(bytes, pos);
                    notation.push_token(&text[pos..end], &mut next_index);
                    pos = end;
                }
            }
        }

        notation
    }

    fn push_token(&mut self, token: &'a str, next_index: &mut usize) {
        if token.starts_with('$') || RESULT_MARKERS.contains(&token) || is_ornament(token) {
            return;
        }

        // `1. ... e5` spells black's reply with a detached ellipsis
        if token.len() >= 3 && token.chars().all(|c| c == '.') {
            if next_index.is_multiple_of(2) {
                *next_index += 1;
            }
            return;
        }

        let mut san = token;
        if let Some(caps) = MOVE_NUMBER.captures(token) {
            let dots = caps.get(2).map_or(0, |m| m.len());
            let rest = caps.get(3).map_or("", |m| m.as_str());
            // A bare number with no dots and nothing after it is not a move marker
            if dots > 0 || rest.is_empty() {
                if let Some(number) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                    self.move_numbers.insert(number);
                    *next_index = ply_index_of(number, dots >= 3);
                }
                san = rest;
            }
        }

        if san.is_empty() || san.chars().all(|c| c == '.') {
            return;
        }

        self.plies.push(Ply {
            index: *next_index,
            san,
        });
        *next_index += 1;
    }

    /// All header tags in order of appearance.
    #[must_use]
    pub fn tags(&self) -> &[TagPair<'a>] {
        &self.tags
    }

    /// Value of the first tag with the given name (case-insensitive).
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&'a str> {
        self.tags
            .iter()
            .find(|tag| tag.name.eq_ignore_ascii_case(name))
            .map(|tag| tag.value)
    }

    /// The mainline plies in game order.
    #[must_use]
    pub fn plies(&self) -> &[Ply<'a>] {
        &self.plies
    }

    /// Plies played by one side.
    pub fn plies_of(&self, color: Color) -> impl Iterator<Item = &Ply<'a>> {
        self.plies.iter().filter(move |ply| ply.color() == color)
    }

    /// The side's castling move, if it castled at all.
    #[must_use]
    pub fn castling_of(&self, color: Color) -> Option<CastlingSide> {
        self.plies_of(color).find_map(Ply::castling)
    }

    /// Number of moves in the game.
    ///
    /// Counts distinct move numbers, so a final move with only white's ply
    /// still counts once. Without move numbers, whole pairs are counted as
    /// `plies / 2`. `None` when the notation holds no plies.
    #[must_use]
    pub fn move_count(&self) -> Option<u32> {
        if self.plies.is_empty() {
            return None;
        }
        if self.move_numbers.is_empty() {
            return u32::try_from(self.plies.len() / 2).ok();
        }
        u32::try_from(self.move_numbers.len()).ok()
    }

    /// Minutes between the `StartTime` and `EndTime` tags.
    ///
    /// Both times are anchored on the game date (`Date`, falling back to
    /// `UTCDate`); the end time uses `EndDate` when present. Missing or
    /// unparseable tags, or an end before the start, give `None`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn duration_minutes(&self) -> Option<f64> {
        let date = self
            .tag("Date")
            .and_then(parse_date)
            .or_else(|| self.tag("UTCDate").and_then(parse_date))?;
        let end_date = self.tag("EndDate").and_then(parse_date).unwrap_or(date);

        let start = NaiveDateTime::new(date, self.tag("StartTime").and_then(parse_time)?);
        let end = NaiveDateTime::new(end_date, self.tag("EndTime").and_then(parse_time)?);

        let seconds = (end - start).num_seconds();
        if seconds < 0 {
            return None;
        }
        Some(seconds as f64 / 60.0)
    }
}

/// Index of the first ply of move `number`; `N.` is white's ply, `N...` black's.
fn ply_index_of(number: u32, black: bool) -> usize {
    let white = usize::try_from(number.saturating_sub(1))
        .unwrap_or(usize::MAX)
        .saturating_mul(2);
    white.saturating_add(usize::from(black))
}

/// Tokens that annotate a move without being one: `e.p.` and detached glyphs.
fn is_ornament(token: &str) -> bool {
    token.eq_ignore_ascii_case("e.p.")
        || token.chars().all(|c| matches!(c, '!' | '?' | '+' | '#'))
}

fn skip_past(bytes: &[u8], start: usize, terminator: u8) -> usize {
    bytes[start + 1..]
        .iter()
        .position(|&b| b == terminator)
        .map_or(bytes.len(), |offset| start + 1 + offset + 1)
}

fn skip_variation(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0_usize;
    let mut pos = start;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                pos = skip_past(bytes, pos, b'}');
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return pos + 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    bytes.len()
}

fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut in_quotes = false;
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if in_quotes => pos += 1,
            b'"' => in_quotes = !in_quotes,
            b']' if !in_quotes => return pos + 1,
            // Tag pairs never span lines
            b'\n' => return pos,
            _ => {}
        }
        pos += 1;
    }
    bytes.len()
}

fn token_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b.is_ascii_whitespace() || matches!(b, b'{' | b'(' | b')' | b'[' | b';'))
        .map_or(bytes.len(), |offset| start + offset)
}

fn parse_tag(raw: &str) -> Option<TagPair<'_>> {
    let caps = TAG_PAIR.captures(raw.trim())?;
    Some(TagPair {
        name: caps.get(1)?.as_str(),
        value: caps.get(2)?.as_str(),
    })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y.%m.%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S%.f"))
        .ok()
}
