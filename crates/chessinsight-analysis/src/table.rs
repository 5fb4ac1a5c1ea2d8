//! Tabular (CSV) persistence of normalized rows
//!
//! One header row followed by one line per game:
//!
//! ```text
//! result,color,opening,timestamp,white_rating,black_rating,elo_diff,castle_self,castle_opponent,move_count,duration_minutes
//! win,white,Italian Game,2023-11-14T22:13:20Z,1500,1400,100,kingside,none,31,12.5
//! ```
//!
//! Enumerations are written in lowercase, timestamps in RFC 3339 and absent
//! values as empty cells. Only `result`, `color` and `opening` are required
//! when reading; a table without one of them is rejected as a whole.
//!
//! Reading is lenient cell by cell: an unparseable timestamp, rating, count
//! or duration reads as absent, an unrecognized castling value as
//! [`Castling::None`](crate::row::Castling::None) and an unrecognized result
//! as [`GameResult::Unknown`](crate::row::GameResult::Unknown). Only a line
//! whose `color` cannot be decoded (or whose shape is broken) is skipped with
//! a warning.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::Path,
};

use crate::{row::NormalizedRow, store::RowStore};

/// Column order of written tables.
pub const COLUMNS: [&str; 11] = [
    "result",
    "color",
    "opening",
    "timestamp",
    "white_rating",
    "black_rating",
    "elo_diff",
    "castle_self",
    "castle_opponent",
    "move_count",
    "duration_minutes",
];

/// Columns without which a table cannot be analyzed.
pub const REQUIRED_COLUMNS: [&str; 3] = ["result", "color", "opening"];

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StoreError {
    #[display("required column `{column}` is missing")]
    #[from(skip)]
    MissingColumn { column: &'static str },
    #[display("malformed table: {_0}")]
    Csv(csv::Error),
    #[display("I/O error: {_0}")]
    Io(io::Error),
}

impl RowStore {
    /// Reads a table.
    pub fn read_csv<R>(reader: R) -> Result<RowStore, StoreError>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if let Some(column) = REQUIRED_COLUMNS
            .into_iter()
            .find(|column| !headers.iter().any(|header| header == *column))
        {
            return Err(StoreError::MissingColumn { column });
        }

        let mut rows = vec![];
        let mut skipped = 0_usize;
        for (line, row) in reader.deserialize::<NormalizedRow>().enumerate() {
            match row {
                Ok(row) => rows.push(row),
                Err(error) if matches!(error.kind(), csv::ErrorKind::Deserialize { .. }) => {
                    skipped += 1;
                    tracing::debug!(line = line + 2, "skipping undecodable row: {error}");
                }
                Err(error) => return Err(error.into()),
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, "skipped undecodable rows");
        }

        Ok(RowStore::new(rows))
    }

    /// Writes the table with every column of [`COLUMNS`].
    pub fn write_csv<W>(&self, writer: W) -> Result<(), StoreError>
    where
        W: io::Write,
    {
        let mut writer = csv::Writer::from_writer(writer);
        if self.is_empty() {
            writer.write_record(COLUMNS)?;
        }
        for row in self {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load<P>(path: P) -> Result<RowStore, StoreError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Self::read_csv(BufReader::new(file))
    }

    pub fn save<P>(&self, path: P) -> Result<(), StoreError>
    where
        P: AsRef<Path>,
    {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }
}
