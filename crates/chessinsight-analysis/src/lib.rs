//! Game-history analytics for a single tracked chess player
//!
//! This crate turns archived game records into a flat table of per-game
//! features and runs grouped win-rate analyses with significance tests over
//! that table.
//!
//! # Overview
//!
//! The pipeline has two stages that can run separately, joined by a CSV table:
//!
//! ## Normalization
//!
//! 1. **Load Records** ([`record::RawArchive`]): Deserialize an archive of nested game objects,
//!    keeping elements that are not game objects aside as unreadable
//! 2. **Tokenize Notation** ([`notation::Notation`]): Read tags and moves from the embedded notation text
//! 3. **Extract Features** ([`extract::extract_archive`]): Build one [`row::NormalizedRow`] per game
//!    the tracked player took part in, counting skipped and malformed records
//! 4. **Persist** ([`table`]): Write the [`store::RowStore`] as CSV
//!
//! ## Analysis
//!
//! 1. **Load Rows** ([`store::RowStore::load`]): Read a previously written table
//! 2. **Group and Aggregate** ([`aggregate`]): Per-group counts and mean win values
//! 3. **Test** ([`analysis::Analyzer`]): t-tests and one-way ANOVA over the groups
//! 4. **Report** ([`analysis::AnalysisReport`]): One serializable value holding every analysis
//!
//! # Configuration
//!
//! Tracked account, time-class filter, Elo bucket edges, the opening
//! frequency threshold and the t-test variance assumption are carried by
//! [`config::AnalysisConfig`].
//!
//! # Examples
//!
//! ```
//! use chessinsight_analysis::{
//!     analysis::Analyzer,
//!     config::AnalysisConfig,
//!     extract,
//!     record::RawArchive,
//! };
//!
//! let archive: RawArchive = serde_json::from_str(
//!     r#"{"games": [{
//!         "white": {"username": "alice", "rating": 1500, "result": "win"},
//!         "black": {"username": "bob", "rating": 1450, "result": "resigned"},
//!         "eco": "https://www.chess.com/openings/Italian-Game",
//!         "end_time": 1700000000,
//!         "time_class": "blitz",
//!         "pgn": "1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6 4. O-O 1-0"
//!     }]}"#,
//! )?;
//!
//! let config = AnalysisConfig::new("alice");
//! let (store, report) = extract::extract_archive(&archive, &config);
//! assert_eq!(report.extracted, 1);
//!
//! let analysis = Analyzer::new(&store, &config)?.report();
//! assert_eq!(analysis.overall.wins, 1);
//! assert_eq!(analysis.by_opening.excluded_openings, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod extract;
mod lenient;
pub mod notation;
pub mod record;
pub mod row;
pub mod store;
pub mod table;
