//! Statistical utilities for the chessinsight project.
//!
//! This crate provides the numeric building blocks used by the game analysis
//! pipeline:
//!
//! - **Descriptive statistics**: Calculate mean, median, sample variance, standard deviation, etc.
//! - **Distributions**: Tail probabilities of Student's t and Fisher's F distributions
//! - **Hypothesis tests**: Two-sample mean-difference tests and one-way ANOVA
//! - **Binning**: Fixed-edge, half-open, lower-inclusive bins
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`distribution`]: Special functions and distribution tail probabilities
//! - [`hypothesis`]: Significance tests reporting statistic, p-value and a 0.05 decision
//! - [`binning`]: Half-open binning over ordered values
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use chessinsight_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.5);
//! ```
//!
//! ## Comparing two samples
//!
//! ```
//! use chessinsight_stats::hypothesis::{self, VarianceAssumption};
//!
//! let white = [1.0, 1.0, 0.5, 1.0, 0.0];
//! let black = [0.0, 0.0, 0.5, 0.0, 1.0];
//! let outcome = hypothesis::two_sample_t_test(
//!     &white,
//!     &black,
//!     VarianceAssumption::Unequal,
//!     hypothesis::SIGNIFICANCE_LEVEL,
//! )
//! .unwrap();
//! assert!(outcome.statistic > 0.0);
//! assert!(!outcome.significant);
//! ```
//!
//! ## Binning values
//!
//! ```
//! use chessinsight_stats::binning::HalfOpenBins;
//!
//! let bins = HalfOpenBins::new(vec![-100, 0, 100]).unwrap();
//! assert_eq!(bins.bin_count(), 4);
//! assert_eq!(bins.bin_of(0), 2);
//! assert_eq!(bins.bin_of(-1), 1);
//! ```

pub mod binning;
pub mod descriptive;
pub mod distribution;
pub mod hypothesis;
