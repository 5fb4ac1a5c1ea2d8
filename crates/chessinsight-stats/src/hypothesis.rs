//! Significance tests over numeric samples
//!
//! Two comparisons are provided:
//!
//! - [`two_sample_t_test`]: difference of means between two independent samples,
//!   Welch's unequal-variance form by default or the pooled Student form
//! - [`one_way_anova`]: variance-ratio (F) test across two or more groups
//!
//! Every test reports the raw statistic and two-sided p-value together with the
//! decision at the requested significance level, so callers never see a bare
//! boolean. Samples may hold fractional values (e.g. draws encoded as `0.5`).
//!
//! A test is only run when every sample has at least [`MIN_GROUP_SIZE`]
//! observations; otherwise the functions return `None` and the caller decides
//! how to report the insufficiency.

use crate::{
    descriptive::{self, sum_of_squared_deviations},
    distribution,
};

/// Significance threshold used throughout the analyses.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Minimum number of observations a sample needs to take part in a test.
pub const MIN_GROUP_SIZE: usize = 2;

/// Result of a significance test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestOutcome {
    /// Test statistic (t for mean-difference tests, F for ANOVA).
    pub statistic: f64,
    /// Two-sided p-value (upper tail for F).
    pub p_value: f64,
    /// Whether `p_value` is below the significance level.
    pub significant: bool,
}

impl TestOutcome {
    #[must_use]
    pub fn new(statistic: f64, p_value: f64, alpha: f64) -> Self {
        Self {
            statistic,
            p_value,
            significant: p_value < alpha,
        }
    }
}

/// Variance assumption for the two-sample mean-difference test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VarianceAssumption {
    /// Welch's t-test with Welch-Satterthwaite degrees of freedom.
    #[default]
    Unequal,
    /// Student's t-test with pooled variance.
    Equal,
}

/// Compares the means of two independent samples.
///
/// Returns `None` when either sample has fewer than [`MIN_GROUP_SIZE`] values.
///
/// When both samples have zero variance the statistic degenerates: equal means
/// give a statistic of `0.0` with p-value `1.0`, different means give an
/// infinite statistic with p-value `0.0`.
///
/// # Examples
///
/// ```
/// use chessinsight_stats::hypothesis::{two_sample_t_test, VarianceAssumption};
///
/// let a = [1.0, 0.0, 1.0, 1.0, 0.5];
/// let b = [0.0, 0.0, 0.5, 0.0, 1.0];
/// let welch = two_sample_t_test(&a, &b, VarianceAssumption::Unequal, 0.05).unwrap();
/// assert!((welch.statistic - 2.0_f64.sqrt()).abs() < 1e-9);
/// assert!((welch.p_value - 0.195_015_528).abs() < 1e-6);
///
/// assert!(two_sample_t_test(&a, &[1.0], VarianceAssumption::Unequal, 0.05).is_none());
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn two_sample_t_test(
    a: &[f64],
    b: &[f64],
    variance: VarianceAssumption,
    alpha: f64,
) -> Option<TestOutcome> {
    if a.len() < MIN_GROUP_SIZE || b.len() < MIN_GROUP_SIZE {
        return None;
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let mean_diff = descriptive::mean(a)? - descriptive::mean(b)?;
    let var_a = descriptive::sample_variance(a)?;
    let var_b = descriptive::sample_variance(b)?;

    let (std_err, df) = match variance {
        VarianceAssumption::Unequal => {
            let se_a = var_a / na;
            let se_b = var_b / nb;
            let std_err = (se_a + se_b).sqrt();
            let df = (se_a + se_b).powi(2)
                / (se_a.powi(2) / (na - 1.0) + se_b.powi(2) / (nb - 1.0));
            (std_err, df)
        }
        VarianceAssumption::Equal => {
            let df = na + nb - 2.0;
            let pooled = ((na - 1.0) * var_a + (nb - 1.0) * var_b) / df;
            ((pooled * (1.0 / na + 1.0 / nb)).sqrt(), df)
        }
    };

    if std_err == 0.0 || !std_err.is_finite() {
        return Some(degenerate_outcome(mean_diff, alpha));
    }

    let statistic = mean_diff / std_err;
    let p_value = distribution::students_t_two_sided_p(statistic, df);
    Some(TestOutcome::new(statistic, p_value, alpha))
}

/// One-way analysis of variance across independent groups.
///
/// Returns `None` when fewer than two groups are given or any group has fewer
/// than [`MIN_GROUP_SIZE`] values.
///
/// # Examples
///
/// ```
/// use chessinsight_stats::hypothesis::one_way_anova;
///
/// let groups = [
///     vec![1.0, 0.0, 1.0, 1.0],
///     vec![0.0, 0.0, 0.5, 0.0],
///     vec![0.5, 1.0, 0.5, 1.0],
/// ];
/// let outcome = one_way_anova(&groups, 0.05).unwrap();
/// assert!((outcome.statistic - 3.947_368_421).abs() < 1e-6);
/// assert!(!outcome.significant);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn one_way_anova<G>(groups: &[G], alpha: f64) -> Option<TestOutcome>
where
    G: AsRef<[f64]>,
{
    if groups.len() < 2
        || groups
            .iter()
            .any(|group| group.as_ref().len() < MIN_GROUP_SIZE)
    {
        return None;
    }

    let total_count = groups.iter().map(|g| g.as_ref().len()).sum::<usize>();
    let grand_mean = groups
        .iter()
        .flat_map(|g| g.as_ref().iter())
        .sum::<f64>()
        / total_count as f64;

    let mut between = 0.0;
    let mut within = 0.0;
    for group in groups {
        let values = group.as_ref();
        let mean = descriptive::mean(values)?;
        between += values.len() as f64 * (mean - grand_mean).powi(2);
        within += sum_of_squared_deviations(values, mean);
    }

    let df_between = (groups.len() - 1) as f64;
    let df_within = (total_count - groups.len()) as f64;
    let mean_square_within = within / df_within;

    if mean_square_within == 0.0 {
        return Some(degenerate_outcome(between, alpha));
    }

    let statistic = (between / df_between) / mean_square_within;
    let p_value = distribution::f_upper_tail_p(statistic, df_between, df_within);
    Some(TestOutcome::new(statistic, p_value, alpha))
}

fn degenerate_outcome(effect: f64, alpha: f64) -> TestOutcome {
    if effect.abs() < f64::EPSILON {
        TestOutcome::new(0.0, 1.0, alpha)
    } else {
        TestOutcome::new(effect.signum() * f64::INFINITY, 0.0, alpha)
    }
}
