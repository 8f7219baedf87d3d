//! Scalar skill scores of an ensemble against a reference series.

use crate::error::StatsError;
use crate::stats::{check_shape, member_mean, member_msd, time_axis};
use ndarray::{ArrayView1, ArrayView2, Axis};
use std::ops::Range;

/// An ensemble paired with a time-aligned reference series.
///
/// Scores are computed over a time window (the full series by default) and
/// may be restricted further by a mask aligned with the full time axis.
/// Masked-out steps do not count towards any mean or sum.
///
/// ```
/// use enstat::skill::Comparison;
/// use ndarray::{Axis, array};
///
/// let ensemble = array![[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]];
/// let truth = array![2.0, 3.0, 4.0];
/// let cmp = Comparison::new(ensemble.view(), truth.view(), Axis(0)).unwrap();
/// assert_eq!(cmp.bias().unwrap(), 0.0);
/// assert_eq!(cmp.nash_sutcliffe().unwrap(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Comparison<'a> {
    ensemble: ArrayView2<'a, f64>,
    reference: ArrayView1<'a, f64>,
    axis: Axis,
    window: Range<usize>,
    mask: Option<ArrayView1<'a, bool>>,
}

impl<'a> Comparison<'a> {
    /// Pair `ensemble` (members along `axis`) with `reference`.
    ///
    /// # Errors
    /// Returns a precondition error if the ensemble is empty, the axis is
    /// invalid or the reference length differs from the number of steps.
    pub fn new(
        ensemble: ArrayView2<'a, f64>,
        reference: ArrayView1<'a, f64>,
        axis: Axis,
    ) -> Result<Self, StatsError> {
        let (_, steps) = check_shape(ensemble, axis)?;
        if reference.len() != steps {
            return Err(StatsError::LengthMismatch {
                input: "reference",
                len: reference.len(),
                steps,
            });
        }
        Ok(Self {
            ensemble,
            reference,
            axis,
            window: 0..steps,
            mask: None,
        })
    }

    /// Restrict the scores to the time steps `[start, end)`.
    pub fn window(mut self, window: Range<usize>) -> Result<Self, StatsError> {
        if window.start >= window.end {
            return Err(StatsError::EmptyWindow {
                start: window.start,
                end: window.end,
            });
        }
        if window.end > self.steps() {
            return Err(StatsError::WindowOutOfBounds {
                end: window.end,
                steps: self.steps(),
            });
        }
        self.window = window;
        Ok(self)
    }

    /// Exclude the steps where `mask` is `false`.
    pub fn mask(mut self, mask: ArrayView1<'a, bool>) -> Result<Self, StatsError> {
        if mask.len() != self.steps() {
            return Err(StatsError::LengthMismatch {
                input: "mask",
                len: mask.len(),
                steps: self.steps(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    /// Number of time steps of the full series.
    pub fn steps(&self) -> usize {
        self.reference.len()
    }

    /// Number of time steps the scores are computed over.
    pub fn sample_count(&self) -> usize {
        self.window.clone().filter(|&t| self.includes(t)).count()
    }

    /// Mean over time of (ensemble mean − reference).
    ///
    /// Positive values mean the ensemble over-estimates the reference.
    pub fn bias(&self) -> Result<f64, StatsError> {
        let samples = self.samples()?;
        let sum: f64 = samples
            .iter()
            .map(|&t| self.mean_at(t) - self.reference[t])
            .sum();
        Ok(sum / samples.len() as f64)
    }

    /// Root mean square difference between the ensemble mean and the reference (rmsd).
    pub fn root_mean_square_difference(&self) -> Result<f64, StatsError> {
        let samples = self.samples()?;
        let sum: f64 = samples
            .iter()
            .map(|&t| (self.mean_at(t) - self.reference[t]).powi(2))
            .sum();
        Ok((sum / samples.len() as f64).sqrt())
    }

    /// Time average of the per-step member-wise root mean square difference (mrmsd).
    ///
    /// Not the same quantity as [`Self::root_mean_square_difference`]: here the
    /// members are compared first and the square root is taken per step.
    pub fn ensemble_root_mean_square_difference(&self) -> Result<f64, StatsError> {
        let samples = self.samples()?;
        let sum: f64 = samples
            .iter()
            .map(|&t| member_msd(self.members_at(t), self.reference[t]).sqrt())
            .sum();
        Ok(sum / samples.len() as f64)
    }

    /// Nash–Sutcliffe efficiency of the ensemble mean against the reference.
    ///
    /// # Errors
    /// Returns [`StatsError::ZeroVariance`] if the reference is constant over
    /// the sampled steps.
    pub fn nash_sutcliffe(&self) -> Result<f64, StatsError> {
        let samples = self.samples()?;
        let ref_mean =
            samples.iter().map(|&t| self.reference[t]).sum::<f64>() / samples.len() as f64;

        let mut err_sum = 0.0;
        let mut var_sum = 0.0;
        for &t in &samples {
            err_sum += (self.mean_at(t) - self.reference[t]).powi(2);
            var_sum += (self.reference[t] - ref_mean).powi(2);
        }

        if var_sum == 0.0 {
            return Err(StatsError::ZeroVariance {
                statistic: "Nash-Sutcliffe efficiency",
            });
        }
        Ok(1.0 - err_sum / var_sum)
    }

    fn includes(&self, t: usize) -> bool {
        self.mask.as_ref().is_none_or(|mask| mask[t])
    }

    fn samples(&self) -> Result<Vec<usize>, StatsError> {
        let samples: Vec<usize> = self.window.clone().filter(|&t| self.includes(t)).collect();
        if samples.is_empty() {
            return Err(StatsError::EmptySample);
        }
        Ok(samples)
    }

    fn members_at(&self, t: usize) -> ArrayView1<'_, f64> {
        self.ensemble.index_axis(time_axis(self.axis), t)
    }

    fn mean_at(&self, t: usize) -> f64 {
        member_mean(self.members_at(t))
    }
}
