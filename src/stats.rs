//! Per-time-step statistics of an ensemble.
//!
//! Every function takes a `member × time` array together with the [`Axis`]
//! holding the members and returns one value per time step.

use crate::error::StatsError;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Reference value a statistic is measured against.
///
/// A scalar applies to every time step; a series must be aligned with the
/// ensemble's time axis.
#[derive(Debug, Clone, Copy)]
pub enum Reference<'a> {
    /// The same value at every time step.
    Scalar(f64),
    /// One value per time step.
    Series(ArrayView1<'a, f64>),
}

impl Reference<'_> {
    fn at(&self, t: usize) -> f64 {
        match self {
            Self::Scalar(val) => *val,
            Self::Series(series) => series[t],
        }
    }

    fn check(&self, steps: usize) -> Result<(), StatsError> {
        match self {
            Self::Series(series) if series.len() != steps => Err(StatsError::LengthMismatch {
                input: "reference",
                len: series.len(),
                steps,
            }),
            _ => Ok(()),
        }
    }
}

impl From<f64> for Reference<'_> {
    fn from(val: f64) -> Self {
        Self::Scalar(val)
    }
}

impl<'a> From<ArrayView1<'a, f64>> for Reference<'a> {
    fn from(series: ArrayView1<'a, f64>) -> Self {
        Self::Series(series)
    }
}

impl<'a> From<&'a Array1<f64>> for Reference<'a> {
    fn from(series: &'a Array1<f64>) -> Self {
        Self::Series(series.view())
    }
}

impl<'a> From<&'a [f64]> for Reference<'a> {
    fn from(series: &'a [f64]) -> Self {
        Self::Series(ArrayView1::from(series))
    }
}

/// Arithmetic mean across members.
pub fn ensemble_mean(a: ArrayView2<f64>, axis: Axis) -> Result<Array1<f64>, StatsError> {
    check_shape(a, axis)?;
    Ok(per_step(a, axis, |_, members| member_mean(members)))
}

/// Population variance across members (ensp).
pub fn ensemble_spread(a: ArrayView2<f64>, axis: Axis) -> Result<Array1<f64>, StatsError> {
    let mean = ensemble_mean(a, axis)?;
    mean_squared_deviation(a, mean.view(), axis)
}

/// Squared deviation of the ensemble mean from `m` (ensk).
pub fn ensemble_skill_error<'r>(
    a: ArrayView2<f64>,
    m: impl Into<Reference<'r>>,
    axis: Axis,
) -> Result<Array1<f64>, StatsError> {
    let m = m.into();
    let (_, steps) = check_shape(a, axis)?;
    m.check(steps)?;
    Ok(per_step(a, axis, |t, members| {
        (member_mean(members) - m.at(t)).powi(2)
    }))
}

/// Mean squared deviation of the members from `m` (msd).
pub fn mean_squared_deviation<'r>(
    a: ArrayView2<f64>,
    m: impl Into<Reference<'r>>,
    axis: Axis,
) -> Result<Array1<f64>, StatsError> {
    let m = m.into();
    let (_, steps) = check_shape(a, axis)?;
    m.check(steps)?;
    Ok(per_step(a, axis, |t, members| member_msd(members, m.at(t))))
}

/// Third standardized moment about the ensemble mean.
///
/// NaN at every step where the members have zero spread.
pub fn skewness(a: ArrayView2<f64>, axis: Axis) -> Result<Array1<f64>, StatsError> {
    check_shape(a, axis)?;
    Ok(per_step(a, axis, |_, members| {
        standardized_moment(members, 3)
    }))
}

/// Excess kurtosis: fourth standardized moment minus 3.
///
/// NaN at every step where the members have zero spread.
pub fn kurtosis(a: ArrayView2<f64>, axis: Axis) -> Result<Array1<f64>, StatsError> {
    check_shape(a, axis)?;
    Ok(per_step(a, axis, |_, members| {
        standardized_moment(members, 4) - 3.0
    }))
}

/// Validate the member axis and return `(members, steps)`.
pub(crate) fn check_shape(a: ArrayView2<f64>, axis: Axis) -> Result<(usize, usize), StatsError> {
    if axis.index() > 1 {
        return Err(StatsError::InvalidAxis { axis: axis.index() });
    }
    let members = a.len_of(axis);
    let steps = a.len_of(time_axis(axis));
    if members == 0 || steps == 0 {
        return Err(StatsError::EmptyEnsemble { members, steps });
    }
    Ok((members, steps))
}

/// The axis that is not the member axis. Only valid after [`check_shape`].
pub(crate) fn time_axis(axis: Axis) -> Axis {
    Axis(1 - axis.index())
}

/// Mean taken as an offset from the first member, so identical members give
/// their common value exactly.
pub(crate) fn member_mean(members: ArrayView1<f64>) -> f64 {
    let Some(&first) = members.first() else {
        return f64::NAN;
    };
    first + members.iter().map(|&val| val - first).sum::<f64>() / members.len() as f64
}

pub(crate) fn member_msd(members: ArrayView1<f64>, m: f64) -> f64 {
    members.iter().map(|&val| (val - m).powi(2)).sum::<f64>() / members.len() as f64
}

fn standardized_moment(members: ArrayView1<f64>, order: i32) -> f64 {
    let mean = member_mean(members);
    let std_dev = member_msd(members, mean).sqrt();
    if std_dev == 0.0 {
        return f64::NAN;
    }
    members
        .iter()
        .map(|&val| ((val - mean) / std_dev).powi(order))
        .sum::<f64>()
        / members.len() as f64
}

fn per_step<F>(a: ArrayView2<f64>, axis: Axis, mut stat: F) -> Array1<f64>
where
    F: FnMut(usize, ArrayView1<f64>) -> f64,
{
    a.axis_iter(time_axis(axis))
        .enumerate()
        .map(|(t, members)| stat(t, members))
        .collect()
}
