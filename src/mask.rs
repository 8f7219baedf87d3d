//! Time-aligned inclusion masks (`true` = include the step).

use crate::error::StatsError;
use ndarray::{Array1, ArrayView1, Zip};

/// Sentinel stored at time steps without an observation.
pub const MISSING_OBS: f64 = -1.0;

/// Include the steps carrying an observation (negative values flag missing ones).
pub fn observed(obs: ArrayView1<f64>) -> Array1<bool> {
    obs.mapv(|val| val >= 0.0)
}

/// Include the steps where neither `a` nor `b` equals `sentinel`.
pub fn exclude_sentinel(
    a: ArrayView1<f64>,
    b: ArrayView1<f64>,
    sentinel: f64,
) -> Result<Array1<bool>, StatsError> {
    check_len("second series", b.len(), a.len())?;
    Ok(Zip::from(&a)
        .and(&b)
        .map_collect(|&x, &y| x != sentinel && y != sentinel))
}

/// Include the steps included by both masks.
pub fn intersect(a: ArrayView1<bool>, b: ArrayView1<bool>) -> Result<Array1<bool>, StatsError> {
    check_len("second mask", b.len(), a.len())?;
    Ok(Zip::from(&a).and(&b).map_collect(|&x, &y| x && y))
}

fn check_len(input: &'static str, len: usize, steps: usize) -> Result<(), StatsError> {
    if len != steps {
        return Err(StatsError::LengthMismatch { input, len, steps });
    }
    Ok(())
}
