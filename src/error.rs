//! Error types for the ensemble statistics.

/// Errors returned by the statistics in [`crate::stats`], [`crate::skill`]
/// and [`crate::mask`].
///
/// Variants fall in two groups. Precondition violations mean the inputs are
/// malformed (wrong shape, empty window). Degenerate results mean the inputs
/// are valid but the statistic is mathematically undefined for them; see
/// [`StatsError::is_degenerate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// The member axis index is not 0 or 1.
    #[error("member axis must be 0 or 1, got {axis}")]
    InvalidAxis {
        /// The invalid axis index.
        axis: usize,
    },

    /// The ensemble has no members or no time steps.
    #[error("ensemble must be non-empty, got {members} member(s) x {steps} step(s)")]
    EmptyEnsemble {
        /// Number of members.
        members: usize,
        /// Number of time steps.
        steps: usize,
    },

    /// A time-aligned input does not match the ensemble's time axis.
    #[error("{input} length {len} does not match {steps} time step(s)")]
    LengthMismatch {
        /// Name of the mismatched input.
        input: &'static str,
        /// Length of the input.
        len: usize,
        /// Expected number of time steps.
        steps: usize,
    },

    /// The time window `[start, end)` is empty.
    #[error("time window [{start}, {end}) is empty")]
    EmptyWindow {
        /// Window start.
        start: usize,
        /// Window end.
        end: usize,
    },

    /// The time window extends past the last time step.
    #[error("time window end {end} exceeds {steps} time step(s)")]
    WindowOutOfBounds {
        /// Window end.
        end: usize,
        /// Number of time steps.
        steps: usize,
    },

    /// The mask excludes every time step of the window.
    #[error("no time step left after masking")]
    EmptySample,

    /// A denominator variance is zero.
    #[error("{statistic} is undefined for a zero-variance reference")]
    ZeroVariance {
        /// Name of the undefined statistic.
        statistic: &'static str,
    },
}

impl StatsError {
    /// Whether the inputs were valid but the statistic is undefined for them.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::EmptySample | Self::ZeroVariance { .. })
    }
}
