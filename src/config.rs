use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Study configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Analysis parameters.
    pub analysis: AnalysisConfig,

    /// Synthetic study parameters (only needed to synthesize records).
    pub synthesis: Option<SynthesisConfig>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Array axis of the stored ensembles holding the members.
    #[serde(default)]
    pub member_axis: usize,

    /// First time step of the scoring window.
    #[serde(default)]
    pub window_start: usize,
    /// End (exclusive) of the scoring window; the series length if absent.
    pub window_end: Option<usize>,

    /// Value marking missing entries in the truth-space scores.
    pub sentinel: Option<f64>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Number of ensemble members.
    pub n_members: usize,
    /// Number of time steps.
    pub n_steps: usize,

    /// Peak value of the truth trajectory.
    pub peak: f64,
    /// Time step of the peak.
    pub peak_step: usize,
    /// Width (in time steps) of the seasonal curve.
    pub width: f64,

    /// Relative standard deviation of the model error.
    pub model_error: f64,

    /// Number of time steps between observations.
    pub obs_interval: usize,
    /// Standard deviation of the observation error.
    pub obs_error: f64,
    /// Whether the observation error is relative to the truth.
    pub relative_obs_error: bool,

    /// Random seed; drawn from the OS if absent.
    pub seed: Option<u64>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.analysis
            .validate()
            .context("invalid analysis parameters")?;
        if let Some(synthesis) = &self.synthesis {
            synthesis
                .validate()
                .context("invalid synthesis parameters")?;
        }
        Ok(())
    }
}

impl AnalysisConfig {
    fn validate(&self) -> Result<()> {
        check_num(self.member_axis, 0..2).context("invalid member axis")?;
        if let Some(window_end) = self.window_end {
            check_num(window_end, self.window_start + 1..).context("invalid window end")?;
        }
        if let Some(sentinel) = self.sentinel {
            if !sentinel.is_finite() {
                bail!("sentinel must be finite, but is {sentinel}");
            }
        }
        Ok(())
    }
}

impl SynthesisConfig {
    fn validate(&self) -> Result<()> {
        check_num(self.n_members, 1..10_000).context("invalid number of members")?;
        check_num(self.n_steps, 1..100_000).context("invalid number of steps")?;

        check_num(self.peak, 0.0..1e6).context("invalid peak value")?;
        check_num(self.peak_step, 0..self.n_steps).context("invalid peak step")?;
        check_num(self.width, 1.0..1e6).context("invalid width")?;

        check_num(self.model_error, 0.0..1.0).context("invalid model error")?;

        check_num(self.obs_interval, 1..=self.n_steps).context("invalid observation interval")?;
        check_num(self.obs_error, 0.0..1.0).context("invalid observation error")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
