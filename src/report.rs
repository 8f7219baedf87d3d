//! Statistics report of one ensemble record.

use crate::config::AnalysisConfig;
use crate::error::StatsError;
use crate::mask;
use crate::model::EnsembleRecord;
use crate::skill::Comparison;
use crate::stats;
use anyhow::{Context, Result};
use ndarray::{Array1, ArrayView1, Axis, s};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Per-time-step profile of the ensemble.
///
/// Observation-space columns hold `None` at steps without an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub mean: Vec<f64>,
    pub spread: Vec<f64>,
    pub skewness: Vec<Option<f64>>,
    pub kurtosis: Vec<Option<f64>>,
    /// Root mean squared deviation of the members from the observation.
    pub rmsd: Vec<Option<f64>>,
    /// Distance of the ensemble mean from the observation.
    pub rensk: Vec<Option<f64>>,
    /// Spread-to-error ratio: `sqrt(spread) / rmsd`.
    pub ratio: Vec<Option<f64>>,
}

/// Time averages over the observed steps of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsScores {
    pub n_obs: usize,
    pub mean_msd: Option<f64>,
    pub mean_ensk: Option<f64>,
    pub mean_ensp: Option<f64>,
    pub mean_rmsd: Option<f64>,
    pub mean_rensk: Option<f64>,
    pub mean_rensp: Option<f64>,
    /// `mean_ensk / mean_ensp`.
    pub ratio_ensk_ensp: Option<f64>,
    /// `sum(rensk) / sum(rmsd)`.
    pub ratio_rensk_rmsd: Option<f64>,
}

/// Scores of the ensemble mean against the truth over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthScores {
    pub n_samples: usize,
    pub truth_max: f64,
    pub mean_max: f64,
    pub max_diff: f64,
    pub nash_sutcliffe: Option<f64>,
    pub rmsd: Option<f64>,
    pub mrmsd: Option<f64>,
    pub bias: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub name: String,
    pub n_members: usize,
    pub n_steps: usize,
    pub window: (usize, usize),
    pub profile: Profile,
    pub obs: ObsScores,
    pub truth: TruthScores,
}

impl StudyReport {
    /// Compute the report of `record`.
    ///
    /// Undefined statistics are stored as `None`.
    ///
    /// # Errors
    /// Returns an error if the record or the window is inconsistent.
    pub fn compute(record: &EnsembleRecord, cfg: &AnalysisConfig) -> Result<Self> {
        let axis = Axis(cfg.member_axis);
        let ensemble = record.ensemble().context("invalid ensemble")?;
        let ensemble = ensemble.view();
        let obs = ArrayView1::from(&record.obs[..]);
        let truth = ArrayView1::from(&record.truth[..]);

        let n_steps = truth.len();
        let window = cfg.window_start..cfg.window_end.unwrap_or(n_steps);

        let mean = stats::ensemble_mean(ensemble, axis).context("failed to compute mean")?;
        let sentinel_mask = cfg
            .sentinel
            .map(|sentinel| mask::exclude_sentinel(mean.view(), truth, sentinel))
            .transpose()
            .context("failed to build sentinel mask")?;

        let mut cmp = Comparison::new(ensemble, truth, axis)
            .context("failed to pair ensemble with truth")?
            .window(window.clone())
            .context("invalid window")?;
        if let Some(sentinel_mask) = &sentinel_mask {
            cmp = cmp.mask(sentinel_mask.view())?;
        }

        let spread = stats::ensemble_spread(ensemble, axis)?;
        let skewness = stats::skewness(ensemble, axis)?;
        let kurtosis = stats::kurtosis(ensemble, axis)?;
        let msd = stats::mean_squared_deviation(ensemble, obs, axis)?;
        let ensk = stats::ensemble_skill_error(ensemble, obs, axis)?;
        let observed = mask::observed(obs);

        let at_obs = |vals: &Array1<f64>, f: fn(f64) -> f64| -> Vec<Option<f64>> {
            vals.iter()
                .zip(observed.iter())
                .map(|(&val, &is_obs)| is_obs.then(|| f(val)))
                .collect()
        };
        let rmsd = at_obs(&msd, f64::sqrt);
        let rensk = at_obs(&ensk, f64::sqrt);
        let ratio = rmsd
            .iter()
            .zip(spread.iter())
            .map(|(&rmsd, &ensp)| {
                rmsd.filter(|&rmsd| rmsd != 0.0)
                    .map(|rmsd| ensp.sqrt() / rmsd)
            })
            .collect();

        let obs_steps: Vec<usize> = window.clone().filter(|&t| observed[t]).collect();
        let obs_scores = ObsScores::compute(&obs_steps, &msd, &ensk, &spread);

        let window_max = |series: ArrayView1<f64>| {
            series
                .slice(s![window.clone()])
                .fold(f64::NEG_INFINITY, |acc, &val| acc.max(val))
        };
        let truth_max = window_max(truth);
        let mean_max = window_max(mean.view());

        let truth_scores = TruthScores {
            n_samples: cmp.sample_count(),
            truth_max,
            mean_max,
            max_diff: mean_max - truth_max,
            nash_sutcliffe: defined(cmp.nash_sutcliffe())?,
            rmsd: defined(cmp.root_mean_square_difference())?,
            mrmsd: defined(cmp.ensemble_root_mean_square_difference())?,
            bias: defined(cmp.bias())?,
        };

        Ok(Self {
            name: record.name.clone(),
            n_members: ensemble.len_of(axis),
            n_steps,
            window: (window.start, window.end),
            profile: Profile {
                mean: mean.to_vec(),
                spread: spread.to_vec(),
                skewness: skewness.iter().map(|&val| finite(val)).collect(),
                kurtosis: kurtosis.iter().map(|&val| finite(val)).collect(),
                rmsd,
                rensk,
                ratio,
            },
            obs: obs_scores,
            truth: truth_scores,
        })
    }

    /// Column names matching [`StudyReport::summary_line`].
    pub fn summary_header() -> String {
        format!(
            "{:<24} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "name", "n_obs", "ns", "rmsd", "mrmsd", "bias", "max_diff", "ensk/ensp"
        )
    }

    /// One-line summary, with `-` in place of undefined values.
    pub fn summary_line(&self) -> String {
        format!(
            "{:<24} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            self.name,
            self.obs.n_obs,
            placeholder(self.truth.nash_sutcliffe),
            placeholder(self.truth.rmsd),
            placeholder(self.truth.mrmsd),
            placeholder(self.truth.bias),
            placeholder(finite(self.truth.max_diff)),
            placeholder(self.obs.ratio_ensk_ensp),
        )
    }

    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, &self).context("failed to serialize report")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let report = decode::from_read(&mut reader).context("failed to deserialize report")?;
        Ok(report)
    }
}

impl ObsScores {
    fn compute(
        obs_steps: &[usize],
        msd: &Array1<f64>,
        ensk: &Array1<f64>,
        ensp: &Array1<f64>,
    ) -> Self {
        let n_obs = obs_steps.len();
        let sum = |series: &Array1<f64>, f: fn(f64) -> f64| -> f64 {
            obs_steps.iter().map(|&t| f(series[t])).sum()
        };
        let mean = |total: f64| (n_obs > 0).then(|| total / n_obs as f64);

        let sum_rmsd = sum(msd, f64::sqrt);
        let sum_rensk = sum(ensk, f64::sqrt);
        let mean_ensk = mean(sum(ensk, |val| val));
        let mean_ensp = mean(sum(ensp, |val| val));

        Self {
            n_obs,
            mean_msd: mean(sum(msd, |val| val)),
            mean_ensk,
            mean_ensp,
            mean_rmsd: mean(sum_rmsd),
            mean_rensk: mean(sum_rensk),
            mean_rensp: mean(sum(ensp, f64::sqrt)),
            ratio_ensk_ensp: mean_ensk
                .zip(mean_ensp)
                .filter(|&(_, ensp)| ensp != 0.0)
                .map(|(ensk, ensp)| ensk / ensp),
            ratio_rensk_rmsd: (sum_rmsd != 0.0).then(|| sum_rensk / sum_rmsd),
        }
    }
}

/// Map degenerate results to `None`, keeping precondition violations as errors.
fn defined(result: Result<f64, StatsError>) -> Result<Option<f64>, StatsError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(err) if err.is_degenerate() => Ok(None),
        Err(err) => Err(err),
    }
}

fn finite(val: f64) -> Option<f64> {
    val.is_finite().then_some(val)
}

fn placeholder(val: Option<f64>) -> String {
    match val {
        Some(val) => format!("{val:.4}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cfg() -> AnalysisConfig {
        AnalysisConfig {
            member_axis: 0,
            window_start: 0,
            window_end: None,
            sentinel: None,
        }
    }

    fn record() -> EnsembleRecord {
        EnsembleRecord {
            name: "example".to_string(),
            members: vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]],
            obs: vec![2.0, -1.0, 4.0],
            truth: vec![2.0, 3.0, 4.0],
        }
    }

    #[test]
    fn test_truth_scores() {
        let report = StudyReport::compute(&record(), &cfg()).unwrap();
        assert_eq!(report.n_members, 2);
        assert_eq!(report.n_steps, 3);
        assert_eq!(report.window, (0, 3));
        assert_eq!(report.truth.n_samples, 3);
        assert_eq!(report.truth.nash_sutcliffe, Some(1.0));
        assert_eq!(report.truth.bias, Some(0.0));
        assert_eq!(report.truth.rmsd, Some(0.0));
        assert_relative_eq!(report.truth.mrmsd.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(report.truth.max_diff, 0.0);
    }

    #[test]
    fn test_profile() {
        let report = StudyReport::compute(&record(), &cfg()).unwrap();
        let profile = &report.profile;
        assert_eq!(profile.mean, vec![2.0, 3.0, 4.0]);
        assert_eq!(profile.spread, vec![1.0, 1.0, 1.0]);
        assert_eq!(profile.rmsd, vec![Some(1.0), None, Some(1.0)]);
        assert_eq!(profile.rensk, vec![Some(0.0), None, Some(0.0)]);
        assert_eq!(profile.ratio, vec![Some(1.0), None, Some(1.0)]);
        assert_relative_eq!(profile.kurtosis[0].unwrap(), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_obs_scores() {
        let report = StudyReport::compute(&record(), &cfg()).unwrap();
        let obs = &report.obs;
        assert_eq!(obs.n_obs, 2);
        assert_eq!(obs.mean_msd, Some(1.0));
        assert_eq!(obs.mean_ensk, Some(0.0));
        assert_eq!(obs.mean_ensp, Some(1.0));
        assert_eq!(obs.ratio_ensk_ensp, Some(0.0));
        assert_eq!(obs.ratio_rensk_rmsd, Some(0.0));
    }

    #[test]
    fn test_undefined_values() {
        let rec = EnsembleRecord {
            name: "flat".to_string(),
            members: vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]],
            obs: vec![-1.0, -1.0, -1.0],
            truth: vec![2.0, 2.0, 2.0],
        };
        let report = StudyReport::compute(&rec, &cfg()).unwrap();
        assert!(report.profile.skewness.iter().all(Option::is_none));
        assert!(report.profile.kurtosis.iter().all(Option::is_none));
        assert_eq!(report.truth.nash_sutcliffe, None);
        assert_eq!(report.truth.rmsd, Some(1.0));
        assert_eq!(report.obs.n_obs, 0);
        assert_eq!(report.obs.mean_msd, None);
        assert_eq!(report.obs.ratio_ensk_ensp, None);
        assert!(report.summary_line().contains(" - "));
    }

    #[test]
    fn test_sentinel_excludes_steps() {
        let rec = EnsembleRecord {
            name: "sentinel".to_string(),
            members: vec![vec![0.0, 2.0, 3.0, 9.0]],
            obs: vec![-1.0; 4],
            truth: vec![1.0, 2.0, 4.0, 0.0],
        };
        let mut cfg = cfg();
        cfg.sentinel = Some(0.0);
        let report = StudyReport::compute(&rec, &cfg).unwrap();
        assert_eq!(report.truth.n_samples, 2);
        assert_relative_eq!(report.truth.bias.unwrap(), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_window_out_of_bounds() {
        let mut cfg = cfg();
        cfg.window_end = Some(10);
        let err = StudyReport::compute(&record(), &cfg).unwrap_err();
        assert!(format!("{err:#}").contains("invalid window"));
    }

    #[test]
    fn test_columns_are_members() {
        let rec = EnsembleRecord {
            members: vec![vec![1.0, 3.0], vec![2.0, 4.0], vec![3.0, 5.0]],
            ..record()
        };
        let mut cfg = cfg();
        cfg.member_axis = 1;
        let report = StudyReport::compute(&rec, &cfg).unwrap();
        assert_eq!(report, StudyReport::compute(&record(), &self::cfg()).unwrap());
    }
}
