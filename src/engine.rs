use crate::config::SynthesisConfig;
use crate::mask::MISSING_OBS;
use crate::model::EnsembleRecord;
use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{LogNormal, Normal};

/// Synthetic study engine.
///
/// Generates a seasonal truth trajectory, a perturbed open-loop ensemble
/// around it and sparse noisy observations of it.
pub struct Engine {
    cfg: SynthesisConfig,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine`, seeded from the configuration or the OS.
    pub fn new(cfg: SynthesisConfig) -> Result<Self> {
        let rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?,
        };
        Ok(Self { cfg, rng })
    }

    /// Truth trajectory: a bell-shaped seasonal curve.
    pub fn truth(&self) -> Array1<f64> {
        let peak_step = self.cfg.peak_step as f64;
        Array1::from_shape_fn(self.cfg.n_steps, |t| {
            let x = (t as f64 - peak_step) / self.cfg.width;
            self.cfg.peak * (-x * x).exp()
        })
    }

    /// Generate a record, laying the ensemble out with members along `member_axis`.
    pub fn generate(&mut self, name: String, member_axis: Axis) -> Result<EnsembleRecord> {
        let truth = self.truth();

        let mut ensemble = self
            .perturb_members(&truth)
            .context("failed to perturb members")?;
        if member_axis.index() == 1 {
            ensemble = ensemble.reversed_axes().as_standard_layout().into_owned();
        }

        let obs = self.observe(&truth).context("failed to observe truth")?;

        log::debug!(
            "generated {} members x {} steps",
            self.cfg.n_members,
            self.cfg.n_steps
        );

        Ok(EnsembleRecord::new(name, &ensemble, obs, truth.to_vec()))
    }

    fn perturb_members(&mut self, truth: &Array1<f64>) -> Result<Array2<f64>> {
        // A systematic factor per member plus independent noise per step.
        let factor_dist = LogNormal::new(0.0, self.cfg.model_error)?;
        let noise_dist = Normal::new(0.0, self.cfg.model_error)?;

        let mut ensemble = Array2::zeros((self.cfg.n_members, self.cfg.n_steps));
        for mut member in ensemble.outer_iter_mut() {
            let factor = factor_dist.sample(&mut self.rng);
            for (val, &truth_val) in member.iter_mut().zip(truth.iter()) {
                let noise = noise_dist.sample(&mut self.rng);
                *val = (truth_val * factor * (1.0 + noise)).max(0.0);
            }
        }
        Ok(ensemble)
    }

    fn observe(&mut self, truth: &Array1<f64>) -> Result<Vec<f64>> {
        let err_dist = Normal::new(0.0, self.cfg.obs_error)?;

        let mut obs = Vec::with_capacity(truth.len());
        for (t, &truth_val) in truth.iter().enumerate() {
            if t % self.cfg.obs_interval != 0 {
                obs.push(MISSING_OBS);
                continue;
            }
            let err = err_dist.sample(&mut self.rng);
            let err = if self.cfg.relative_obs_error {
                err * truth_val
            } else {
                err
            };
            obs.push((truth_val + err).max(0.0));
        }
        Ok(obs)
    }
}
