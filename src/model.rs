//! Ensemble records stored in a study directory.

use anyhow::{Context, Result, bail};
use ndarray::{Array2, Axis};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// One ensemble run together with its observations and truth.
///
/// `members` is stored row by row; whether a row is a member or a time step
/// is given by the member axis of the analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRecord {
    /// Name of the run.
    pub name: String,

    /// Ensemble values.
    pub members: Vec<Vec<f64>>,

    /// Observations (negative values flag missing observations).
    pub obs: Vec<f64>,

    /// Truth trajectory.
    pub truth: Vec<f64>,
}

impl EnsembleRecord {
    /// Build a record from an ensemble array.
    pub fn new(name: String, ensemble: &Array2<f64>, obs: Vec<f64>, truth: Vec<f64>) -> Self {
        let members = ensemble.outer_iter().map(|row| row.to_vec()).collect();
        Self {
            name,
            members,
            obs,
            truth,
        }
    }

    /// Ensemble values as a 2-D array.
    pub fn ensemble(&self) -> Result<Array2<f64>> {
        let n_rows = self.members.len();
        let n_cols = self.members.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            bail!("ensemble must not be empty");
        }
        if self.members.iter().any(|row| row.len() != n_cols) {
            bail!("ensemble rows must all have {n_cols} values");
        }
        let flat = self.members.iter().flatten().copied().collect();
        Array2::from_shape_vec((n_rows, n_cols), flat).context("failed to shape ensemble")
    }

    /// Check that observations and truth are aligned with the ensemble's time axis.
    pub fn validate(&self, member_axis: Axis) -> Result<()> {
        let ensemble = self.ensemble().context("invalid ensemble")?;
        if member_axis.index() > 1 {
            bail!("member axis must be 0 or 1, but is {}", member_axis.index());
        }
        let n_steps = ensemble.len_of(Axis(1 - member_axis.index()));

        let n_obs = self.obs.len();
        if n_obs != n_steps {
            bail!("observations must have {n_steps} values, but have {n_obs}");
        }
        let n_truth = self.truth.len();
        if n_truth != n_steps {
            bail!("truth must have {n_steps} values, but has {n_truth}");
        }
        Ok(())
    }

    /// Load and validate a record from a MessagePack file.
    pub fn load<P: AsRef<Path>>(file: P, member_axis: Axis) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        let record: Self = decode::from_read(&mut reader).context("failed to deserialize record")?;

        record
            .validate(member_axis)
            .with_context(|| format!("invalid record {:?}", record.name))?;

        Ok(record)
    }

    /// Save the record to a MessagePack file.
    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        encode::write(&mut writer, &self).context("failed to serialize record")?;

        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }
}
