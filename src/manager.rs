use crate::config::Config;
use crate::engine::Engine;
use crate::model::EnsembleRecord;
use crate::report::StudyReport;
use anyhow::{Context, Result};
use glob::glob;
use ndarray::Axis;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Study directory holding `config.toml`, ensemble records and their reports.
pub struct Manager {
    study_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(study_dir: P) -> Result<Self> {
        let study_dir = study_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(study_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { study_dir, cfg })
    }

    pub fn synthesize(&self) -> Result<()> {
        let synthesis = self
            .cfg
            .synthesis
            .clone()
            .context("config has no synthesis section")?;

        let record_idx = self
            .indexed_files(RECORD_PREFIX)
            .context("failed to list record files")?
            .last()
            .map_or(0, |(idx, _)| idx + 1);

        let mut engine = Engine::new(synthesis).context("failed to construct engine")?;
        let record = engine
            .generate(format!("synthetic-{record_idx:04}"), self.member_axis())
            .context("failed to generate record")?;

        let record_file = self.record_file(record_idx);
        record
            .save(&record_file)
            .with_context(|| format!("failed to save {record_file:?}"))?;
        log::info!("created {record_file:?}");

        Ok(())
    }

    pub fn analyze(&self) -> Result<()> {
        let records = self
            .indexed_files(RECORD_PREFIX)
            .context("failed to list record files")?;
        for (record_idx, record_file) in records {
            let record = EnsembleRecord::load(&record_file, self.member_axis())
                .with_context(|| format!("failed to load {record_file:?}"))?;

            let report = StudyReport::compute(&record, &self.cfg.analysis)
                .with_context(|| format!("failed to analyze {:?}", record.name))?;
            log::info!(
                "{}: ns = {:?}, rmsd = {:?}, bias = {:?}",
                report.name,
                report.truth.nash_sutcliffe,
                report.truth.rmsd,
                report.truth.bias
            );

            let results_file = self.results_file(record_idx);
            report
                .save(&results_file)
                .with_context(|| format!("failed to save {results_file:?}"))?;
            log::info!("created {results_file:?}");
        }

        Ok(())
    }

    pub fn summarize(&self) -> Result<()> {
        let results = self
            .indexed_files(RESULTS_PREFIX)
            .context("failed to list results files")?;

        println!("{}", StudyReport::summary_header());
        for (_, results_file) in results {
            let report = StudyReport::load(&results_file)
                .with_context(|| format!("failed to load {results_file:?}"))?;
            println!("{}", report.summary_line());
        }

        Ok(())
    }

    pub fn clean(&self) -> Result<()> {
        for results_file in self.glob_files(&format!("{RESULTS_PREFIX}-*.{EXTENSION}"))? {
            fs::remove_file(&results_file)
                .with_context(|| format!("failed to remove {results_file:?}"))?;
            log::info!("removed {results_file:?}");
        }

        Ok(())
    }

    fn member_axis(&self) -> Axis {
        Axis(self.cfg.analysis.member_axis)
    }

    fn glob_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.study_dir.join(pattern);
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        Ok(files)
    }

    /// Files named `{prefix}-NNNN.msgpack`, sorted by index.
    ///
    /// Indices may have gaps when files were removed by hand.
    fn indexed_files(&self, prefix: &str) -> Result<Vec<(usize, PathBuf)>> {
        let mut files: Vec<_> = self
            .glob_files(&format!("{prefix}-*.{EXTENSION}"))?
            .into_iter()
            .filter_map(|file| file_index(&file, prefix).map(|idx| (idx, file)))
            .collect();
        files.sort_by_key(|(idx, _)| *idx);
        Ok(files)
    }

    fn record_file(&self, record_idx: usize) -> PathBuf {
        self.study_dir
            .join(format!("{RECORD_PREFIX}-{record_idx:04}.{EXTENSION}"))
    }

    fn results_file(&self, record_idx: usize) -> PathBuf {
        self.study_dir
            .join(format!("{RESULTS_PREFIX}-{record_idx:04}.{EXTENSION}"))
    }
}

const RECORD_PREFIX: &str = "ensemble";
const RESULTS_PREFIX: &str = "results";
const EXTENSION: &str = "msgpack";

/// Index encoded in a `{prefix}-NNNN.msgpack` file name.
fn file_index(file: &Path, prefix: &str) -> Option<usize> {
    file.file_stem()?
        .to_str()?
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .parse()
        .ok()
}
