//! Percolator subprocess configuration and invocation (spec.md §4.6
//! "External invocation").

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{PercolatorError, Result};

/// Score type requested for reintegration (spec.md §4.6 post-processing
/// step 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreType {
    QValue,
    Pep,
    Svm,
}

/// Every configurable Percolator option this crate forwards to the
/// subprocess.
#[derive(Clone, Debug)]
pub struct PercolatorConfig {
    pub percolator_executable: PathBuf,
    pub fdr_threshold: f64,
    pub max_iterations: u32,
    pub cross_validation_bins: u32,
    pub weights_file: Option<PathBuf>,
    pub init_weights_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub description_of_correct_features: bool,
    pub protein_fdr: bool,
    pub num_threads: u32,
    /// A safety floor below which `num_threads` is not lowered unless
    /// `force_num_threads` is set (spec.md §5 "Thread count for external
    /// tool").
    pub force_num_threads: bool,
    pub score_type: ScoreType,
}

const HISTORIC_MIN_THREADS: u32 = 1;

impl PercolatorConfig {
    fn effective_num_threads(&self) -> u32 {
        if !self.force_num_threads && self.num_threads < HISTORIC_MIN_THREADS {
            HISTORIC_MIN_THREADS
        } else {
            self.num_threads
        }
    }

    fn build_args(&self, pin_path: &Path, pout_path: &Path, protein_pout_path: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "-r".to_string(),
            pout_path.to_string_lossy().into_owned(),
            "-v".to_string(),
            "0".to_string(),
            "--testFDR".to_string(),
            self.fdr_threshold.to_string(),
            "--maxiter".to_string(),
            self.max_iterations.to_string(),
            "--num-threads".to_string(),
            self.effective_num_threads().to_string(),
        ];
        if self.cross_validation_bins > 0 {
            args.push("--nested-xval-bins".to_string());
            args.push(self.cross_validation_bins.to_string());
        }
        if let Some(weights) = &self.weights_file {
            args.push("--weights".to_string());
            args.push(weights.to_string_lossy().into_owned());
        }
        if let Some(init) = &self.init_weights_file {
            args.push("--init-weights".to_string());
            args.push(init.to_string_lossy().into_owned());
        }
        if let Some(seed) = self.seed {
            args.push("--seed".to_string());
            args.push(seed.to_string());
        }
        if self.description_of_correct_features {
            args.push("-D".to_string());
            args.push("1".to_string());
        }
        if let Some(protein_pout) = protein_pout_path {
            args.push("-P".to_string());
            args.push(protein_pout.to_string_lossy().into_owned());
        }
        args.push(pin_path.to_string_lossy().into_owned());
        args
    }
}

/// Spawns Percolator against `pin_path`, routes stdout/stderr through the
/// host logger, and returns the PSM-level and (if requested) protein-level
/// pout file paths. Fails on a non-zero exit code.
pub fn invoke_percolator(config: &PercolatorConfig, pin_path: &Path, out_dir: &Path) -> Result<(PathBuf, Option<PathBuf>)> {
    let pout_path = out_dir.join("percolator.pout.tsv");
    let protein_pout_path = config.protein_fdr.then(|| out_dir.join("percolator.proteins.tsv"));

    let args = config.build_args(pin_path, &pout_path, protein_pout_path.as_deref());
    let output = Command::new(&config.percolator_executable)
        .args(&args)
        .output()
        .map_err(|e| PercolatorError::Io(e.to_string()))?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        log::info!("percolator: {line}");
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        log::warn!("percolator: {line}");
    }

    if !output.status.success() {
        return Err(PercolatorError::ExternalProgramError {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok((pout_path, protein_pout_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> PercolatorConfig {
        PercolatorConfig {
            percolator_executable: PathBuf::from("percolator"),
            fdr_threshold: 0.01,
            max_iterations: 10,
            cross_validation_bins: 3,
            weights_file: None,
            init_weights_file: None,
            seed: Some(1),
            description_of_correct_features: false,
            protein_fdr: false,
            num_threads: 0,
            force_num_threads: false,
            score_type: ScoreType::QValue,
        }
    }

    #[test]
    fn thread_count_is_floored_unless_forced() {
        assert_eq!(base_config().effective_num_threads(), HISTORIC_MIN_THREADS);
        let forced = PercolatorConfig { force_num_threads: true, ..base_config() };
        assert_eq!(forced.effective_num_threads(), 0);
    }

    #[test]
    fn args_include_the_requested_fdr_and_seed() {
        let config = base_config();
        let args = config.build_args(Path::new("in.pin"), Path::new("out.pout"), None);
        assert!(args.iter().any(|a| a == "0.01"));
        assert!(args.iter().any(|a| a == "1"));
    }
}
