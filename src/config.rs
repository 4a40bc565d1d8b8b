//! Run configuration for the extraction pipeline and the classifier harness.
//!
//! Both structures load from JSON; every field has a default so a file only
//! needs to name what it changes.

use crate::annotation::MatchMode;
use crate::error::{Result, SamplerError};
use crate::labeler::NegativePolicy;
use crate::shape::{Aggregation, ShapeFiles};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn default_factors() -> Vec<String> {
    vec![String::from("UAK42")]
}

fn default_chromosomes() -> Vec<String> {
    vec![String::from("chr21")]
}

fn default_pwm_threshold() -> f64 {
    3.0
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_active_regions() -> String {
    String::from("wgEncodeRegTfbsClusteredV3.GM12878.merged.bed")
}

fn default_binding_sites() -> String {
    String::from("factorbookMotifPos.txt")
}

fn default_pwm_table() -> String {
    String::from("factorbookMotifPwm.txt")
}

fn default_train_fraction() -> f64 {
    0.8
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Settings for `extract`: which factors to sample, where, and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_factors")]
    pub factors: Vec<String>,
    #[serde(default = "default_chromosomes")]
    pub chromosomes: Vec<String>,
    /// Log-odds score a PWM hit must exceed
    #[serde(default = "default_pwm_threshold")]
    pub pwm_threshold: f64,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory holding `{chromosome}.fa`; `<data_dir>/hg19` when unset
    #[serde(default)]
    pub chromosome_dir: Option<PathBuf>,
    /// Directory receiving generated JASPAR files; `<data_dir>/jaspars` when unset
    #[serde(default)]
    pub jaspar_dir: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File names below are resolved against `data_dir`
    #[serde(default = "default_active_regions")]
    pub active_regions_file: String,
    #[serde(default = "default_binding_sites")]
    pub binding_sites_file: String,
    #[serde(default = "default_pwm_table")]
    pub pwm_table_file: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub negative_policy: NegativePolicy,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            factors: default_factors(),
            chromosomes: default_chromosomes(),
            pwm_threshold: default_pwm_threshold(),
            data_dir: default_data_dir(),
            chromosome_dir: None,
            jaspar_dir: None,
            output_dir: default_output_dir(),
            active_regions_file: default_active_regions(),
            binding_sites_file: default_binding_sites(),
            pwm_table_file: default_pwm_table(),
            match_mode: MatchMode::default(),
            negative_policy: NegativePolicy::default(),
        }
    }
}

impl ExtractConfig {
    /// Reads an extraction config from a JSON file
    ///
    /// # Errors
    /// * Returns `SamplerError::Io` if the file cannot be opened
    /// * Returns `SamplerError::Json` if the file is not a valid config
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Rejects configs that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        if self.factors.is_empty() {
            return Err(SamplerError::invalid_parameter("factors", "[]", "at least one factor is required"));
        }
        if self.chromosomes.is_empty() {
            return Err(SamplerError::invalid_parameter(
                "chromosomes",
                "[]",
                "at least one chromosome is required",
            ));
        }
        if !self.pwm_threshold.is_finite() {
            return Err(SamplerError::invalid_parameter(
                "pwm_threshold",
                self.pwm_threshold,
                "must be finite",
            ));
        }
        Ok(())
    }

    pub fn chromosome_dir(&self) -> PathBuf {
        self.chromosome_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("hg19"))
    }

    pub fn jaspar_dir(&self) -> PathBuf {
        self.jaspar_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("jaspars"))
    }

    pub fn chromosome_file(&self, chromosome: &str) -> PathBuf {
        self.chromosome_dir().join(format!("{}.fa", chromosome))
    }

    pub fn active_regions_path(&self) -> PathBuf {
        self.data_dir.join(&self.active_regions_file)
    }

    pub fn binding_sites_path(&self) -> PathBuf {
        self.data_dir.join(&self.binding_sites_file)
    }

    pub fn pwm_table_path(&self) -> PathBuf {
        self.data_dir.join(&self.pwm_table_file)
    }
}

/// Settings for `evaluate`: the shape tables of each class and the split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub positive: ShapeFiles,
    pub negative: ShapeFiles,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default = "default_train_fraction")]
    pub train_fraction: f64,
    /// Seed of the split and of every randomised model; drawn at random when unset
    #[serde(default)]
    pub seed: Option<u64>,
    /// CSV file receiving the per-model scores
    #[serde(default)]
    pub report: Option<PathBuf>,
}

impl EvaluateConfig {
    pub fn new(positive: ShapeFiles, negative: ShapeFiles) -> Self {
        EvaluateConfig {
            positive,
            negative,
            aggregation: Aggregation::default(),
            train_fraction: default_train_fraction(),
            seed: None,
            report: None,
        }
    }

    /// Reads an evaluation config from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(SamplerError::invalid_parameter(
                "train_fraction",
                self.train_fraction,
                "must lie strictly between 0 and 1",
            ));
        }
        Ok(())
    }
}
