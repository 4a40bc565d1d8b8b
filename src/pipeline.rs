//! Sample extraction across the configured factors and chromosomes.

use crate::annotation::{read_active_regions, read_binding_sites};
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::fasta::read_chromosome;
use crate::labeler::{binding_site_starts, SampleLabeler};
use crate::pwm::{read_jaspar, write_pwm_jaspar};
use crate::scanner::{best_candidate, scan_active_regions, Pssm};
use crate::timing::{format_elapsed, now, run_folder_name, sample_file_name};
use crate::types::SampleClass;
use crate::writer::TextWriter;
use chrono::{DateTime, Local};
use log::{info, warn};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Counts gathered for one factor on one chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeSummary {
    pub chromosome: String,
    pub sequence_len: usize,
    pub active_regions: usize,
    pub candidates: usize,
    pub known_sites: usize,
    pub positives: usize,
    pub negatives: usize,
}

/// Output of one factor's extraction
#[derive(Debug, Clone)]
pub struct FactorRun {
    pub factor: String,
    pub positive_path: PathBuf,
    pub negative_path: PathBuf,
    pub chromosomes: Vec<ChromosomeSummary>,
}

impl FactorRun {
    pub fn total_positives(&self) -> usize {
        self.chromosomes.iter().map(|c| c.positives).sum()
    }

    pub fn total_negatives(&self) -> usize {
        self.chromosomes.iter().map(|c| c.negatives).sum()
    }
}

/// Everything produced by [`extract_samples`]
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_dir: PathBuf,
    pub factors: Vec<FactorRun>,
}

impl RunReport {
    /// One row per factor and chromosome
    pub fn summary_frame(&self) -> Result<DataFrame> {
        let rows: Vec<(&str, &ChromosomeSummary)> = self
            .factors
            .iter()
            .flat_map(|f| f.chromosomes.iter().map(move |c| (f.factor.as_str(), c)))
            .collect();
        let count = |get: fn(&ChromosomeSummary) -> usize| -> Vec<u64> {
            rows.iter().map(|(_, c)| get(c) as u64).collect()
        };

        let df = DataFrame::new(vec![
            Column::new("factor".into(), rows.iter().map(|(f, _)| f.to_string()).collect::<Vec<_>>()),
            Column::new(
                "chromosome".into(),
                rows.iter().map(|(_, c)| c.chromosome.clone()).collect::<Vec<_>>(),
            ),
            Column::new("sequence_len".into(), count(|c| c.sequence_len)),
            Column::new("active_regions".into(), count(|c| c.active_regions)),
            Column::new("candidates".into(), count(|c| c.candidates)),
            Column::new("known_sites".into(), count(|c| c.known_sites)),
            Column::new("positives".into(), count(|c| c.positives)),
            Column::new("negatives".into(), count(|c| c.negatives)),
        ])?;
        Ok(df)
    }

    /// Positive and negative sample totals per factor, in run order
    pub fn totals_frame(&self) -> Result<DataFrame> {
        let totals = self
            .summary_frame()?
            .lazy()
            .group_by_stable([col("factor")])
            .agg([
                col("candidates").sum(),
                col("positives").sum(),
                col("negatives").sum(),
            ])
            .collect()?;
        Ok(totals)
    }
}

/// Writes the JASPAR file of every configured factor that does not have one yet
pub fn prepare_jaspars(config: &ExtractConfig) -> Result<Vec<PathBuf>> {
    config
        .factors
        .iter()
        .map(|factor| write_pwm_jaspar(config.pwm_table_path(), factor, config.jaspar_dir()))
        .collect()
}

/// Runs the full extraction: JASPAR export, then for every factor a scan of
/// every chromosome, writing positive and negative sample files into a fresh
/// timestamped folder under `output_dir`.
///
/// # Errors
/// * Returns `SamplerError::InvalidParameter` if the config does not validate
/// * Propagates reader, PWM and I/O errors; the run stops at the first one
pub fn extract_samples(config: &ExtractConfig) -> Result<RunReport> {
    config.validate()?;
    prepare_jaspars(config)?;

    let started = now();
    info!(
        "Started at {} on {}",
        started.format("%H:%M"),
        started.format("%Y-%m-%d")
    );

    let run_dir = config.output_dir.join(run_folder_name(&started));
    fs::create_dir_all(&run_dir)?;

    let total = Instant::now();
    let mut factors = Vec::with_capacity(config.factors.len());
    for factor in &config.factors {
        factors.push(extract_factor(config, factor, &run_dir, &now())?);
    }

    let report = RunReport { run_dir, factors };
    let mut summary = report.summary_frame()?;
    let mut file = File::create(report.run_dir.join("run_summary.csv"))?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut summary)?;

    info!("Total time elapsed: {}", format_elapsed(total.elapsed(), false));
    Ok(report)
}

/// Extracts the samples of one factor over every configured chromosome.
///
/// Labels of both sample files run on across chromosomes.
pub fn extract_factor(
    config: &ExtractConfig,
    factor: &str,
    run_dir: &Path,
    timestamp: &DateTime<Local>,
) -> Result<FactorRun> {
    let started = Instant::now();
    let positive_path = run_dir.join(sample_file_name(timestamp, factor, SampleClass::Positive));
    let negative_path = run_dir.join(sample_file_name(timestamp, factor, SampleClass::Negative));
    let positive = TextWriter::new(&positive_path)?;
    let negative = TextWriter::new(&negative_path)?;

    info!("-------------------------------------------------");
    info!("TF: {}", factor);

    let pwm = read_jaspar(crate::pwm::jaspar_path(config.jaspar_dir(), factor))?;
    let pssm = Pssm::from_pwm(&pwm);
    let mut labeler = SampleLabeler::new(&positive, &negative, config.negative_policy);

    let mut chromosomes = Vec::with_capacity(config.chromosomes.len());
    for chromosome in &config.chromosomes {
        chromosomes.push(process_chromosome(config, factor, chromosome, &pssm, &mut labeler)?);
    }

    let run = FactorRun {
        factor: factor.to_string(),
        positive_path,
        negative_path,
        chromosomes,
    };
    info!("Total time for {}: {}", factor, format_elapsed(started.elapsed(), false));
    info!("Number of {} positive samples: {}", factor, run.total_positives());
    info!("Number of {} negative samples: {}", factor, run.total_negatives());
    Ok(run)
}

fn process_chromosome(
    config: &ExtractConfig,
    factor: &str,
    chromosome: &str,
    pssm: &Pssm,
    labeler: &mut SampleLabeler<'_>,
) -> Result<ChromosomeSummary> {
    let started = Instant::now();
    let sequence = read_chromosome(config.chromosome_file(chromosome))?;
    let regions = read_active_regions(config.active_regions_path(), chromosome, config.match_mode)?;
    info!("{}: {} nucleotides", chromosome, sequence.len());
    if regions.is_empty() {
        warn!("No active regions for {} in {}", chromosome, config.active_regions_path().display());
    }

    info!("Searching for potential {} binding sites on {} active regions...", factor, chromosome);
    let scan_started = Instant::now();
    let candidates = scan_active_regions(pssm, sequence.as_bytes(), config.pwm_threshold, &regions);
    info!("Done in {}", format_elapsed(scan_started.elapsed(), true));
    info!("{} potential TFBS's found on {} active regions", candidates.len(), chromosome);
    if let Some(best) = best_candidate(&candidates) {
        let window = sequence
            .get(best.position..best.position + pssm.len())
            .unwrap_or_default();
        info!(
            "Highest score: {:.3} at position {} giving sequence {}",
            best.score, best.position, window
        );
    }

    let sites = read_binding_sites(config.binding_sites_path(), factor, chromosome, config.match_mode)?;
    let known = binding_site_starts(&sites);
    info!("{} bound {} TFBS's on {} found in annotation", sites.len(), factor, chromosome);

    let summary = labeler.label(&sequence, pssm.len(), &candidates, &known)?;
    info!(
        "Extracted {} positive and {} negative samples",
        summary.positives.len(),
        summary.negatives.len()
    );
    info!("Total time for {}: {}", chromosome, format_elapsed(started.elapsed(), false));

    Ok(ChromosomeSummary {
        chromosome: chromosome.to_string(),
        sequence_len: sequence.len(),
        active_regions: regions.len(),
        candidates: candidates.len(),
        known_sites: sites.len(),
        positives: summary.positives.len(),
        negatives: summary.negatives.len(),
    })
}
