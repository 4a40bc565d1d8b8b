//! Readers for the flat annotation files that drive a scan: merged active
//! regions (BED-like) and known binding-site positions (factorbook MotifPos
//! layout: bin, chrom, start, end, name, score, strand).

use crate::error::{Result, SamplerError};
use crate::types::{ActiveRegion, BindingSiteLocation};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// How annotation lines are matched against chromosome/factor/strand names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Keep any line containing the names anywhere. `chr2` also matches `chr21`.
    #[default]
    Substring,
    /// Compare the chrom, name and strand columns exactly
    Exact,
}

/// Reads a text file into its lines with line terminators removed
///
/// # Errors
/// * Returns `SamplerError::Io` if the file cannot be opened or read
pub fn load_raw(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    reader
        .lines()
        .map(|line| {
            line.map(|l| l.trim_end_matches('\r').to_string())
                .map_err(SamplerError::from)
        })
        .collect()
}

fn field<T: FromStr>(fields: &[&str], idx: usize, path: &Path, line_no: usize) -> Result<T> {
    let raw = fields.get(idx).ok_or_else(|| {
        SamplerError::malformed_line(
            path,
            line_no,
            format!("expected at least {} fields, found {}", idx + 1, fields.len()),
        )
    })?;
    raw.parse::<T>().map_err(|_| {
        SamplerError::malformed_line(path, line_no, format!("cannot parse field {}: {:?}", idx + 1, raw))
    })
}

fn check_interval(start: usize, end: usize, path: &Path, line_no: usize) -> Result<()> {
    if end < start {
        return Err(SamplerError::malformed_line(
            path,
            line_no,
            format!("interval end {} precedes start {}", end, start),
        ));
    }
    Ok(())
}

/// Extracts the active regions of `chromosome` from BED-like lines.
///
/// `path` is only used to label errors.
pub fn parse_active_regions<S: AsRef<str>>(
    lines: &[S],
    chromosome: &str,
    mode: MatchMode,
    path: &Path,
) -> Result<Vec<ActiveRegion>> {
    let mut regions = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let fields: Vec<&str> = line.split_whitespace().collect();
        let keep = match mode {
            MatchMode::Substring => line.contains(chromosome),
            MatchMode::Exact => fields.first() == Some(&chromosome),
        };
        if !keep {
            continue;
        }
        let start: usize = field(&fields, 1, path, idx + 1)?;
        let end: usize = field(&fields, 2, path, idx + 1)?;
        check_interval(start, end, path, idx + 1)?;
        regions.push(ActiveRegion { start, end });
    }
    Ok(regions)
}

/// Reads the active regions for `chromosome` from a merged BED-like file.
///
/// # Arguments
/// * `path` - Path to the region file (chrom, start, end, ...)
/// * `chromosome` - Chromosome name, e.g. `chr21`
/// * `mode` - Line matching policy
///
/// # Returns
/// * `Result<Vec<ActiveRegion>>` - Regions in file order
///
/// # Errors
/// * Returns `SamplerError::Io` for file reading issues
/// * Returns `SamplerError::InvalidFileFormat` if a matching line lacks integer start/end fields
pub fn read_active_regions(
    path: impl AsRef<Path>,
    chromosome: &str,
    mode: MatchMode,
) -> Result<Vec<ActiveRegion>> {
    let path = path.as_ref();
    let lines = load_raw(path)?;
    parse_active_regions(&lines, chromosome, mode, path)
}

/// Extracts positive-strand binding sites of `factor` on `chromosome`.
///
/// `path` is only used to label errors.
pub fn parse_binding_sites<S: AsRef<str>>(
    lines: &[S],
    factor: &str,
    chromosome: &str,
    mode: MatchMode,
    path: &Path,
) -> Result<Vec<BindingSiteLocation>> {
    let mut sites = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let fields: Vec<&str> = line.split_whitespace().collect();
        let keep = match mode {
            MatchMode::Substring => {
                line.contains(factor) && line.contains(chromosome) && line.contains('+')
            }
            MatchMode::Exact => {
                if line.trim().is_empty() {
                    continue;
                }
                if fields.len() < 7 {
                    return Err(SamplerError::malformed_line(
                        path,
                        idx + 1,
                        format!("expected 7 fields, found {}", fields.len()),
                    ));
                }
                fields[1] == chromosome && fields[4] == factor && fields[6] == "+"
            }
        };
        if !keep {
            continue;
        }
        let start: usize = field(&fields, 2, path, idx + 1)?;
        let end: usize = field(&fields, 3, path, idx + 1)?;
        check_interval(start, end, path, idx + 1)?;
        sites.push(BindingSiteLocation { start, end });
    }
    Ok(sites)
}

/// Reads the annotated positive-strand binding sites of `factor` on `chromosome`.
///
/// # Arguments
/// * `path` - Path to the MotifPos-style annotation file
/// * `factor` - Transcription factor name
/// * `chromosome` - Chromosome name
/// * `mode` - Line matching policy
///
/// # Errors
/// * Returns `SamplerError::Io` for file reading issues
/// * Returns `SamplerError::InvalidFileFormat` for matching lines without integer start/end fields
pub fn read_binding_sites(
    path: impl AsRef<Path>,
    factor: &str,
    chromosome: &str,
    mode: MatchMode,
) -> Result<Vec<BindingSiteLocation>> {
    let path = path.as_ref();
    let lines = load_raw(path)?;
    parse_binding_sites(&lines, factor, chromosome, mode, path)
}
