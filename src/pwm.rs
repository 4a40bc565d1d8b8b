use crate::annotation::load_raw;
use crate::error::{Result, SamplerError};
use crate::types::NUCLEOTIDES;
use crate::writer::TextWriter;
use log::{debug, info};
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// Position weight matrix for one factor.
/// Rows are the A, C, G, T channels and columns are motif positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Pwm {
    name: String,
    matrix: Array2<f64>,
}

impl Pwm {
    /// Builds a PWM, checking that the matrix has four channel rows, at least
    /// one column, and non-negative finite weights with a positive column sum.
    pub fn new(name: impl Into<String>, matrix: Array2<f64>) -> Result<Self> {
        let name = name.into();
        if matrix.nrows() != NUCLEOTIDES.len() {
            return Err(SamplerError::invalid_pwm(format!(
                "{}: expected {} channel rows, found {}",
                name,
                NUCLEOTIDES.len(),
                matrix.nrows()
            )));
        }
        if matrix.ncols() == 0 {
            return Err(SamplerError::invalid_pwm(format!("{}: empty motif", name)));
        }
        if matrix.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SamplerError::invalid_pwm(format!(
                "{}: weights must be finite and non-negative",
                name
            )));
        }
        if let Some(col) = matrix.columns().into_iter().position(|c| c.sum() <= 0.0) {
            return Err(SamplerError::invalid_pwm(format!(
                "{}: column {} has no weight",
                name,
                col + 1
            )));
        }
        Ok(Pwm { name, matrix })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Motif length
    pub fn len(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.ncols() == 0
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Parses one row of a factorbook-style PWM table:
    /// `NAME<ws>COLUMNS<ws>a1,a2,...,<ws>c1,...,<ws>g1,...,<ws>t1,...,`
    ///
    /// # Errors
    /// * Returns `SamplerError::InvalidPwm` if the row does not hold four
    ///   comma-separated channel groups of the declared length
    pub fn from_table_row(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let name = fields
            .first()
            .ok_or_else(|| SamplerError::invalid_pwm("empty PWM row"))?;
        let columns: usize = fields
            .get(1)
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| SamplerError::invalid_pwm(format!("{}: missing column count", name)))?;

        let rows = fields[2..]
            .iter()
            .map(|group| {
                group
                    .split(',')
                    .filter(|v| !v.is_empty())
                    .map(|v| {
                        v.parse::<f64>().map_err(|e| {
                            SamplerError::invalid_pwm(format!("{}: invalid weight {:?}: {}", name, v, e))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        if rows.len() != NUCLEOTIDES.len() {
            return Err(SamplerError::invalid_pwm(format!(
                "{}: expected {} channel groups, found {}",
                name,
                NUCLEOTIDES.len(),
                rows.len()
            )));
        }
        if let Some(row) = rows.iter().position(|r| r.len() != columns) {
            return Err(SamplerError::invalid_pwm(format!(
                "{}: channel {} has {} weights, expected {}",
                name,
                NUCLEOTIDES[row],
                rows[row].len(),
                columns
            )));
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let matrix = Array2::from_shape_vec((NUCLEOTIDES.len(), columns), flat)
            .map_err(|e| SamplerError::invalid_pwm(e.to_string()))?;
        Pwm::new(*name, matrix)
    }

    /// Renders the matrix in JASPAR text form: a `>NAME` header and one
    /// `X [ w1 w2 ... ]` line per channel.
    pub fn to_jaspar_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(">{}", self.name)];
        for (nt, row) in NUCLEOTIDES.iter().zip(self.matrix.rows()) {
            let weights: Vec<String> = row.iter().map(|w| format!("{:?}", w)).collect();
            lines.push(format!("{} [ {} ]", nt, weights.join(" ")));
        }
        lines
    }

    /// Parses JASPAR text produced by [`Pwm::to_jaspar_lines`] (brackets optional,
    /// channel lines in any order).
    ///
    /// # Errors
    /// * Returns `SamplerError::InvalidPwm` if the header, a channel, or a weight is missing or invalid
    pub fn from_jaspar_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut lines = lines
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty());

        let header = lines
            .next()
            .ok_or_else(|| SamplerError::invalid_pwm("empty JASPAR record"))?;
        let name = header
            .strip_prefix('>')
            .and_then(|h| h.split_whitespace().next())
            .ok_or_else(|| SamplerError::invalid_pwm(format!("invalid JASPAR header {:?}", header)))?
            .to_string();

        let mut rows: [Option<Vec<f64>>; 4] = Default::default();
        for line in lines {
            let mut tokens = line.split_whitespace();
            let channel = tokens
                .next()
                .and_then(|t| t.chars().next())
                .map(|c| c.to_ascii_uppercase())
                .and_then(|c| NUCLEOTIDES.iter().position(|&n| n == c))
                .ok_or_else(|| SamplerError::invalid_pwm(format!("{}: invalid channel line {:?}", name, line)))?;
            let weights = tokens
                .filter(|t| *t != "[" && *t != "]")
                .map(|t| {
                    t.parse::<f64>().map_err(|e| {
                        SamplerError::invalid_pwm(format!("{}: invalid weight {:?}: {}", name, t, e))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows[channel] = Some(weights);
        }

        let mut flat = Vec::new();
        let mut columns = None;
        for (nt, row) in NUCLEOTIDES.iter().zip(rows) {
            let row = row.ok_or_else(|| SamplerError::invalid_pwm(format!("{}: missing channel {}", name, nt)))?;
            match columns {
                None => columns = Some(row.len()),
                Some(c) if c != row.len() => {
                    return Err(SamplerError::invalid_pwm(format!(
                        "{}: channel {} has {} weights, expected {}",
                        name,
                        nt,
                        row.len(),
                        c
                    )))
                }
                Some(_) => {}
            }
            flat.extend(row);
        }

        let matrix = Array2::from_shape_vec((NUCLEOTIDES.len(), columns.unwrap_or(0)), flat)
            .map_err(|e| SamplerError::invalid_pwm(e.to_string()))?;
        Pwm::new(name, matrix)
    }
}

/// Looks up the PWM of `factor` in a factorbook-style PWM table.
///
/// The last row whose first field equals `factor` exactly is used.
///
/// # Errors
/// * Returns `SamplerError::FactorNotFound` if no row names the factor
/// * Returns `SamplerError::InvalidPwm` if the matching row is malformed
/// * Returns `SamplerError::Io` for file reading issues
pub fn lookup_pwm(table: impl AsRef<Path>, factor: &str) -> Result<Pwm> {
    let table = table.as_ref();
    load_raw(table)?
        .iter()
        .rev()
        .find(|line| line.split_whitespace().next() == Some(factor))
        .map(|line| Pwm::from_table_row(line))
        .unwrap_or_else(|| Err(SamplerError::factor_not_found(factor, table)))
}

/// Location of the JASPAR file generated for `factor`
pub fn jaspar_path(jaspar_dir: impl AsRef<Path>, factor: &str) -> PathBuf {
    jaspar_dir.as_ref().join(format!("{}_jaspar.pfm", factor))
}

/// Writes the JASPAR file for `factor` from the PWM table, unless it already exists.
///
/// # Arguments
/// * `table` - Path to the factorbook-style PWM table
/// * `factor` - Factor to export
/// * `jaspar_dir` - Directory receiving `{factor}_jaspar.pfm` (created if missing)
///
/// # Returns
/// * `Result<PathBuf>` - Path of the JASPAR file, whether freshly written or pre-existing
///
/// # Errors
/// * Returns `SamplerError::FactorNotFound` if the table has no row for `factor`
/// * Returns `SamplerError::Io` for file reading or writing issues
pub fn write_pwm_jaspar(
    table: impl AsRef<Path>,
    factor: &str,
    jaspar_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let path = jaspar_path(&jaspar_dir, factor);
    if path.is_file() {
        debug!("{} already exists, skipping", path.display());
        return Ok(path);
    }

    let pwm = lookup_pwm(table, factor)?;
    std::fs::create_dir_all(jaspar_dir.as_ref())?;
    let writer = TextWriter::new(&path)?;
    for line in pwm.to_jaspar_lines() {
        writer.write_line(&line, false)?;
    }
    info!("Wrote {} ({} positions) to {}", factor, pwm.len(), path.display());
    Ok(path)
}

/// Reads a JASPAR file written by [`write_pwm_jaspar`]
pub fn read_jaspar(path: impl AsRef<Path>) -> Result<Pwm> {
    Pwm::from_jaspar_lines(&load_raw(path)?)
}
