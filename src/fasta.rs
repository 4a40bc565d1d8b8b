use crate::error::{Result, SamplerError};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads sequences from a FASTA format file and converts them into a Polars DataFrame.
///
/// # Arguments
/// * `filename` - Path to the FASTA file to read
///
/// # Returns
/// * `Result<DataFrame>` - A DataFrame with two columns:
///   - "label": The sequence identifiers (without '>' prefix)
///   - "sequence": The corresponding DNA sequences in uppercase
///
/// # Errors
/// * Returns `SamplerError::InvalidFileFormat` if no sequences are found
/// * Returns `SamplerError::Polars` if DataFrame creation fails
/// * Returns `SamplerError::Io` for file reading issues
pub fn read_fasta(filename: impl AsRef<Path>) -> Result<DataFrame> {
    let mut sequences: Vec<(String, String)> = Vec::new();
    let file = File::open(filename.as_ref())?;
    let reader = BufReader::new(file);

    let mut current_header: Option<String> = None;
    let mut current_sequence = String::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if let Some(header) = line.strip_prefix('>') {
            if let Some(previous) = current_header.take() {
                sequences.push((previous, current_sequence.to_uppercase()));
                current_sequence.clear();
            }
            current_header = Some(header.to_string());
        } else if !line.is_empty() {
            current_sequence.push_str(line);
        }
    }

    if let Some(header) = current_header {
        sequences.push((header, current_sequence.to_uppercase()));
    }

    if sequences.is_empty() {
        return Err(SamplerError::InvalidFileFormat(format!(
            "No sequences found in {}",
            filename.as_ref().display()
        )));
    }

    let (labels, sequences): (Vec<String>, Vec<String>) = sequences.into_iter().unzip();
    let df = DataFrame::new(vec![
        Column::new("label".into(), labels),
        Column::new("sequence".into(), sequences),
    ])?;

    Ok(df)
}

/// Loads the first record of a chromosome FASTA file as an uppercase sequence.
///
/// # Errors
/// * Returns `SamplerError::EmptySequence` if the file has no record or the first record is empty
/// * Returns `SamplerError::Io` for file reading issues
pub fn read_chromosome(filename: impl AsRef<Path>) -> Result<String> {
    let path = filename.as_ref();
    let df = read_fasta(path).map_err(|e| match e {
        SamplerError::InvalidFileFormat(_) => SamplerError::EmptySequence(path.display().to_string()),
        other => other,
    })?;

    let sequence = df
        .column("sequence")?
        .str()?
        .get(0)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SamplerError::EmptySequence(path.display().to_string()))?
        .to_string();

    Ok(sequence)
}
