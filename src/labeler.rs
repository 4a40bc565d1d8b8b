//! Splits scan candidates into positive and negative samples against the
//! known binding-site starts and writes them as two-line records.

use crate::error::{Result, SamplerError};
use crate::types::{BindingSiteLocation, Candidate, Sample, SampleClass};
use crate::writer::TextWriter;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How negatives are chosen once the positives of a chromosome are known.
/// Either way, at most as many negatives as positives are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NegativePolicy {
    /// The first unannotated candidates in scan order
    #[default]
    FirstN,
    /// A seeded uniform sample of the unannotated candidates, kept in scan order
    Random { seed: u64 },
}

/// Start coordinates of the known sites, for membership tests
pub fn binding_site_starts(sites: &[BindingSiteLocation]) -> HashSet<usize> {
    sites.iter().map(|s| s.start).collect()
}

/// Partitions candidate positions into (positives, negatives).
///
/// Positives are every candidate whose position is a known start, in
/// candidate order. Negatives are drawn from the rest according to `policy`
/// and never outnumber the positives.
pub fn partition_candidates(
    candidates: &[Candidate],
    known_starts: &HashSet<usize>,
    policy: NegativePolicy,
) -> (Vec<usize>, Vec<usize>) {
    let (matched, unmatched): (Vec<usize>, Vec<usize>) = candidates
        .iter()
        .map(|c| c.position)
        .partition(|p| known_starts.contains(p));

    let wanted = matched.len().min(unmatched.len());
    let negatives = match policy {
        NegativePolicy::FirstN => unmatched[..wanted].to_vec(),
        NegativePolicy::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut picked = index::sample(&mut rng, unmatched.len(), wanted).into_vec();
            picked.sort_unstable();
            picked.into_iter().map(|i| unmatched[i]).collect()
        }
    };
    (matched, negatives)
}

/// Per-factor record label counters. Both streams start at 1 and keep
/// counting across chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCounters {
    pub next_positive: usize,
    pub next_negative: usize,
}

impl Default for LabelCounters {
    fn default() -> Self {
        LabelCounters {
            next_positive: 1,
            next_negative: 1,
        }
    }
}

/// Samples written for one chromosome
#[derive(Debug, Clone, Default)]
pub struct LabelSummary {
    pub positives: Vec<Sample>,
    pub negatives: Vec<Sample>,
}

/// Destination streams for one factor's samples
pub struct SampleLabeler<'a> {
    positive: &'a TextWriter,
    negative: &'a TextWriter,
    policy: NegativePolicy,
    counters: LabelCounters,
}

impl<'a> SampleLabeler<'a> {
    pub fn new(positive: &'a TextWriter, negative: &'a TextWriter, policy: NegativePolicy) -> Self {
        SampleLabeler {
            positive,
            negative,
            policy,
            counters: LabelCounters::default(),
        }
    }

    pub fn counters(&self) -> LabelCounters {
        self.counters
    }

    /// Labels the candidates of one chromosome and appends the samples to the output streams.
    ///
    /// # Arguments
    /// * `sequence` - Chromosome sequence the candidates were found on
    /// * `motif_len` - Window length written per sample
    /// * `candidates` - Scan output in scan order
    /// * `known_starts` - Annotated positive-strand binding-site starts
    ///
    /// # Errors
    /// * Returns `SamplerError::DataError` if a candidate window runs past the sequence
    /// * Returns `SamplerError::Io` if a sample file cannot be written
    pub fn label(
        &mut self,
        sequence: &str,
        motif_len: usize,
        candidates: &[Candidate],
        known_starts: &HashSet<usize>,
    ) -> Result<LabelSummary> {
        let (positives, negatives) = partition_candidates(candidates, known_starts, self.policy);

        let mut summary = LabelSummary::default();
        for position in positives {
            let sample = self.emit(sequence, motif_len, position, SampleClass::Positive)?;
            summary.positives.push(sample);
        }
        for position in negatives {
            let sample = self.emit(sequence, motif_len, position, SampleClass::Negative)?;
            summary.negatives.push(sample);
        }
        Ok(summary)
    }

    fn emit(
        &mut self,
        sequence: &str,
        motif_len: usize,
        position: usize,
        class: SampleClass,
    ) -> Result<Sample> {
        let window = sequence.get(position..position + motif_len).ok_or_else(|| {
            SamplerError::DataError(format!(
                "window {}..{} exceeds sequence length {}",
                position,
                position + motif_len,
                sequence.len()
            ))
        })?;
        let sequence = window.to_uppercase();

        let (writer, counter) = match class {
            SampleClass::Positive => (self.positive, &mut self.counters.next_positive),
            SampleClass::Negative => (self.negative, &mut self.counters.next_negative),
        };
        let label = *counter;
        writer.write_record(label, &sequence)?;
        *counter += 1;

        Ok(Sample {
            label,
            position,
            sequence,
            class,
        })
    }
}
