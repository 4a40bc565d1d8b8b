//! Log-odds PWM scoring and the active-region scan.

use crate::pwm::Pwm;
use crate::types::{ActiveRegion, Candidate, Strand, NUCLEOTIDES, NUCLEOTIDE_INDEX};
use ndarray::Array2;

const BACKGROUND: f64 = 0.25;

/// Log-odds scoring matrix derived from a [`Pwm`].
///
/// Each column of the PWM is normalised to frequencies and scored as
/// `log2(p / 0.25)` against a uniform background. A zero frequency scores
/// `-inf`, so any window using that base can never pass a finite threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Pssm {
    scores: Array2<f64>,
}

impl Pssm {
    pub fn from_pwm(pwm: &Pwm) -> Self {
        let mut scores = pwm.matrix().clone();
        for mut column in scores.columns_mut() {
            let total = column.sum();
            column.mapv_inplace(|w| {
                let p = w / total;
                if p > 0.0 {
                    (p / BACKGROUND).log2()
                } else {
                    f64::NEG_INFINITY
                }
            });
        }
        Pssm { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.ncols() == 0
    }

    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Matrix scoring the reverse complement of a forward window
    pub fn reverse_complement(&self) -> Self {
        let len = self.len();
        let channels = NUCLEOTIDES.len();
        let scores =
            Array2::from_shape_fn((channels, len), |(c, j)| self.scores[[channels - 1 - c, len - 1 - j]]);
        Pssm { scores }
    }

    /// Highest attainable window score
    pub fn max_score(&self) -> f64 {
        self.scores
            .columns()
            .into_iter()
            .map(|c| c.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
            .sum()
    }

    /// Score of every window of `sequence`, indexed by start offset.
    /// Windows containing a symbol other than A, C, G or T score NaN.
    pub fn calculate(&self, sequence: &[u8]) -> Vec<f64> {
        let len = self.len();
        if len == 0 || sequence.len() < len {
            return Vec::new();
        }
        (0..=sequence.len() - len)
            .map(|start| {
                sequence[start..start + len]
                    .iter()
                    .enumerate()
                    .map(|(j, base)| match NUCLEOTIDE_INDEX.get(base) {
                        Some(&channel) => self.scores[[channel, j]],
                        None => f64::NAN,
                    })
                    .sum()
            })
            .collect()
    }

    /// Finds every window scoring above `threshold` on either strand.
    ///
    /// Hits are ordered by offset, forward before reverse at equal offsets.
    /// Positions are always forward-strand offsets of the window's first base.
    pub fn search(&self, sequence: &[u8], threshold: f64) -> Vec<Candidate> {
        let forward = self.calculate(sequence);
        let reverse = self.reverse_complement().calculate(sequence);

        let mut hits = Vec::new();
        for (position, (&f, &r)) in forward.iter().zip(reverse.iter()).enumerate() {
            if f > threshold {
                hits.push(Candidate {
                    position,
                    score: f,
                    strand: Strand::Forward,
                });
            }
            if r > threshold {
                hits.push(Candidate {
                    position,
                    score: r,
                    strand: Strand::Reverse,
                });
            }
        }
        hits
    }
}

/// Scans each active region of `sequence` for forward-strand hits.
///
/// A region `[start, end)` is searched over `[start, end - L)` where `L` is
/// the motif length, clamped to the sequence. Reverse-strand hits are
/// dropped. Returned positions are absolute chromosome coordinates, and
/// candidates appear in region order, then offset order within each region.
///
/// # Arguments
/// * `pssm` - Scoring matrix of the factor
/// * `sequence` - Full chromosome sequence
/// * `threshold` - Log-odds score a hit must exceed
/// * `regions` - Active regions, in the order they should be reported
pub fn scan_active_regions(
    pssm: &Pssm,
    sequence: &[u8],
    threshold: f64,
    regions: &[ActiveRegion],
) -> Vec<Candidate> {
    let motif_len = pssm.len();
    let mut candidates = Vec::new();

    for region in regions {
        let stop = region.end.saturating_sub(motif_len).min(sequence.len());
        if stop <= region.start {
            continue;
        }
        candidates.extend(
            pssm.search(&sequence[region.start..stop], threshold)
                .into_iter()
                .filter(|hit| hit.strand == Strand::Forward)
                .map(|hit| Candidate {
                    position: region.start + hit.position,
                    ..hit
                }),
        );
    }
    candidates
}

/// Highest-scoring candidate; the first one wins ties
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best: Option<&Candidate>, c| match best {
        Some(b) if b.score >= c.score => Some(b),
        _ => Some(c),
    })
}
