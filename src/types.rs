use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nucleotide channels in PWM row order
pub const NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Maps a (soft-masked or not) nucleotide byte to its PWM row
pub static NUCLEOTIDE_INDEX: phf::Map<u8, usize> = phf_map! {
    b'A' => 0, b'C' => 1, b'G' => 2, b'T' => 3,
    b'a' => 0, b'c' => 1, b'g' => 2, b't' => 3,
};

/// Genomic interval where scanning is permitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRegion {
    pub start: usize,
    pub end: usize,
}

/// Experimentally annotated binding site on the positive strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSiteLocation {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

/// A scored PWM hit. `position` is the 0-based offset of the hit's first base
/// on the forward strand, relative to whatever sequence was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub position: usize,
    pub score: f64,
    pub strand: Strand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleClass {
    Positive,
    Negative,
}

impl fmt::Display for SampleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleClass::Positive => write!(f, "positive"),
            SampleClass::Negative => write!(f, "negative"),
        }
    }
}

/// A labeled motif-length window written to a sample file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub label: usize,
    pub position: usize,
    pub sequence: String,
    pub class: SampleClass,
}
