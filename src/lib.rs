//! Extract PWM-scanned transcription factor binding site samples from genomic DNA
//! and compare classifiers on DNA shape features

pub mod annotation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fasta;
pub mod harness;
pub mod labeler;
pub mod models;
pub mod pipeline;
pub mod pwm;
pub mod scanner;
pub mod shape;
pub mod timing;
pub mod types;
pub mod writer;
