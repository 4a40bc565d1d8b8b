use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use tfbs_sampler::annotation::MatchMode;
use tfbs_sampler::config::{EvaluateConfig, ExtractConfig};
use tfbs_sampler::error::SamplerError;
use tfbs_sampler::harness::run_evaluation;
use tfbs_sampler::labeler::NegativePolicy;
use tfbs_sampler::pipeline::extract_samples;
use tfbs_sampler::shape::{Aggregation, ShapeFiles};
use tfbs_sampler::timing::format_elapsed;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error("Missing {0}: pass it on the command line or in --config")]
    MissingInput(&'static str),
}

#[derive(Parser, Debug)]
#[command(
    name = "tfbs-pipeline",
    about = "Extracts PWM-scanned TFBS samples and compares classifiers on their DNA shape",
    long_about = "Scans chromosome active regions with a factor's position weight matrix, labels hits \
                  as positive or negative against annotated binding sites, and writes balanced sample \
                  files. The evaluate step fits a fixed roster of classifiers on DNA shape features \
                  computed for those samples.",
    version,
    after_help = "Example usage:\n    \
                  tfbs-pipeline extract --config extract.json --factor UAK42 --chromosome chr21\n    \
                  tfbs-pipeline evaluate --positive data/positive_UAK42 --negative data/negative_UAK42 --seed 7",
    color = clap::ColorChoice::Always
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write positive and negative sample files for each factor
    Extract(ExtractArgs),
    /// Compare classifiers on DNA shape features of extracted samples
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// JSON extraction config; flags below override its fields
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Transcription factor to sample (repeatable)
    #[arg(long = "factor", value_name = "NAME")]
    factors: Vec<String>,

    /// Chromosome to scan (repeatable)
    #[arg(long = "chromosome", value_name = "CHROM")]
    chromosomes: Vec<String>,

    /// PWM log-odds score a candidate site must exceed
    #[arg(long)]
    threshold: Option<f64>,

    /// Directory holding the annotation, PWM and chromosome files
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Directory receiving the timestamped run folder
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Match chromosome, factor and strand columns exactly instead of by substring
    #[arg(long)]
    exact_match: bool,

    /// Draw negatives at random with this seed instead of taking the first ones found
    #[arg(long, value_name = "SEED")]
    random_negatives: Option<u64>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// JSON evaluation config; flags below override its fields
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prefix of the positive shape tables ({prefix}_MGW.txt, _Roll, _ProT, _HelT)
    #[arg(long, value_name = "PREFIX")]
    positive: Option<String>,

    /// Prefix of the negative shape tables
    #[arg(long, value_name = "PREFIX")]
    negative: Option<String>,

    /// Feature aggregation: scaled, averaged or scaled-averaged
    #[arg(long)]
    aggregation: Option<Aggregation>,

    /// Fraction of samples used for training
    #[arg(long)]
    train_fraction: Option<f64>,

    /// Seed of the train/test split and the randomised models
    #[arg(long)]
    seed: Option<u64>,

    /// CSV file receiving per-model scores
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn extract_config(args: ExtractArgs) -> Result<ExtractConfig, PipelineError> {
    let mut config = match &args.config {
        Some(path) => ExtractConfig::from_json_file(path)?,
        None => ExtractConfig::default(),
    };
    if !args.factors.is_empty() {
        config.factors = args.factors;
    }
    if !args.chromosomes.is_empty() {
        config.chromosomes = args.chromosomes;
    }
    if let Some(threshold) = args.threshold {
        config.pwm_threshold = threshold;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if args.exact_match {
        config.match_mode = MatchMode::Exact;
    }
    if let Some(seed) = args.random_negatives {
        config.negative_policy = NegativePolicy::Random { seed };
    }
    Ok(config)
}

fn evaluate_config(args: EvaluateArgs) -> Result<EvaluateConfig, PipelineError> {
    let mut config = match &args.config {
        Some(path) => EvaluateConfig::from_json_file(path)?,
        None => {
            let positive = args.positive.as_ref().ok_or(PipelineError::MissingInput("--positive"))?;
            let negative = args.negative.as_ref().ok_or(PipelineError::MissingInput("--negative"))?;
            EvaluateConfig::new(ShapeFiles::from_prefix(positive), ShapeFiles::from_prefix(negative))
        }
    };
    if let Some(prefix) = &args.positive {
        config.positive = ShapeFiles::from_prefix(prefix);
    }
    if let Some(prefix) = &args.negative {
        config.negative = ShapeFiles::from_prefix(prefix);
    }
    if let Some(aggregation) = args.aggregation {
        config.aggregation = aggregation;
    }
    if let Some(fraction) = args.train_fraction {
        config.train_fraction = fraction;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.report.is_some() {
        config.report = args.report;
    }
    Ok(config)
}

fn main() -> Result<(), PipelineError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let start_time = std::time::Instant::now();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract(args) => {
            let config = extract_config(args)?;
            let report = extract_samples(&config)?;
            info!("Samples written to {}", report.run_dir.display());
            println!("{}", report.totals_frame()?);
        }
        Command::Evaluate(args) => {
            let config = evaluate_config(args)?;
            let evaluation = run_evaluation(&config)?;
            println!(
                "{}",
                tfbs_sampler::harness::reports_to_frame(&evaluation.reports)?
            );
        }
    }

    info!(
        "Total execution time: {}",
        format_elapsed(start_time.elapsed(), true)
    );
    Ok(())
}
