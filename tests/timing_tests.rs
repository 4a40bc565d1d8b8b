use chrono::{Local, TimeZone};
use std::fs;
use std::time::Duration;
use tfbs_sampler::timing::{format_elapsed, run_folder_name, sample_file_name};
use tfbs_sampler::types::SampleClass;
use tfbs_sampler::writer::TextWriter;

#[test]
fn test_format_elapsed() {
    assert_eq!(format_elapsed(Duration::from_secs(1), false), "1 second");
    assert_eq!(format_elapsed(Duration::from_secs(3600), false), "1 hour");
    assert_eq!(format_elapsed(Duration::from_secs(3601), false), "1 hour, 1 second");
    assert_eq!(format_elapsed(Duration::from_secs(7320), false), "2 hours, 2 minutes");
    assert_eq!(format_elapsed(Duration::from_millis(59_250), true), "59 seconds, 250.00 ms");
    assert_eq!(format_elapsed(Duration::from_millis(500), true), "500.00 ms");
}

#[test]
fn test_format_elapsed_zero() {
    assert_eq!(format_elapsed(Duration::ZERO, false), "0 seconds");
    assert_eq!(format_elapsed(Duration::from_millis(20), false), "0 seconds");
    assert_eq!(format_elapsed(Duration::ZERO, true), "0.00 ms");
}

#[test]
fn test_output_names() {
    let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 32, 5).unwrap();
    assert_eq!(run_folder_name(&ts), "2024-03-09_1432_FASTA_files");
    assert_eq!(
        sample_file_name(&ts, "UAK42", SampleClass::Positive),
        "2024-03-09_1432_UAK42_positive.txt"
    );
    assert_eq!(
        sample_file_name(&ts, "UAK42", SampleClass::Negative),
        "2024-03-09_1432_UAK42_negative.txt"
    );
}

#[test]
fn test_text_writer() {
    let path = std::env::temp_dir().join("tfbs_sampler_writer.txt");
    fs::write(&path, "stale contents\n").unwrap();

    let writer = TextWriter::new(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");

    writer.write_line("first", true).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");
    writer.write_record(7, "ACGT").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "first\n>7\nACGT\n");
    assert_eq!(writer.path(), path.as_path());

    // clean up
    fs::remove_file(&path).unwrap();
}
