//! Wall-clock helpers for progress logs and run-scoped file names.

use crate::types::SampleClass;
use chrono::{DateTime, Local};
use std::time::Duration;

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Formats an elapsed duration as hours, minutes, seconds and optionally milliseconds.
///
/// Units that are zero are omitted, and a separator is only emitted once a
/// larger unit has been printed. An elapsed time that renders to nothing
/// (sub-second without `show_ms`) is reported as `0 seconds`.
///
/// # Arguments
/// * `elapsed` - Duration to format
/// * `show_ms` - Whether to append the fractional second as milliseconds
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tfbs_sampler::timing::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_secs(3725), false), "1 hour, 2 minutes, 5 seconds");
/// assert_eq!(format_elapsed(Duration::from_millis(61_500), true), "1 minute, 1 second, 500.00 ms");
/// ```
pub fn format_elapsed(elapsed: Duration, show_ms: bool) -> String {
    let total = elapsed.as_secs();
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    let ms = f64::from(elapsed.subsec_nanos()) / 1e6;

    let mut out = String::new();
    if h != 0 {
        out.push_str(&format!("{} hour{}", h, plural(h)));
    }
    if m != 0 {
        if h != 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{} minute{}", m, plural(m)));
    }
    if s != 0 {
        if h != 0 || m != 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{} second{}", s, plural(s)));
    }
    if show_ms {
        if h != 0 || m != 0 || s != 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{:.2} ms", ms));
    }

    if out.is_empty() {
        out.push_str("0 seconds");
    }
    out
}

/// Current local time, used for log banners and output names
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Name of the per-run output folder, e.g. `2024-03-09_1432_FASTA_files`
pub fn run_folder_name(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%Y-%m-%d_%H%M_FASTA_files").to_string()
}

/// Name of a factor's sample file, e.g. `2024-03-09_1432_UAK42_positive.txt`
pub fn sample_file_name(timestamp: &DateTime<Local>, factor: &str, class: SampleClass) -> String {
    format!("{}_{}_{}.txt", timestamp.format("%Y-%m-%d_%H%M"), factor, class)
}
