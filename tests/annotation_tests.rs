use std::path::Path;
use tfbs_sampler::annotation::{
    parse_active_regions, parse_binding_sites, read_active_regions, read_binding_sites, MatchMode,
};
use tfbs_sampler::error::SamplerError;
use tfbs_sampler::types::{ActiveRegion, BindingSiteLocation};

const BED: &str = "tests/data/pipeline/active_regions.bed";
const SITES: &str = "tests/data/pipeline/binding_sites.txt";

#[test]
fn test_read_active_regions() {
    let regions = read_active_regions(BED, "chrT", MatchMode::Substring).unwrap();
    assert_eq!(regions, vec![ActiveRegion { start: 0, end: 36 }]);

    let regions = read_active_regions(BED, "chrX", MatchMode::Exact).unwrap();
    assert!(regions.is_empty());

    let result = read_active_regions("tests/data/pipeline/missing.bed", "chrT", MatchMode::Substring);
    assert!(matches!(result, Err(SamplerError::Io(_))));
}

#[test]
fn test_substring_matching_keeps_longer_names() {
    let lines = ["chr2\t10\t20", "chr21\t30\t40", "chr3\t50\t60"];
    let path = Path::new("inline.bed");

    let loose = parse_active_regions(&lines, "chr2", MatchMode::Substring, path).unwrap();
    assert_eq!(
        loose,
        vec![ActiveRegion { start: 10, end: 20 }, ActiveRegion { start: 30, end: 40 }]
    );

    let exact = parse_active_regions(&lines, "chr2", MatchMode::Exact, path).unwrap();
    assert_eq!(exact, vec![ActiveRegion { start: 10, end: 20 }]);
}

#[test]
fn test_malformed_region_names_the_line() {
    let lines = ["chr1\t0\t10", "chr1\tabc\t20"];
    let err = parse_active_regions(&lines, "chr1", MatchMode::Substring, Path::new("regions.bed"))
        .unwrap_err();
    match err {
        SamplerError::InvalidFileFormat(msg) => {
            assert!(msg.contains("regions.bed"));
            assert!(msg.contains('2'));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let lines = ["chr1\t30\t10"];
    let result = parse_active_regions(&lines, "chr1", MatchMode::Substring, Path::new("regions.bed"));
    assert!(matches!(result, Err(SamplerError::InvalidFileFormat(_))));
}

#[test]
fn test_read_binding_sites() {
    let sites = read_binding_sites(SITES, "ACGT4", "chrT", MatchMode::Substring).unwrap();
    assert_eq!(
        sites,
        vec![
            BindingSiteLocation { start: 4, end: 8 },
            BindingSiteLocation { start: 20, end: 24 },
        ]
    );

    let sites = read_binding_sites(SITES, "ACGT4", "chrU", MatchMode::Exact).unwrap();
    assert_eq!(sites, vec![BindingSiteLocation { start: 0, end: 4 }]);

    let sites = read_binding_sites(SITES, "GATA2", "chrT", MatchMode::Exact).unwrap();
    assert_eq!(sites, vec![BindingSiteLocation { start: 28, end: 32 }]);
}

#[test]
fn test_binding_sites_exact_mode() {
    let path = Path::new("inline_pos.txt");
    // strand column is '-', but the name contains '+'
    let lines = [
        "1\tchr1\t100\t110\tMAX\t900\t+",
        "1\tchr1\t200\t210\tMAX+\t900\t-",
        "1\tchr11\t300\t310\tMAX\t900\t+",
        "1\tchr1\t400\t410\tMAXX\t900\t+",
    ];

    let loose = parse_binding_sites(&lines, "MAX", "chr1", MatchMode::Substring, path).unwrap();
    assert_eq!(loose.len(), 4);

    let exact = parse_binding_sites(&lines, "MAX", "chr1", MatchMode::Exact, path).unwrap();
    assert_eq!(exact, vec![BindingSiteLocation { start: 100, end: 110 }]);

    let short = ["1\tchr1\t100"];
    let result = parse_binding_sites(&short, "MAX", "chr1", MatchMode::Exact, path);
    assert!(matches!(result, Err(SamplerError::InvalidFileFormat(_))));
}
