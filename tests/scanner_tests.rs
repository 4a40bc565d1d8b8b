use ndarray::{array, Array2};
use tfbs_sampler::pwm::{lookup_pwm, Pwm};
use tfbs_sampler::scanner::{best_candidate, scan_active_regions, Pssm};
use tfbs_sampler::types::{ActiveRegion, Candidate, Strand};

fn acgt_pssm() -> Pssm {
    Pssm::from_pwm(&lookup_pwm("tests/data/pipeline/pwm_table.txt", "ACGT4").unwrap())
}

fn positions(candidates: &[Candidate]) -> Vec<usize> {
    candidates.iter().map(|c| c.position).collect()
}

#[test]
fn test_pssm_from_pwm() {
    let pwm = Pwm::new("P", array![[2.0, 1.0], [1.0, 1.0], [1.0, 1.0], [0.0, 1.0]]).unwrap();
    let pssm = Pssm::from_pwm(&pwm);
    let scores = pssm.scores();

    assert!((scores[[0, 0]] - 1.0).abs() < 1e-12);
    assert!(scores[[1, 0]].abs() < 1e-12);
    assert_eq!(scores[[3, 0]], f64::NEG_INFINITY);
    assert!(scores.column(1).iter().all(|s| s.abs() < 1e-12));
    assert!((pssm.max_score() - 1.0).abs() < 1e-12);
}

#[test]
fn test_calculate_scores_every_window() {
    let pssm = acgt_pssm();
    let scores = pssm.calculate(b"ACGTN");
    assert_eq!(scores.len(), 2);
    assert!((scores[0] - 4.0 * (0.97f64 / 0.25).log2()).abs() < 1e-9);
    assert!(scores[1].is_nan());

    assert!(pssm.calculate(b"ACG").is_empty());
}

#[test]
fn test_search_reports_both_strands() {
    let pwm = Pwm::new(
        "AAC",
        array![[0.97, 0.97, 0.01], [0.01, 0.01, 0.97], [0.01, 0.01, 0.01], [0.01, 0.01, 0.01]],
    )
    .unwrap();
    let pssm = Pssm::from_pwm(&pwm);

    // AAC forward at 0, GTT (reverse complement of AAC) at 4
    let hits = pssm.search(b"AACCGTT", 3.0);
    assert_eq!(hits.len(), 2);
    assert_eq!((hits[0].position, hits[0].strand), (0, Strand::Forward));
    assert_eq!((hits[1].position, hits[1].strand), (4, Strand::Reverse));
}

#[test]
fn test_scan_active_regions() {
    let pssm = acgt_pssm();
    let regions = [ActiveRegion { start: 0, end: 12 }];

    let hits = scan_active_regions(&pssm, b"ACGTACGTACGT", 0.0, &regions);
    assert_eq!(positions(&hits), vec![0, 4]);
    assert!(hits.iter().all(|h| h.strand == Strand::Forward));
}

#[test]
fn test_threshold_is_exclusive() {
    // uniform columns score every window exactly 0.0
    let pwm = Pwm::new("FLAT", Array2::from_elem((4, 4), 0.25)).unwrap();
    let pssm = Pssm::from_pwm(&pwm);
    let regions = [ActiveRegion { start: 0, end: 12 }];

    assert!(pssm.search(b"ACGTACGT", 0.0).is_empty());
    assert!(scan_active_regions(&pssm, b"ACGTACGTACGT", 0.0, &regions).is_empty());

    let hits = scan_active_regions(&pssm, b"ACGTACGTACGT", -0.5, &regions);
    assert_eq!(positions(&hits), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_scan_uses_absolute_positions() {
    let pssm = acgt_pssm();
    let sequence = b"TTTTACGTTTTTACGTTTTTACGTTTTTACGTTTTT";
    let regions = [
        ActiveRegion { start: 10, end: 30 },
        ActiveRegion { start: 0, end: 9 },
    ];

    let hits = scan_active_regions(&pssm, sequence, 3.0, &regions);
    // region order first; the second region stops at 9 - 4
    assert_eq!(positions(&hits), vec![12, 20]);

    let wide = [ActiveRegion { start: 0, end: 1000 }];
    let hits = scan_active_regions(&pssm, sequence, 3.0, &wide);
    assert_eq!(positions(&hits), vec![4, 12, 20, 28]);

    let tiny = [ActiveRegion { start: 5, end: 7 }];
    assert!(scan_active_regions(&pssm, sequence, 3.0, &tiny).is_empty());
}

#[test]
fn test_best_candidate() {
    let hit = |position, score| Candidate {
        position,
        score,
        strand: Strand::Forward,
    };
    let candidates = [hit(3, 1.0), hit(8, 5.0), hit(9, 5.0), hit(1, 2.0)];
    assert_eq!(best_candidate(&candidates).map(|c| c.position), Some(8));
    assert!(best_candidate(&[]).is_none());
}
