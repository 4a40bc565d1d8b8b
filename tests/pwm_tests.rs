use ndarray::array;
use std::fs;
use tfbs_sampler::error::SamplerError;
use tfbs_sampler::pwm::{jaspar_path, lookup_pwm, read_jaspar, write_pwm_jaspar, Pwm};

const TABLE: &str = "tests/data/pipeline/pwm_table.txt";

#[test]
fn test_from_table_row() {
    let pwm = Pwm::from_table_row("MYC\t2\t0.5,0.1,\t0.2,0.3,\t0.2,0.3,\t0.1,0.3,").unwrap();
    assert_eq!(pwm.name(), "MYC");
    assert_eq!(pwm.len(), 2);
    assert_eq!(
        pwm.matrix(),
        &array![[0.5, 0.1], [0.2, 0.3], [0.2, 0.3], [0.1, 0.3]]
    );

    // only three channel groups
    let result = Pwm::from_table_row("BROKEN\t2\t0.5,0.1,\t0.2,0.3,\t0.2,0.3,");
    assert!(matches!(result, Err(SamplerError::InvalidPwm(_))));

    // a group shorter than the declared column count
    let result = Pwm::from_table_row("BROKEN\t3\t0.5,0.1,\t0.2,0.3,\t0.2,0.3,\t0.1,0.3,");
    assert!(matches!(result, Err(SamplerError::InvalidPwm(_))));
}

#[test]
fn test_lookup_pwm() {
    let pwm = lookup_pwm(TABLE, "GATA2").unwrap();
    assert_eq!(pwm.len(), 5);
    assert_eq!(pwm.matrix()[[2, 2]], 1.0);

    let result = lookup_pwm(TABLE, "NOPE");
    match result {
        Err(SamplerError::FactorNotFound { factor, path }) => {
            assert_eq!(factor, "NOPE");
            assert!(path.ends_with("pwm_table.txt"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // a prefix of a table name is not a match
    assert!(matches!(
        lookup_pwm(TABLE, "GATA"),
        Err(SamplerError::FactorNotFound { .. })
    ));

    assert!(matches!(lookup_pwm(TABLE, "BROKEN"), Err(SamplerError::InvalidPwm(_))));
}

#[test]
fn test_lookup_pwm_uses_last_duplicate() {
    let path = std::env::temp_dir().join("tfbs_sampler_duplicate_pwm.txt");
    fs::write(
        &path,
        "MAX\t1\t1.0,\t0.0,\t0.0,\t0.0,\nCTCF\t1\t0.0,\t1.0,\t0.0,\t0.0,\nMAX\t2\t0.0,0.0,\t0.0,0.0,\t1.0,0.0,\t0.0,1.0,\n",
    )
    .unwrap();

    let pwm = lookup_pwm(&path, "MAX").unwrap();
    assert_eq!(pwm.len(), 2);
    assert_eq!(pwm.matrix(), &array![[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);

    // clean up
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_write_pwm_jaspar() {
    let dir = std::env::temp_dir().join("tfbs_sampler_jaspar_test");
    let _ = fs::remove_dir_all(&dir);

    let path = write_pwm_jaspar(TABLE, "ACGT4", &dir).unwrap();
    assert_eq!(path, jaspar_path(&dir, "ACGT4"));

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], ">ACGT4");
    assert_eq!(lines[1], "A [ 0.97 0.01 0.01 0.01 ]");
    assert_eq!(lines[4], "T [ 0.01 0.01 0.01 0.97 ]");

    let pwm = read_jaspar(&path).unwrap();
    assert_eq!(pwm, lookup_pwm(TABLE, "ACGT4").unwrap());

    // an existing file is left untouched
    fs::write(&path, ">ACGT4\nA [ 1 ]\nC [ 0 ]\nG [ 0 ]\nT [ 0 ]\n").unwrap();
    write_pwm_jaspar(TABLE, "ACGT4", &dir).unwrap();
    let pwm = read_jaspar(&path).unwrap();
    assert_eq!(pwm.len(), 1);

    let result = write_pwm_jaspar(TABLE, "NOPE", &dir);
    assert!(matches!(result, Err(SamplerError::FactorNotFound { .. })));
    assert!(!jaspar_path(&dir, "NOPE").exists());

    // clean up
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_from_jaspar_lines() {
    let lines = [">M1 extra", "T 0 1", "G [ 0 0 ]", "C [ 0 0 ]", "A [ 1 0 ]"];
    let pwm = Pwm::from_jaspar_lines(&lines).unwrap();
    assert_eq!(pwm.name(), "M1");
    assert_eq!(pwm.matrix(), &array![[1.0, 0.0], [0.0, 0.0], [0.0, 0.0], [0.0, 1.0]]);

    let missing = [">M1", "A [ 1 0 ]", "C [ 0 0 ]", "G [ 0 1 ]"];
    assert!(matches!(Pwm::from_jaspar_lines(&missing), Err(SamplerError::InvalidPwm(_))));
}

#[test]
fn test_pwm_rejects_empty_columns() {
    let matrix = array![[0.0, 1.0], [0.0, 0.0], [0.0, 0.0], [0.0, 0.0]];
    assert!(matches!(Pwm::new("Z", matrix), Err(SamplerError::InvalidPwm(_))));

    let matrix = array![[1.0], [0.0], [0.0]];
    assert!(matches!(Pwm::new("Z", matrix), Err(SamplerError::InvalidPwm(_))));
}
