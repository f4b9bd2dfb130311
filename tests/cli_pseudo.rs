use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn command_invalid() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gar")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recognized"));

    Ok(())
}

#[test]
fn command_pseudo() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gar")?;
    let output = cmd
        .arg("pseudo")
        .arg("tests/pseudo/records.psl")
        .arg("-g")
        .arg("tests/pseudo/genome.fa")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.lines().next().unwrap().starts_with("#gene"));
    assert!(stdout.contains("NM_1:chr1:501-560\tNM_1\tchr1\t501\t560\t+\t2\t100.00\t96.67\t1\tno"));
    assert!(!stdout.contains("NM_2"));

    Ok(())
}

#[test]
fn command_pseudo_thresholds() -> anyhow::Result<()> {
    // identity 96.67 fails the strict branch, coverage 100 < 1.05 * 96 fails
    // the relaxed one
    let mut cmd = Command::cargo_bin("gar")?;
    let output = cmd
        .arg("pseudo")
        .arg("tests/pseudo/records.psl")
        .arg("-g")
        .arg("tests/pseudo/genome.fa")
        .arg("--min-coverage")
        .arg("96")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 1);

    Ok(())
}

#[test]
fn command_pseudo_config() -> anyhow::Result<()> {
    let tempdir = tempfile::TempDir::new()?;
    let conf = tempdir.path().join("gar.conf");
    let mut file = std::fs::File::create(&conf)?;
    writeln!(file, "# thresholds")?;
    writeln!(file, "MIN_COVERAGE\t96")?;

    let mut cmd = Command::cargo_bin("gar")?;
    let output = cmd
        .arg("pseudo")
        .arg("tests/pseudo/records.psl")
        .arg("-g")
        .arg("tests/pseudo/genome.fa")
        .arg("--config")
        .arg(&conf)
        .output()?;
    assert_eq!(String::from_utf8(output.stdout)?.lines().count(), 1);

    // the command line wins over the file
    let mut cmd = Command::cargo_bin("gar")?;
    let output = cmd
        .arg("pseudo")
        .arg("tests/pseudo/records.psl")
        .arg("-g")
        .arg("tests/pseudo/genome.fa")
        .arg("--config")
        .arg(&conf)
        .arg("--min-coverage")
        .arg("90")
        .output()?;
    assert_eq!(String::from_utf8(output.stdout)?.lines().count(), 2);

    Ok(())
}

#[test]
fn command_pseudo_bad_config() -> anyhow::Result<()> {
    let tempdir = tempfile::TempDir::new()?;
    let conf = tempdir.path().join("gar.conf");
    std::fs::write(&conf, "DISTANCE_TWILIGHT = 3\n")?;

    let mut cmd = Command::cargo_bin("gar")?;
    cmd.arg("pseudo")
        .arg("tests/pseudo/records.psl")
        .arg("-g")
        .arg("tests/pseudo/genome.fa")
        .arg("--config")
        .arg(&conf);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DISTANCE_TWILIGHT"));

    Ok(())
}

#[test]
fn command_pseudo_strand_corrected() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gar")?;
    let output = cmd
        .arg("pseudo")
        .arg("tests/pseudo/frameshift.psl")
        .arg("-g")
        .arg("tests/pseudo/genome.fa")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("NM_3:chr1:851-896\tNM_3\tchr1\t851\t896\t-\t2\t100.00\t97.50\t2\tyes"));

    Ok(())
}

#[test]
fn command_pseudo_missing_genome() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gar")?;
    cmd.arg("pseudo")
        .arg("tests/pseudo/records.psl")
        .arg("-g")
        .arg("tests/pseudo/no_such.fa");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("could not open"));

    Ok(())
}
