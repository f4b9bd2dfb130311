use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn est_cmd() -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("gar")?;
    cmd.arg("est")
        .arg("tests/est/loci.psl")
        .arg("tests/est/est.psl")
        .arg("tests/est/est.fa")
        .arg("-g")
        .arg("tests/est/genome.fa");
    Ok(cmd)
}

#[test]
fn command_est() -> anyhow::Result<()> {
    let output = est_cmd()?.output()?;
    let stdout = String::from_utf8(output.stdout)?;

    let expected = "\
#locus\tevidence\tmatch\tassigned_to
geneA\test1\tsingle\tgeneA
geneA\test3\tsingle\tgeneA
geneA\test2\tincorrect\tgeneB
geneB\test2\tsingle\tgeneB
geneB\test1\tincorrect\tgeneA
";
    assert_eq!(stdout, expected);

    Ok(())
}

#[test]
fn command_est_nucleotide() -> anyhow::Result<()> {
    let output = est_cmd()?.arg("--class").arg("nucleotide").output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("geneA\test1\tsingle\tgeneA"));
    assert!(stdout.contains("geneB\test2\tsingle\tgeneB"));

    // over the bases each EST covers: 0/50 against 3/50 and 3/40 against 0/40
    let output = est_cmd()?
        .arg("--class")
        .arg("nucleotide")
        .arg("--twilight")
        .arg("0.1")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("geneA\test1\tmultiple\tgeneA,geneB"));
    assert!(stdout.contains("geneB\test1\tmultiple\tgeneA,geneB"));
    assert!(stdout.contains("geneB\test2\tmultiple\tgeneA,geneB"));
    assert!(!stdout.contains("incorrect"));

    Ok(())
}

#[test]
fn command_est_cutoff() -> anyhow::Result<()> {
    // est4 covers 40% of its sequence and counts once the cutoff drops
    let output = est_cmd()?.arg("--cutoff").arg("30").output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("\test4\t"));

    let output = est_cmd()?.output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(!stdout.contains("est4"));

    Ok(())
}

#[test]
fn command_est_bad_class() -> anyhow::Result<()> {
    let mut cmd = est_cmd()?;
    cmd.arg("--class").arg("codon");
    cmd.assert().failure().stderr(predicate::str::contains("invalid value"));

    Ok(())
}
