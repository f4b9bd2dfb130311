use crate::libs::locus::Transcript;
use crate::libs::record::Strand;
use crate::libs::seq::SequenceSlicer;
use bio::alphabets::dna::revcomp;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceClass {
    /// GT..AG, AT..AC, GC..AG
    Correct,
    /// The reverse complements of the correct pairs: CT..AC, GT..AT, CT..GC
    Wrong,
    Other,
}

/// ```
/// # use gar::libs::pseudogene::splice::{classify_splice_pair, SpliceClass};
/// assert_eq!(classify_splice_pair("GT", "AG"), SpliceClass::Correct);
/// assert_eq!(classify_splice_pair("ct", "ac"), SpliceClass::Wrong);
/// assert_eq!(classify_splice_pair("GG", "AG"), SpliceClass::Other);
/// ```
pub fn classify_splice_pair(donor: &str, acceptor: &str) -> SpliceClass {
    let donor = donor.to_ascii_uppercase();
    let acceptor = acceptor.to_ascii_uppercase();
    match (donor.as_str(), acceptor.as_str()) {
        ("GT", "AG") | ("AT", "AC") | ("GC", "AG") => SpliceClass::Correct,
        ("CT", "AC") | ("GT", "AT") | ("CT", "GC") => SpliceClass::Wrong,
        _ => SpliceClass::Other,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpliceTally {
    pub correct: usize,
    pub wrong: usize,
    pub other: usize,
    /// Introns whose boundary sequence could not be read
    pub missing: usize,
}

/// Donor and acceptor dinucleotides of every intron, in transcript order
/// and read on the transcript strand
pub fn intron_dinucleotides(
    tx: &Transcript,
    slicer: &dyn SequenceSlicer,
) -> anyhow::Result<Vec<Option<(String, String)>>> {
    let region = tx.region();
    let read = |start: u64, end: u64| -> anyhow::Result<Option<String>> {
        if start == 0 {
            return Ok(None);
        }
        let seq = slicer.slice(region, start, end)?;
        Ok(seq.map(|s| match tx.strand() {
            Strand::Forward => s,
            Strand::Reverse => String::from_utf8_lossy(&revcomp(s.as_bytes())).to_string(),
        }))
    };

    let mut sites = Vec::new();
    for pair in tx.exons().windows(2) {
        let (up, down) = (&pair[0], &pair[1]);
        let (donor, acceptor) = match tx.strand() {
            Strand::Forward => (
                read(up.end + 1, up.end + 2)?,
                read(down.start.saturating_sub(2), down.start - 1)?,
            ),
            Strand::Reverse => (
                read(up.start.saturating_sub(2), up.start - 1)?,
                read(down.end + 1, down.end + 2)?,
            ),
        };
        sites.push(donor.zip(acceptor));
    }

    Ok(sites)
}

pub fn tally_introns(tx: &Transcript, slicer: &dyn SequenceSlicer) -> anyhow::Result<SpliceTally> {
    let mut tally = SpliceTally::default();
    for (i, site) in intron_dinucleotides(tx, slicer)?.into_iter().enumerate() {
        match site {
            Some((donor, acceptor)) => match classify_splice_pair(&donor, &acceptor) {
                SpliceClass::Correct => tally.correct += 1,
                SpliceClass::Wrong => tally.wrong += 1,
                SpliceClass::Other => tally.other += 1,
            },
            None => {
                warn!(
                    "No splice site sequence for intron {} of {} on {}",
                    i + 1,
                    tx.id(),
                    tx.region()
                );
                tally.missing += 1;
            }
        }
    }
    Ok(tally)
}

/// Flips a multi-exon transcript to the other strand when its introns read
/// as wrong splice sites more often than as correct ones. Returns whether it
/// flipped.
pub fn correct_strand(tx: &mut Transcript, slicer: &dyn SequenceSlicer) -> anyhow::Result<bool> {
    if tx.exons().len() < 2 {
        return Ok(false);
    }

    let tally = tally_introns(tx, slicer)?;
    debug!(
        "{}: {} correct, {} wrong, {} other, {} missing splice sites",
        tx.id(),
        tally.correct,
        tally.wrong,
        tally.other,
        tally.missing
    );

    if tally.wrong > tally.correct {
        tx.flip_strand();
        debug!("{}: strand flipped to {}", tx.id(), tx.strand());
        Ok(true)
    } else {
        Ok(false)
    }
}
