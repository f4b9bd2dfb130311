//! Gene models and the EST evidence overlapping them

use crate::libs::error::GarError;
use crate::libs::record::{AlignedBlock, Strand};
use crate::libs::seq::SequenceSlicer;
use bio::alphabets::dna::revcomp;
use log::warn;

/// An exon on the genome (1-based, inclusive), with the alignment block it
/// was derived from when there is one
#[derive(Debug, Clone, PartialEq)]
pub struct Exon {
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub supporting: Option<AlignedBlock>,
}

impl Exon {
    pub fn new(start: u64, end: u64, strand: Strand) -> Self {
        Self {
            start,
            end,
            strand,
            supporting: None,
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos <= self.end
    }

    fn flip_strand(&mut self) {
        self.strand = self.strand.flip();
        if let Some(block) = self.supporting.as_mut() {
            block.strand = block.strand.flip();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    id: String,
    region: String,
    strand: Strand,
    // transcript order: ascending on the forward strand, descending on the reverse
    exons: Vec<Exon>,
    translatable: bool,
}

impl Transcript {
    pub fn new(
        id: &str,
        region: &str,
        strand: Strand,
        exons: Vec<Exon>,
        translatable: bool,
    ) -> Result<Self, GarError> {
        let invalid = |reason: &str| GarError::InvalidGeneModel {
            id: id.to_string(),
            reason: reason.to_string(),
        };
        if exons.is_empty() {
            return Err(invalid("transcript without exons"));
        }
        if exons.iter().any(|e| e.start == 0 || e.start > e.end) {
            return Err(invalid("exon start must be positive and not after its end"));
        }
        if exons.iter().any(|e| e.strand != strand) {
            return Err(invalid("exon strand differs from transcript strand"));
        }

        let mut transcript = Self {
            id: id.to_string(),
            region: region.to_string(),
            strand,
            exons,
            translatable,
        };
        transcript.sort_exons();
        Ok(transcript)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn is_translatable(&self) -> bool {
        self.translatable
    }

    pub fn start(&self) -> u64 {
        self.exons.iter().map(|e| e.start).min().unwrap_or(0)
    }

    pub fn end(&self) -> u64 {
        self.exons.iter().map(|e| e.end).max().unwrap_or(0)
    }

    /// Spliced length
    pub fn length(&self) -> u64 {
        self.exons.iter().map(|e| e.len()).sum()
    }

    fn sort_exons(&mut self) {
        match self.strand {
            Strand::Forward => self.exons.sort_by_key(|e| e.start),
            Strand::Reverse => self.exons.sort_by(|a, b| b.start.cmp(&a.start)),
        }
    }

    /// Moves the whole model, exons and supporting blocks, to the other
    /// strand and restores transcript order
    pub fn flip_strand(&mut self) {
        self.strand = self.strand.flip();
        for exon in self.exons.iter_mut() {
            exon.flip_strand();
        }
        self.sort_exons();
    }

    /// 0-based offset in the spliced transcript of a genomic position, `None`
    /// for positions outside the exons.
    ///
    /// ```
    /// # use gar::libs::locus::{Exon, Transcript};
    /// # use gar::libs::record::Strand;
    /// let exons = vec![Exon::new(10, 19, Strand::Reverse), Exon::new(30, 39, Strand::Reverse)];
    /// let tx = Transcript::new("t1", "chr1", Strand::Reverse, exons, true).unwrap();
    /// assert_eq!(tx.genomic_to_transcript(39), Some(0));
    /// assert_eq!(tx.genomic_to_transcript(30), Some(9));
    /// assert_eq!(tx.genomic_to_transcript(19), Some(10));
    /// assert_eq!(tx.genomic_to_transcript(25), None);
    /// ```
    pub fn genomic_to_transcript(&self, pos: u64) -> Option<usize> {
        let mut offset = 0u64;
        for exon in &self.exons {
            if exon.contains(pos) {
                let within = match self.strand {
                    Strand::Forward => pos - exon.start,
                    Strand::Reverse => exon.end - pos,
                };
                return Some((offset + within) as usize);
            }
            offset += exon.len();
        }
        None
    }

    /// Spliced sequence in transcript orientation
    pub fn sequence(&self, slicer: &dyn SequenceSlicer) -> anyhow::Result<Vec<u8>> {
        let mut genomic = Vec::with_capacity(self.length() as usize);
        let mut ordered: Vec<&Exon> = self.exons.iter().collect();
        ordered.sort_by_key(|e| e.start);
        for exon in ordered {
            let part = slicer
                .slice(&self.region, exon.start, exon.end)?
                .ok_or_else(|| {
                    GarError::MissingSequence(format!(
                        "{}:{}-{} for {}",
                        self.region, exon.start, exon.end, self.id
                    ))
                })?;
            genomic.extend_from_slice(part.as_bytes());
        }

        Ok(match self.strand {
            Strand::Forward => genomic,
            Strand::Reverse => revcomp(&genomic),
        })
    }
}

/// A genomic locus ("gene") with its transcript models
#[derive(Debug, Clone, PartialEq)]
pub struct Locus {
    id: String,
    region: String,
    strand: Strand,
    biotype: String,
    transcripts: Vec<Transcript>,
}

impl Locus {
    pub fn new(id: &str, biotype: &str, transcripts: Vec<Transcript>) -> Result<Self, GarError> {
        let first = transcripts.first().ok_or_else(|| GarError::InvalidGeneModel {
            id: id.to_string(),
            reason: "locus without transcripts".to_string(),
        })?;
        let region = first.region().to_string();
        let strand = first.strand();
        if transcripts.iter().any(|t| t.region() != region) {
            return Err(GarError::InvalidGeneModel {
                id: id.to_string(),
                reason: "transcripts on more than one region".to_string(),
            });
        }

        Ok(Self {
            id: id.to_string(),
            region,
            strand,
            biotype: biotype.to_string(),
            transcripts,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn biotype(&self) -> &str {
        &self.biotype
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn transcripts_mut(&mut self) -> &mut [Transcript] {
        &mut self.transcripts
    }

    /// Keeps the locus strand in line with its first transcript
    pub fn sync_strand(&mut self) {
        if let Some(first) = self.transcripts.first() {
            self.strand = first.strand();
        }
    }

    pub fn start(&self) -> u64 {
        self.transcripts.iter().map(|t| t.start()).min().unwrap_or(0)
    }

    pub fn end(&self) -> u64 {
        self.transcripts.iter().map(|t| t.end()).max().unwrap_or(0)
    }

    /// Longest translatable transcript, or the longest one when nothing
    /// translates
    pub fn representative_transcript(&self) -> &Transcript {
        // first one wins a tie
        fn longest<'t>(list: Vec<&'t Transcript>) -> Option<&'t Transcript> {
            list.into_iter().fold(None, |best: Option<&'t Transcript>, t| match best {
                Some(b) if b.length() >= t.length() => Some(b),
                _ => Some(t),
            })
        }

        let translatable: Vec<&Transcript> =
            self.transcripts.iter().filter(|t| t.is_translatable()).collect();
        if let Some(t) = longest(translatable) {
            return t;
        }

        warn!(
            "Locus {} has no translatable transcript, using the longest one",
            self.id
        );
        // constructor guarantees at least one transcript
        longest(self.transcripts.iter().collect()).unwrap_or(&self.transcripts[0])
    }
}

/// One gap-free piece of an EST alignment. Genomic and hit spans have the
/// same length.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceBlock {
    pub start: u64,
    pub end: u64,
    /// Orientation of the EST relative to the forward genomic strand
    pub strand: Strand,
    pub hit_start: u64,
    pub hit_end: u64,
}

/// An EST alignment overlapping a locus
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceItem {
    name: String,
    region: String,
    coverage: f64,
    blocks: Vec<EvidenceBlock>,
}

impl EvidenceItem {
    /// `coverage` is the percentage of the EST covered by the alignment
    pub fn new(
        name: &str,
        region: &str,
        coverage: f64,
        mut blocks: Vec<EvidenceBlock>,
    ) -> Result<Self, GarError> {
        let invalid = |reason: String| GarError::InvalidEvidence {
            id: name.to_string(),
            reason,
        };
        if blocks.is_empty() {
            return Err(invalid("no aligned blocks".to_string()));
        }
        for b in &blocks {
            if b.start == 0 || b.hit_start == 0 || b.start > b.end || b.hit_start > b.hit_end {
                return Err(invalid(format!(
                    "malformed block {}-{} / {}-{}",
                    b.start, b.end, b.hit_start, b.hit_end
                )));
            }
            if b.end - b.start != b.hit_end - b.hit_start {
                return Err(invalid(format!(
                    "gapped block {}-{} / {}-{}",
                    b.start, b.end, b.hit_start, b.hit_end
                )));
            }
        }
        blocks.sort_by_key(|b| b.start);

        Ok(Self {
            name: name.to_string(),
            region: region.to_string(),
            coverage,
            blocks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn blocks(&self) -> &[EvidenceBlock] {
        &self.blocks
    }

    pub fn start(&self) -> u64 {
        self.blocks[0].start
    }

    pub fn end(&self) -> u64 {
        self.blocks.iter().map(|b| b.end).max().unwrap_or(0)
    }

    pub fn overlaps(&self, region: &str, start: u64, end: u64) -> bool {
        self.region == region && self.start() <= end && start <= self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::seq::InMemoryGenome;

    fn tx(id: &str, strand: Strand, exons: &[(u64, u64)], translatable: bool) -> Transcript {
        let exons = exons
            .iter()
            .map(|(s, e)| Exon::new(*s, *e, strand))
            .collect();
        Transcript::new(id, "chr1", strand, exons, translatable).unwrap()
    }

    #[test]
    fn test_transcript_order() {
        let t = tx("t1", Strand::Reverse, &[(1, 5), (20, 30)], true);
        assert_eq!(t.exons()[0].start, 20);
        assert_eq!(t.start(), 1);
        assert_eq!(t.end(), 30);
        assert_eq!(t.length(), 16);
    }

    #[test]
    fn test_transcript_sequence() {
        let mut genome = InMemoryGenome::new();
        genome.insert("chr1", b"AACCGGTTAC");

        let fwd = tx("t1", Strand::Forward, &[(1, 2), (5, 6)], true);
        assert_eq!(fwd.sequence(&genome).unwrap(), b"AAGG".to_vec());

        let rev = tx("t2", Strand::Reverse, &[(1, 2), (5, 6)], true);
        assert_eq!(rev.sequence(&genome).unwrap(), b"CCTT".to_vec());
        assert_eq!(rev.genomic_to_transcript(6), Some(0));
        assert_eq!(rev.genomic_to_transcript(1), Some(3));

        let outside = tx("t3", Strand::Forward, &[(9, 12)], true);
        assert!(outside.sequence(&genome).is_err());
    }

    #[test]
    fn test_reverse_sequence_keeps_soft_mask() {
        let mut genome = InMemoryGenome::new();
        genome.insert("chr1", b"AACCggtt");

        let rev = tx("t1", Strand::Reverse, &[(3, 8)], true);
        assert_eq!(rev.sequence(&genome).unwrap(), b"aaccGG".to_vec());
    }

    #[test]
    fn test_gene_model_contract() {
        let res = Transcript::new("t1", "chr1", Strand::Forward, vec![], true);
        assert!(matches!(res, Err(GarError::InvalidGeneModel { .. })));

        let exons = vec![Exon::new(10, 5, Strand::Forward)];
        let res = Transcript::new("t1", "chr1", Strand::Forward, exons, true);
        assert!(matches!(res, Err(GarError::InvalidGeneModel { .. })));

        let res = Locus::new("g1", "protein_coding", vec![]);
        assert!(matches!(res, Err(GarError::InvalidGeneModel { .. })));

        let other = Transcript::new(
            "t2",
            "chr2",
            Strand::Forward,
            vec![Exon::new(1, 5, Strand::Forward)],
            true,
        )
        .unwrap();
        let res = Locus::new(
            "g1",
            "protein_coding",
            vec![tx("t1", Strand::Forward, &[(1, 5)], true), other],
        );
        assert!(matches!(res, Err(GarError::InvalidGeneModel { .. })));
    }

    #[test]
    fn test_flip_strand() {
        let mut t = tx("t1", Strand::Forward, &[(1, 5), (20, 30)], false);
        t.flip_strand();
        assert_eq!(t.strand(), Strand::Reverse);
        assert!(t.exons().iter().all(|e| e.strand == Strand::Reverse));
        assert_eq!(t.exons()[0].start, 20);
    }

    #[test]
    fn test_representative_transcript() {
        let locus = Locus::new(
            "g1",
            "protein_coding",
            vec![
                tx("short_coding", Strand::Forward, &[(1, 10)], true),
                tx("long_noncoding", Strand::Forward, &[(1, 100)], false),
                tx("long_coding", Strand::Forward, &[(1, 50)], true),
            ],
        )
        .unwrap();
        assert_eq!(locus.representative_transcript().id(), "long_coding");

        let noncoding = Locus::new(
            "g2",
            "lncRNA",
            vec![
                tx("a", Strand::Forward, &[(1, 10)], false),
                tx("b", Strand::Forward, &[(1, 20)], false),
            ],
        )
        .unwrap();
        assert_eq!(noncoding.representative_transcript().id(), "b");

        let tied = Locus::new(
            "g3",
            "protein_coding",
            vec![
                tx("first", Strand::Forward, &[(1, 10)], true),
                tx("second", Strand::Forward, &[(21, 30)], true),
            ],
        )
        .unwrap();
        assert_eq!(tied.representative_transcript().id(), "first");
    }

    #[test]
    fn test_evidence_validation() {
        let block = |start, end, hit_start, hit_end| EvidenceBlock {
            start,
            end,
            strand: Strand::Forward,
            hit_start,
            hit_end,
        };
        let est = EvidenceItem::new("est1", "chr1", 95.0, vec![block(100, 109, 1, 10)]).unwrap();
        assert!(est.overlaps("chr1", 105, 200));
        assert!(!est.overlaps("chr1", 110, 200));
        assert!(!est.overlaps("chr2", 100, 200));

        assert!(EvidenceItem::new("est1", "chr1", 95.0, vec![block(100, 110, 1, 10)]).is_err());
        assert!(EvidenceItem::new("est1", "chr1", 95.0, vec![]).is_err());
    }
}
