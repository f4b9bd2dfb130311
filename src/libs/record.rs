//! Alignment records produced by an external aligner (e.g. Exonerate)

use crate::libs::error::GarError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// `+` and `-`; the first character of a PSL strand field decides
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s.chars().next() {
            Some('+') => Some(Strand::Forward),
            Some('-') => Some(Strand::Reverse),
            _ => None,
        }
    }

    /// Strand of `other` read relative to `self`
    pub fn relative(self, other: Strand) -> Strand {
        if self == other {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// Per-block evidence: the aligner's score and identity, and the aligned
/// span on the query (hit) sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SupportFeature {
    /// Raw alignment score; Exonerate-style runs report query coverage here
    pub score: f64,
    pub percent_id: f64,
    pub hit_start: u64,
    pub hit_end: u64,
}

/// One gap-free piece of an alignment on the genome (1-based, inclusive)
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedBlock {
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub support: SupportFeature,
}

impl AlignedBlock {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// A candidate alignment of one source sequence against the genome
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    source_id: String,
    region: String,
    blocks: Vec<AlignedBlock>,
}

impl AlignmentRecord {
    /// Blocks are sorted by genomic start.
    ///
    /// Fails on an empty block list, a block with `start > end` or blocks
    /// on different strands.
    pub fn new(
        source_id: &str,
        region: &str,
        mut blocks: Vec<AlignedBlock>,
    ) -> Result<Self, GarError> {
        let invalid = |reason: &str| GarError::InvalidRecord {
            id: source_id.to_string(),
            reason: reason.to_string(),
        };

        if blocks.is_empty() {
            return Err(invalid("no aligned blocks"));
        }
        if blocks.iter().any(|b| b.start == 0 || b.start > b.end) {
            return Err(invalid("block start must be positive and not after its end"));
        }
        let strand = blocks[0].strand;
        if blocks.iter().any(|b| b.strand != strand) {
            return Err(invalid("blocks on more than one strand"));
        }

        blocks.sort_by_key(|b| b.start);

        Ok(Self {
            source_id: source_id.to_string(),
            region: region.to_string(),
            blocks,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn blocks(&self) -> &[AlignedBlock] {
        &self.blocks
    }

    pub fn strand(&self) -> Strand {
        self.blocks[0].strand
    }

    pub fn start(&self) -> u64 {
        self.blocks[0].start
    }

    pub fn end(&self) -> u64 {
        self.blocks.iter().map(|b| b.end).max().unwrap_or(0)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Coverage of the whole alignment, read from the first block
    pub fn coverage(&self) -> f64 {
        self.blocks[0].support.score
    }

    /// Percent identity of the whole alignment, read from the first block
    pub fn percent_id(&self) -> f64 {
        self.blocks[0].support.percent_id
    }

    /// Genomic gaps between consecutive blocks
    pub fn gaps(&self) -> Vec<u64> {
        self.blocks
            .windows(2)
            .map(|w| w[1].start.saturating_sub(w[0].end + 1))
            .collect()
    }

    /// More than one block, and at least one gap that is not a frameshift.
    /// A frameshift gap has a genomic length divisible by 3.
    ///
    /// ```
    /// # use gar::libs::record::*;
    /// let block = |start, end| AlignedBlock {
    ///     start,
    ///     end,
    ///     strand: Strand::Forward,
    ///     support: SupportFeature { score: 90.0, percent_id: 99.0, hit_start: 1, hit_end: 1 },
    /// };
    /// let single = AlignmentRecord::new("q", "chr1", vec![block(1, 100)]).unwrap();
    /// assert!(!single.is_spliced());
    /// // gap of 3 bases
    /// let shifted = AlignmentRecord::new("q", "chr1", vec![block(1, 100), block(104, 200)]).unwrap();
    /// assert!(!shifted.is_spliced());
    /// // gap of 100 bases
    /// let spliced = AlignmentRecord::new("q", "chr1", vec![block(1, 100), block(201, 300)]).unwrap();
    /// assert!(spliced.is_spliced());
    /// ```
    pub fn is_spliced(&self) -> bool {
        if self.blocks.len() < 2 {
            return false;
        }
        self.gaps().iter().any(|gap| gap % 3 != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: u64, end: u64, strand: Strand) -> AlignedBlock {
        AlignedBlock {
            start,
            end,
            strand,
            support: SupportFeature {
                score: 95.0,
                percent_id: 98.0,
                hit_start: 1,
                hit_end: end - start + 1,
            },
        }
    }

    #[test]
    fn test_blocks_sorted() {
        let rec = AlignmentRecord::new(
            "q1",
            "chr1",
            vec![block(500, 600, Strand::Reverse), block(100, 200, Strand::Reverse)],
        )
        .unwrap();
        assert_eq!(rec.start(), 100);
        assert_eq!(rec.end(), 600);
        assert_eq!(rec.gaps(), vec![299]);
        assert_eq!(rec.strand(), Strand::Reverse);
    }

    #[test]
    fn test_contract_violations() {
        assert!(matches!(
            AlignmentRecord::new("q1", "chr1", vec![]),
            Err(GarError::InvalidRecord { .. })
        ));
        assert!(AlignmentRecord::new(
            "q1",
            "chr1",
            vec![block(100, 200, Strand::Forward), block(300, 400, Strand::Reverse)],
        )
        .is_err());

        let mut bad = block(100, 200, Strand::Forward);
        bad.end = 50;
        assert!(AlignmentRecord::new("q1", "chr1", vec![bad]).is_err());
    }

    #[test]
    fn test_strand_helpers() {
        assert_eq!(Strand::from_symbol("+-"), Some(Strand::Forward));
        assert_eq!(Strand::from_symbol("-"), Some(Strand::Reverse));
        assert_eq!(Strand::from_symbol(""), None);
        assert_eq!(Strand::Forward.flip(), Strand::Reverse);
        assert_eq!(Strand::Reverse.relative(Strand::Reverse), Strand::Forward);
        assert_eq!(Strand::Forward.relative(Strand::Reverse), Strand::Reverse);
        assert_eq!(Strand::Reverse.to_string(), "-");
    }
}
