use crate::libs::locus::{EvidenceItem, Locus};
use crate::libs::psl::read_psl;
use log::info;

/// Supplies the EST alignments overlapping a locus
pub trait EvidenceSource {
    fn overlapping_evidence(&self, locus: &Locus) -> anyhow::Result<Vec<EvidenceItem>>;
}

/// Evidence alignments held in memory. An item overlaps a locus when it
/// lies on the same region and intersects the locus span.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEvidence {
    items: Vec<EvidenceItem>,
}

impl InMemoryEvidence {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, item: EvidenceItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One item per PSL line
    pub fn from_psl(infile: &str) -> anyhow::Result<Self> {
        let mut evidence = Self::new();
        for psl in read_psl(infile)? {
            evidence.push(psl.to_evidence_item()?);
        }
        info!("Loaded {} evidence alignments from {}", evidence.len(), infile);
        Ok(evidence)
    }
}

impl FromIterator<EvidenceItem> for InMemoryEvidence {
    fn from_iter<I: IntoIterator<Item = EvidenceItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl EvidenceSource for InMemoryEvidence {
    fn overlapping_evidence(&self, locus: &Locus) -> anyhow::Result<Vec<EvidenceItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.overlaps(locus.region(), locus.start(), locus.end()))
            .cloned()
            .collect())
    }
}
