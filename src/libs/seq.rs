use anyhow::anyhow;
use std::collections::HashMap;

/// Read access to genomic sequence. Coordinates are 1-based and inclusive.
///
/// `Ok(None)` means the region or the range is unknown to the source.
pub trait SequenceSlicer {
    fn slice(&self, region: &str, start: u64, end: u64) -> anyhow::Result<Option<String>>;
}

/// Sequence lookup by accession, e.g. an EST by its name
pub trait SequenceFetcher {
    fn fetch_by_accession(&self, id: &str) -> Option<Vec<u8>>;
}

/// Whole sequences held in memory, keyed by name
#[derive(Debug, Default, Clone)]
pub struct InMemoryGenome {
    seqs: HashMap<String, Vec<u8>>,
}

impl InMemoryGenome {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, name: &str, seq: &[u8]) {
        self.seqs.insert(name.to_string(), seq.to_vec());
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Loads every record of a (possibly gzipped) FASTA file.
    /// Names are cut at the first whitespace.
    pub fn from_fasta(infile: &str) -> anyhow::Result<Self> {
        let reader = crate::reader(infile)?;
        let mut fa_in = noodles_fasta::io::Reader::new(reader);

        let mut genome = Self::new();
        for result in fa_in.records() {
            let record = result?;
            let name = String::from_utf8(record.name().into())?;
            let seq = record
                .sequence()
                .get(..)
                .ok_or_else(|| anyhow!("Empty sequence record: {}", name))?;
            genome.insert(&name, seq);
        }

        Ok(genome)
    }
}

impl SequenceSlicer for InMemoryGenome {
    fn slice(&self, region: &str, start: u64, end: u64) -> anyhow::Result<Option<String>> {
        let seq = match self.seqs.get(region) {
            Some(seq) => seq,
            None => return Ok(None),
        };
        if start == 0 || start > end || end as usize > seq.len() {
            return Ok(None);
        }
        let bytes = &seq[(start - 1) as usize..end as usize];
        Ok(Some(String::from_utf8_lossy(bytes).to_string()))
    }
}

impl SequenceFetcher for InMemoryGenome {
    fn fetch_by_accession(&self, id: &str) -> Option<Vec<u8>> {
        self.seqs.get(id).cloned()
    }
}
