//! Pairwise mismatch distances over aligned sequences, and a write-once store
//! for distances between named entities (loci and evidence).

use crate::libs::error::GarError;
use crate::libs::msa::GAP;
use indexmap::IndexMap;
use log::warn;
use std::collections::HashMap;
use std::fmt;

/// The two kinds of distances kept side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceClass {
    /// Every aligned column counts
    Nucleotide,
    /// Only columns where the two loci differ count
    InformativeSites,
}

impl fmt::Display for DistanceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceClass::Nucleotide => write!(f, "nucleotide"),
            DistanceClass::InformativeSites => write!(f, "informative"),
        }
    }
}

impl std::str::FromStr for DistanceClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nucleotide" | "nt" | "codon" => Ok(DistanceClass::Nucleotide),
            "informative" | "informative_sites" | "sites" => Ok(DistanceClass::InformativeSites),
            _ => Err(anyhow::anyhow!("Unknown distance class: {}", s)),
        }
    }
}

/// Unordered pair of identifiers; `PairKey::new("b", "a") == PairKey::new("a", "b")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            PairKey(a.to_string(), b.to_string())
        } else {
            PairKey(b.to_string(), a.to_string())
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

/// Distances keyed by unordered pair and class. Each key is written once.
#[derive(Debug, Default, Clone)]
pub struct DistanceMatrix {
    entries: HashMap<(PairKey, DistanceClass), f64>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        Default::default()
    }

    /// Stores a distance. A key already present keeps its first value and the
    /// call fails with [`GarError::DuplicateDistance`].
    ///
    /// ```
    /// # use gar::libs::distance::{DistanceClass, DistanceMatrix};
    /// let mut mat = DistanceMatrix::new();
    /// let cls = DistanceClass::Nucleotide;
    /// mat.insert("geneA", "est1", cls, 0.1).unwrap();
    /// assert!(mat.insert("est1", "geneA", cls, 0.3).is_err());
    /// assert_eq!(mat.get("est1", "geneA", cls), Some(0.1));
    /// assert_eq!(mat.get("est1", "geneA", DistanceClass::InformativeSites), None);
    /// ```
    pub fn insert(
        &mut self,
        a: &str,
        b: &str,
        class: DistanceClass,
        distance: f64,
    ) -> Result<(), GarError> {
        if !(0.0..=1.0).contains(&distance) {
            return Err(GarError::DistanceOutOfRange {
                a: a.to_string(),
                b: b.to_string(),
                value: distance,
            });
        }

        let key = (PairKey::new(a, b), class);
        if self.entries.contains_key(&key) {
            return Err(GarError::DuplicateDistance(
                key.0.first().to_string(),
                key.0.second().to_string(),
                class.to_string(),
            ));
        }
        self.entries.insert(key, distance);
        Ok(())
    }

    pub fn get(&self, a: &str, b: &str, class: DistanceClass) -> Option<f64> {
        self.entries.get(&(PairKey::new(a, b), class)).copied()
    }

    pub fn contains(&self, a: &str, b: &str, class: DistanceClass) -> bool {
        self.entries.contains_key(&(PairKey::new(a, b), class))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Upper-triangular distance matrix over one alignment
#[derive(Debug, Clone, Default)]
pub struct PairwiseDistances {
    names: Vec<String>,
    // row i holds distances to names[i + 1..]
    upper: Vec<Vec<f64>>,
}

impl PairwiseDistances {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Distance by index, `i < j`
    pub fn at(&self, i: usize, j: usize) -> Option<f64> {
        if i >= j {
            return None;
        }
        self.upper.get(i)?.get(j - i - 1).copied()
    }

    /// Symmetric lookup by name
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        match i.cmp(&j) {
            std::cmp::Ordering::Less => self.at(i, j),
            std::cmp::Ordering::Greater => self.at(j, i),
            std::cmp::Ordering::Equal => Some(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upper.iter().all(|row| row.is_empty())
    }
}

/// Fraction of mismatched columns between two aligned rows.
/// Comparison is case-insensitive; a gap matches only a gap.
///
/// ```
/// # use gar::libs::distance::mismatch_distance;
/// assert_eq!(mismatch_distance(b"ACGT", b"acgt"), Some(0.0));
/// assert_eq!(mismatch_distance(b"AC-T", b"ACGA"), Some(0.5));
/// assert_eq!(mismatch_distance(b"", b""), None);
/// ```
pub fn mismatch_distance(a: &[u8], b: &[u8]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let matches = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| x.eq_ignore_ascii_case(y))
        .count();
    Some(1.0 - matches as f64 / a.len() as f64)
}

/// Fraction of mismatches between a locus row and an evidence row, over the
/// columns where the evidence has a base. `None` when it has none.
///
/// A partial EST says nothing about the columns it does not reach.
///
/// ```
/// # use gar::libs::distance::evidence_distance;
/// assert_eq!(evidence_distance(b"ACGTAC", b"ACTT--"), Some(0.25));
/// assert_eq!(evidence_distance(b"AC----", b"ACGT--"), Some(0.5));
/// assert_eq!(evidence_distance(b"ACGT", b"----"), None);
/// ```
pub fn evidence_distance(locus: &[u8], evidence: &[u8]) -> Option<f64> {
    if locus.len() != evidence.len() {
        return None;
    }
    let (covered, mismatches) = locus
        .iter()
        .zip(evidence.iter())
        .filter(|(_, e)| **e != GAP)
        .fold((0usize, 0usize), |(n, m), (l, e)| {
            (n + 1, m + usize::from(!l.eq_ignore_ascii_case(e)))
        });
    if covered == 0 {
        None
    } else {
        Some(mismatches as f64 / covered as f64)
    }
}

/// All pairwise distances of an alignment given as name -> aligned row.
///
/// Rows of unequal length are a contract violation. A zero-length alignment
/// only produces a warning and an empty matrix.
pub fn pairwise_distances(
    alignment: &IndexMap<String, String>,
) -> Result<PairwiseDistances, GarError> {
    let names: Vec<String> = alignment.keys().cloned().collect();
    let rows: Vec<&[u8]> = alignment.values().map(|s| s.as_bytes()).collect();

    let expected = rows.first().map(|r| r.len()).unwrap_or(0);
    for (name, row) in names.iter().zip(rows.iter()) {
        if row.len() != expected {
            return Err(GarError::UnequalAlignmentLength {
                name: name.clone(),
                expected,
                found: row.len(),
            });
        }
    }

    if expected == 0 {
        warn!(
            "Zero-length alignment of {} sequences, no comparison made",
            names.len()
        );
        return Ok(PairwiseDistances {
            names,
            upper: vec![],
        });
    }

    let mut upper = Vec::with_capacity(rows.len());
    for i in 0..rows.len() {
        let row: Vec<f64> = ((i + 1)..rows.len())
            .map(|j| mismatch_distance(rows[i], rows[j]).unwrap_or(0.0))
            .collect();
        upper.push(row);
    }

    Ok(PairwiseDistances { names, upper })
}
