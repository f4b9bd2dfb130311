//! Multiple alignments of a reference against its evidence.
//!
//! * [`builder`] - places evidence on a reference from known aligned segments,
//!   with a per-reference cache.
//! * [`pairwise`] - global alignment of two references, the common frame for
//!   comparing evidence between two loci.

pub mod builder;
pub mod pairwise;

pub use builder::{AlignedSegment, AlignmentBuilder, EvidenceAlignment, EvidenceRow};
pub use pairwise::{global_align, PairwiseParams};

use indexmap::IndexMap;

/// Gap character of every alignment row
pub const GAP: u8 = b'-';

/// Right-pads every row to the longest one.
///
/// Upstream alignments occasionally come back with rows of different
/// lengths; downstream distance code requires equal lengths.
///
/// ```
/// let mut rows = vec![b"ACGT".to_vec(), b"AC".to_vec()];
/// gar::libs::msa::pad_rows(&mut rows);
/// assert_eq!(rows[1], b"AC--".to_vec());
/// ```
pub fn pad_rows(rows: &mut [Vec<u8>]) {
    let max = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in rows.iter_mut() {
        if row.len() < max {
            row.resize(max, GAP);
        }
    }
}

/// Columns where two rows differ, case-insensitive. A gap against a base
/// counts as a difference.
///
/// ```
/// # use gar::libs::msa::differing_columns;
/// assert_eq!(differing_columns(b"ACGT-A", b"aTGTCA"), vec![1, 4]);
/// ```
pub fn differing_columns(a: &[u8], b: &[u8]) -> Vec<usize> {
    a.iter()
        .zip(b.iter())
        .enumerate()
        .filter(|(_, (x, y))| !x.eq_ignore_ascii_case(y))
        .map(|(i, _)| i)
        .collect()
}

/// Keeps only `columns` of every row, in the given order. Columns past the
/// end of a row are skipped.
pub fn select_columns(
    alignment: &IndexMap<String, String>,
    columns: &[usize],
) -> IndexMap<String, String> {
    alignment
        .iter()
        .map(|(name, row)| {
            let bytes = row.as_bytes();
            let picked: String = columns
                .iter()
                .filter_map(|&c| bytes.get(c))
                .map(|&b| b as char)
                .collect();
            (name.clone(), picked)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_columns() {
        let mut aln = IndexMap::new();
        aln.insert("a".to_string(), "ACGTAC".to_string());
        aln.insert("b".to_string(), "ACCTAG".to_string());

        let cols = differing_columns(aln["a"].as_bytes(), aln["b"].as_bytes());
        assert_eq!(cols, vec![2, 5]);

        let sub = select_columns(&aln, &cols);
        assert_eq!(sub["a"], "GC");
        assert_eq!(sub["b"], "CG");
        assert_eq!(sub.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_select_nothing() {
        let mut aln = IndexMap::new();
        aln.insert("a".to_string(), "ACGT".to_string());
        let sub = select_columns(&aln, &[]);
        assert_eq!(sub["a"], "");
    }
}
