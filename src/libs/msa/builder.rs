use super::{pad_rows, GAP};
use crate::libs::error::GarError;
use log::debug;
use std::collections::HashMap;

/// A gap-free stretch of evidence on the reference, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedSegment {
    pub ref_start: usize,
    pub hit_start: usize,
    pub len: usize,
}

impl AlignedSegment {
    pub fn ref_end(&self) -> usize {
        self.ref_start + self.len
    }

    pub fn hit_end(&self) -> usize {
        self.hit_start + self.len
    }
}

/// Evidence sequence, already oriented to the reference, and where it sits
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceRow {
    pub name: String,
    pub seq: Vec<u8>,
    pub segments: Vec<AlignedSegment>,
}

/// Gapped alignment of a reference (first row) and its evidence rows
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceAlignment {
    reference_id: String,
    names: Vec<String>,
    rows: Vec<Vec<u8>>,
    // alignment column of every reference position
    ref_columns: Vec<usize>,
}

impl EvidenceAlignment {
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// The reference row without gaps
    pub fn reference_seq(&self) -> Vec<u8> {
        self.rows
            .first()
            .map(|r| r.iter().copied().filter(|&c| c != GAP).collect())
            .unwrap_or_default()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, name: &str) -> Option<&[u8]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.rows[idx])
    }

    pub fn column_of(&self, ref_pos: usize) -> Option<usize> {
        self.ref_columns.get(ref_pos).copied()
    }

    /// Character of row `name` in the column of reference position `ref_pos`
    pub fn char_at_ref(&self, name: &str, ref_pos: usize) -> Option<u8> {
        let col = self.column_of(ref_pos)?;
        self.row(name).map(|row| row[col])
    }
}

/// Lays evidence onto a reference from the segment coordinates.
///
/// Evidence bases between two consecutive segments that the reference does
/// not consume become insertion columns, gapped in every other row.
pub fn build_alignment(
    reference_id: &str,
    reference: &[u8],
    evidence: &[EvidenceRow],
) -> Result<EvidenceAlignment, GarError> {
    let ref_len = reference.len();

    let mut sorted_rows: Vec<Vec<AlignedSegment>> = Vec::with_capacity(evidence.len());
    for row in evidence {
        let mut segments = row.segments.clone();
        segments.sort_by_key(|s| s.ref_start);
        if let Some(bad) = segments
            .iter()
            .find(|s| s.ref_end() > ref_len || s.hit_end() > row.seq.len())
        {
            return Err(GarError::InvalidEvidence {
                id: row.name.clone(),
                reason: format!(
                    "segment {}+{} / {}+{} outside {} ({} bp) or evidence ({} bp)",
                    bad.ref_start,
                    bad.len,
                    bad.hit_start,
                    bad.len,
                    reference_id,
                    ref_len,
                    row.seq.len()
                ),
            });
        }
        sorted_rows.push(segments);
    }

    // widest insertion in front of each reference position; the last slot
    // holds insertions after the reference end
    let mut insertions = vec![0usize; ref_len + 1];
    for segments in &sorted_rows {
        for (slot, ins) in row_insertions(segments) {
            insertions[slot] = insertions[slot].max(ins.len);
        }
    }

    let mut ref_columns = Vec::with_capacity(ref_len);
    let mut slot_columns = Vec::with_capacity(ref_len + 1);
    let mut col = 0usize;
    for (pos, ins) in insertions.iter().enumerate() {
        slot_columns.push(col);
        col += ins;
        if pos < ref_len {
            ref_columns.push(col);
            col += 1;
        }
    }
    let width = col;

    let mut names = Vec::with_capacity(evidence.len() + 1);
    let mut rows = Vec::with_capacity(evidence.len() + 1);

    let mut ref_row = vec![GAP; width];
    for (pos, &c) in ref_columns.iter().enumerate() {
        ref_row[c] = reference[pos];
    }
    names.push(reference_id.to_string());
    rows.push(ref_row);

    for (row, segments) in evidence.iter().zip(sorted_rows.iter()) {
        let mut line = vec![GAP; width];
        for seg in segments {
            for k in 0..seg.len {
                line[ref_columns[seg.ref_start + k]] = row.seq[seg.hit_start + k];
            }
        }
        for (slot, ins) in row_insertions(segments) {
            let base = slot_columns[slot];
            for k in 0..ins.len {
                line[base + k] = row.seq[ins.hit_start + k];
            }
        }
        names.push(row.name.clone());
        rows.push(line);
    }

    pad_rows(&mut rows);

    Ok(EvidenceAlignment {
        reference_id: reference_id.to_string(),
        names,
        rows,
        ref_columns,
    })
}

// (slot, evidence stretch) for every hit gap between consecutive segments
fn row_insertions(segments: &[AlignedSegment]) -> Vec<(usize, AlignedSegment)> {
    segments
        .windows(2)
        .filter(|w| w[1].hit_start > w[0].hit_end())
        .map(|w| {
            let slot = w[0].ref_end();
            (
                slot,
                AlignedSegment {
                    ref_start: slot,
                    hit_start: w[0].hit_end(),
                    len: w[1].hit_start - w[0].hit_end(),
                },
            )
        })
        .collect()
}

/// Builds evidence alignments and keeps them per reference identifier for
/// the lifetime of the builder
#[derive(Debug, Default)]
pub struct AlignmentBuilder {
    cache: HashMap<String, EvidenceAlignment>,
}

impl AlignmentBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the cached alignment when `reference_id` was built before
    pub fn build(
        &mut self,
        reference_id: &str,
        reference: &[u8],
        evidence: &[EvidenceRow],
    ) -> Result<&EvidenceAlignment, GarError> {
        if self.cache.contains_key(reference_id) {
            debug!("Alignment cache hit for {}", reference_id);
            return Ok(&self.cache[reference_id]);
        }

        let alignment = build_alignment(reference_id, reference, evidence)?;
        debug!(
            "Built alignment for {}: {} rows x {} columns",
            reference_id,
            alignment.rows().len(),
            alignment.len()
        );
        Ok(self
            .cache
            .entry(reference_id.to_string())
            .or_insert(alignment))
    }

    pub fn get(&self, reference_id: &str) -> Option<&EvidenceAlignment> {
        self.cache.get(reference_id)
    }

    pub fn is_cached(&self, reference_id: &str) -> bool {
        self.cache.contains_key(reference_id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
