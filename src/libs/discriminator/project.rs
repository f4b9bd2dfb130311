use crate::libs::error::GarError;
use crate::libs::locus::{EvidenceItem, Transcript};
use crate::libs::msa::{
    global_align, AlignedSegment, EvidenceAlignment, EvidenceRow, PairwiseParams, GAP,
};
use crate::libs::record::Strand;
use bio::alphabets::dna::revcomp;
use indexmap::IndexMap;

/// Places an EST on the spliced transcript.
///
/// The EST sequence is reverse-complemented when it aligned to the genome
/// on the other strand than the transcript, so the row reads in transcript
/// orientation. Bases outside the exons are dropped.
pub fn project_evidence(
    tx: &Transcript,
    item: &EvidenceItem,
    seq: &[u8],
) -> Result<EvidenceRow, GarError> {
    let est_len = seq.len();
    if let Some(bad) = item.blocks().iter().find(|b| b.hit_end as usize > est_len) {
        return Err(GarError::InvalidEvidence {
            id: item.name().to_string(),
            reason: format!(
                "hit end {} past the sequence length {}",
                bad.hit_end, est_len
            ),
        });
    }

    let est_strand = item.blocks()[0].strand;
    let flip = tx.strand().relative(est_strand) == Strand::Reverse;

    // (transcript offset, oriented EST offset), both 0-based
    let mut pairs: Vec<(usize, usize)> = vec![];
    for block in item.blocks() {
        for k in 0..=(block.end - block.start) {
            let Some(t) = tx.genomic_to_transcript(block.start + k) else {
                continue;
            };
            let h = match block.strand {
                Strand::Forward => (block.hit_start - 1 + k) as usize,
                Strand::Reverse => (block.hit_end - 1 - k) as usize,
            };
            let h = if flip { est_len - 1 - h } else { h };
            pairs.push((t, h));
        }
    }
    pairs.sort_unstable();

    let mut segments: Vec<AlignedSegment> = vec![];
    for (t, h) in pairs {
        match segments.last_mut() {
            Some(seg) if seg.ref_end() == t && seg.hit_end() == h => seg.len += 1,
            // overlapping blocks; both offsets must keep growing
            Some(seg) if t < seg.ref_end() || h < seg.hit_end() => continue,
            _ => segments.push(AlignedSegment {
                ref_start: t,
                hit_start: h,
                len: 1,
            }),
        }
    }

    Ok(EvidenceRow {
        name: item.name().to_string(),
        seq: if flip { revcomp(seq) } else { seq.to_vec() },
        segments,
    })
}

/// Puts the evidence of two loci into one frame.
///
/// The two reference transcripts are aligned globally. An EST row takes its
/// base from the first locus' alignment wherever it has one there, and from
/// the second otherwise. Insertions relative to the references are lost.
/// Rows are named by `first.0`, `second.0`, then `evidence` in order.
pub fn common_frame(
    first: (&str, &EvidenceAlignment),
    second: (&str, &EvidenceAlignment),
    evidence: &[String],
    params: &PairwiseParams,
) -> IndexMap<String, String> {
    let (row1, row2) = global_align(
        &first.1.reference_seq(),
        &second.1.reference_seq(),
        params,
    );
    let width = row1.len();
    let columns1 = reference_columns(&row1);
    let columns2 = reference_columns(&row2);

    let mut frame = IndexMap::new();
    frame.insert(first.0.to_string(), String::from_utf8_lossy(&row1).to_string());
    frame.insert(second.0.to_string(), String::from_utf8_lossy(&row2).to_string());

    for name in evidence {
        let mut line = vec![GAP; width];
        for (aln, columns) in [(first.1, &columns1), (second.1, &columns2)] {
            for (pos, &col) in columns.iter().enumerate() {
                if line[col] != GAP {
                    continue;
                }
                if let Some(c) = aln.char_at_ref(name, pos) {
                    line[col] = c;
                }
            }
        }
        frame.insert(name.clone(), String::from_utf8_lossy(&line).to_string());
    }

    frame
}

// column of every non-gap character
fn reference_columns(row: &[u8]) -> Vec<usize> {
    row.iter()
        .enumerate()
        .filter(|(_, c)| **c != GAP)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::locus::{EvidenceBlock, Exon};
    use crate::libs::msa::builder::build_alignment;

    fn block(start: u64, end: u64, strand: Strand, hit_start: u64, hit_end: u64) -> EvidenceBlock {
        EvidenceBlock {
            start,
            end,
            strand,
            hit_start,
            hit_end,
        }
    }

    fn tx(strand: Strand, exons: &[(u64, u64)]) -> Transcript {
        let exons = exons
            .iter()
            .map(|(s, e)| Exon::new(*s, *e, strand))
            .collect();
        Transcript::new("t1", "chr1", strand, exons, true).unwrap()
    }

    #[test]
    fn test_forward_spliced() {
        // exons 1-10 and 21-30; the EST covers 6-10 and 21-25
        let t = tx(Strand::Forward, &[(1, 10), (21, 30)]);
        let item = EvidenceItem::new(
            "est1",
            "chr1",
            100.0,
            vec![
                block(6, 10, Strand::Forward, 1, 5),
                block(21, 25, Strand::Forward, 6, 10),
            ],
        )
        .unwrap();
        let row = project_evidence(&t, &item, b"ACGTACGTAC").unwrap();
        assert_eq!(
            row.segments,
            vec![AlignedSegment {
                ref_start: 5,
                hit_start: 0,
                len: 10
            }]
        );
        assert_eq!(row.seq, b"ACGTACGTAC".to_vec());
    }

    #[test]
    fn test_reverse_transcript_reverse_est() {
        // the EST reads like the transcript, hit spans on its forward strand
        let t = tx(Strand::Reverse, &[(1, 10), (21, 30)]);
        let item = EvidenceItem::new(
            "est1",
            "chr1",
            100.0,
            vec![
                block(21, 30, Strand::Reverse, 1, 10),
                block(1, 10, Strand::Reverse, 11, 20),
            ],
        )
        .unwrap();
        let seq = b"AAAAACCCCCGGGGGTTTTT";
        let row = project_evidence(&t, &item, seq).unwrap();
        assert_eq!(
            row.segments,
            vec![AlignedSegment {
                ref_start: 0,
                hit_start: 0,
                len: 20
            }]
        );
        assert_eq!(row.seq, seq.to_vec());
    }

    #[test]
    fn test_opposite_strand_est_is_flipped() {
        let t = tx(Strand::Forward, &[(1, 8)]);
        let item = EvidenceItem::new(
            "est1",
            "chr1",
            100.0,
            vec![block(1, 8, Strand::Reverse, 1, 8)],
        )
        .unwrap();
        let row = project_evidence(&t, &item, b"AACCGGTA").unwrap();
        assert_eq!(row.seq, b"TACCGGTT".to_vec());
        assert_eq!(row.segments[0].ref_start, 0);
        assert_eq!(row.segments[0].hit_start, 0);
        assert_eq!(row.segments[0].len, 8);
    }

    #[test]
    fn test_intron_bases_dropped() {
        let t = tx(Strand::Forward, &[(1, 10), (21, 30)]);
        // one block running through the intron
        let item = EvidenceItem::new(
            "est1",
            "chr1",
            100.0,
            vec![block(6, 25, Strand::Forward, 1, 20)],
        )
        .unwrap();
        let row = project_evidence(&t, &item, &[b'A'; 20]).unwrap();
        assert_eq!(
            row.segments,
            vec![
                AlignedSegment {
                    ref_start: 5,
                    hit_start: 0,
                    len: 5
                },
                AlignedSegment {
                    ref_start: 10,
                    hit_start: 15,
                    len: 5
                },
            ]
        );
    }

    #[test]
    fn test_hit_past_sequence() {
        let t = tx(Strand::Forward, &[(1, 10)]);
        let item = EvidenceItem::new(
            "est1",
            "chr1",
            100.0,
            vec![block(1, 10, Strand::Forward, 1, 10)],
        )
        .unwrap();
        assert!(matches!(
            project_evidence(&t, &item, b"ACGT"),
            Err(GarError::InvalidEvidence { .. })
        ));
    }

    #[test]
    fn test_common_frame_fallback() {
        let seg = |ref_start, hit_start, len| AlignedSegment {
            ref_start,
            hit_start,
            len,
        };
        let aln1 = build_alignment(
            "t1",
            b"ACGTACGT",
            &[EvidenceRow {
                name: "est1".to_string(),
                seq: b"ACGT".to_vec(),
                segments: vec![seg(0, 0, 4)],
            }],
        )
        .unwrap();
        let aln2 = build_alignment(
            "t2",
            b"ACGTTCGT",
            &[EvidenceRow {
                name: "est1".to_string(),
                seq: b"ACGTTCGT".to_vec(),
                segments: vec![seg(0, 0, 8)],
            }],
        )
        .unwrap();

        let frame = common_frame(
            ("g1", &aln1),
            ("g2", &aln2),
            &["est1".to_string()],
            &PairwiseParams::default(),
        );
        assert_eq!(frame["g1"], "ACGTACGT");
        assert_eq!(frame["g2"], "ACGTTCGT");
        // first half from g1, the rest from g2
        assert_eq!(frame["est1"], "ACGTTCGT");
    }
}
