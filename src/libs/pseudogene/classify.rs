use super::splice::correct_strand;
use crate::libs::config::Config;
use crate::libs::locus::{Exon, Locus, Transcript};
use crate::libs::record::AlignmentRecord;
use crate::libs::seq::SequenceSlicer;
use indexmap::IndexMap;
use log::{debug, info};
use std::cmp::Ordering;

pub const PSEUDOGENE_BIOTYPE: &str = "processed_pseudogene";

/// Thresholds of the coverage/identity gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    pub min_coverage: f64,
    pub min_percent_id: f64,
    /// Only records tied with the best score of their group pass
    pub best_in_genome: bool,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ClassifierParams {
    fn from(config: &Config) -> Self {
        Self {
            min_coverage: config.min_coverage,
            min_percent_id: config.min_percent_id,
            best_in_genome: config.best_in_genome,
        }
    }
}

/// A flagged alignment and the gene model built from it
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePseudogene {
    pub record: AlignmentRecord,
    /// 1-based rank within its source group
    pub rank: usize,
    pub gene: Locus,
    pub strand_corrected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PseudogeneClassifier {
    params: ClassifierParams,
}

/// Best first: coverage, then number of blocks, then percent identity
pub fn compare_records(a: &AlignmentRecord, b: &AlignmentRecord) -> Ordering {
    b.coverage()
        .total_cmp(&a.coverage())
        .then_with(|| b.block_count().cmp(&a.block_count()))
        .then_with(|| b.percent_id().total_cmp(&a.percent_id()))
}

/// Records grouped by source sequence, groups in first-seen order
pub fn group_by_source(records: &[AlignmentRecord]) -> IndexMap<String, Vec<AlignmentRecord>> {
    let mut groups: IndexMap<String, Vec<AlignmentRecord>> = IndexMap::new();
    for record in records {
        groups
            .entry(record.source_id().to_string())
            .or_default()
            .push(record.clone());
    }
    groups
}

impl PseudogeneClassifier {
    pub fn new(params: ClassifierParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ClassifierParams {
        &self.params
    }

    /// Both branches are kept as configured; the relaxed one trades 5% more
    /// coverage for 3% less identity.
    pub fn passes_gate(&self, score: f64, percent_id: f64, max_score: f64) -> bool {
        let p = &self.params;
        let near_best = if p.best_in_genome {
            score == max_score
        } else {
            score >= 0.98 * max_score
        };

        near_best
            && ((score >= p.min_coverage && percent_id >= p.min_percent_id)
                || (score >= 1.05 * p.min_coverage && percent_id >= 0.97 * p.min_percent_id))
    }

    /// Flags unspliced records ranked below a spliced best hit of the same
    /// source. Returns `(rank, record)` pairs; `group` is sorted in place.
    pub fn classify_group(&self, group: &mut [AlignmentRecord]) -> Vec<(usize, AlignmentRecord)> {
        group.sort_by(compare_records);

        let Some(best) = group.first() else {
            return vec![];
        };
        let max_score = best.coverage();
        let best_spliced = best.is_spliced();

        let mut flagged = vec![];
        for (idx, record) in group.iter().enumerate() {
            let rank = idx + 1;
            if rank == 1 || !best_spliced || record.is_spliced() {
                continue;
            }

            if self.passes_gate(record.coverage(), record.percent_id(), max_score) {
                debug!(
                    "{} rank {} at {}:{}-{} flagged (coverage {}, identity {})",
                    record.source_id(),
                    rank,
                    record.region(),
                    record.start(),
                    record.end(),
                    record.coverage(),
                    record.percent_id()
                );
                flagged.push((rank, record.clone()));
            } else {
                debug!(
                    "{} rank {} rejected on thresholds (coverage {}, identity {})",
                    record.source_id(),
                    rank,
                    record.coverage(),
                    record.percent_id()
                );
            }
        }

        flagged
    }

    /// Every group of `records`, flagged records in group order
    pub fn classify(&self, records: &[AlignmentRecord]) -> Vec<(usize, AlignmentRecord)> {
        let mut flagged = vec![];
        for (_, mut group) in group_by_source(records) {
            flagged.extend(self.classify_group(&mut group));
        }
        flagged
    }

    /// Classifies, builds single-transcript gene models and checks their
    /// strand against the splice sites
    pub fn run(
        &self,
        records: &[AlignmentRecord],
        slicer: &dyn SequenceSlicer,
    ) -> anyhow::Result<Vec<CandidatePseudogene>> {
        let flagged = self.classify(records);
        info!(
            "{} of {} alignments flagged as processed pseudogene candidates",
            flagged.len(),
            records.len()
        );

        let mut candidates = Vec::with_capacity(flagged.len());
        for (rank, record) in flagged {
            let mut gene = to_gene_model(&record)?;
            let mut strand_corrected = false;
            for tx in gene.transcripts_mut() {
                strand_corrected |= correct_strand(tx, slicer)?;
            }
            gene.sync_strand();

            candidates.push(CandidatePseudogene {
                record,
                rank,
                gene,
                strand_corrected,
            });
        }

        Ok(candidates)
    }
}

/// One gene, one transcript, one exon per aligned block
pub fn to_gene_model(record: &AlignmentRecord) -> anyhow::Result<Locus> {
    let gene_id = format!(
        "{}:{}:{}-{}",
        record.source_id(),
        record.region(),
        record.start(),
        record.end()
    );
    let exons = record
        .blocks()
        .iter()
        .map(|block| Exon {
            start: block.start,
            end: block.end,
            strand: block.strand,
            supporting: Some(block.clone()),
        })
        .collect();
    let tx = Transcript::new(
        &format!("{}.1", gene_id),
        record.region(),
        record.strand(),
        exons,
        false,
    )?;

    Ok(Locus::new(&gene_id, PSEUDOGENE_BIOTYPE, vec![tx])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::record::{AlignedBlock, Strand, SupportFeature};
    use crate::libs::seq::InMemoryGenome;

    // blocks of 30 bp separated by 100 bp gaps (spliced)
    fn record(source: &str, start: u64, coverage: f64, blocks: usize, pid: f64) -> AlignmentRecord {
        let blocks = (0..blocks as u64)
            .map(|i| {
                let s = start + i * 130;
                AlignedBlock {
                    start: s,
                    end: s + 29,
                    strand: Strand::Forward,
                    support: SupportFeature {
                        score: coverage,
                        percent_id: pid,
                        hit_start: 1 + i * 30,
                        hit_end: 30 + i * 30,
                    },
                }
            })
            .collect();
        AlignmentRecord::new(source, "chr1", blocks).unwrap()
    }

    fn params(best_in_genome: bool) -> ClassifierParams {
        ClassifierParams {
            min_coverage: 90.0,
            min_percent_id: 97.0,
            best_in_genome,
        }
    }

    #[test]
    fn test_sort_tie_breaks() {
        let mut group = vec![
            record("X", 1000, 90.0, 1, 99.0),
            record("X", 2000, 95.0, 1, 98.0),
            record("X", 3000, 95.0, 2, 90.0),
            record("X", 4000, 95.0, 2, 97.0),
        ];
        group.sort_by(compare_records);
        let starts: Vec<u64> = group.iter().map(|r| r.start()).collect();
        assert_eq!(starts, vec![4000, 3000, 2000, 1000]);
        for r in &group[1..] {
            assert!(group[0].coverage() >= r.coverage());
        }
    }

    #[test]
    fn test_three_record_scenario() {
        let classifier = PseudogeneClassifier::new(params(true));
        let mut group = vec![
            record("X", 1000, 95.0, 1, 98.0),
            record("X", 5000, 95.0, 3, 99.0),
            record("X", 9000, 40.0, 2, 85.0),
        ];
        let flagged = classifier.classify_group(&mut group);

        assert_eq!(group[0].block_count(), 3);
        assert!(group[0].is_spliced());
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].0, 2);
        assert_eq!(flagged[0].1.start(), 1000);
    }

    #[test]
    fn test_unspliced_best_flags_nothing() {
        let classifier = PseudogeneClassifier::new(params(true));
        let flagged = classifier.classify(&[
            record("Y", 1000, 95.0, 1, 99.0),
            record("Y", 5000, 95.0, 1, 99.0),
        ]);
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_gate_modes() {
        let best = PseudogeneClassifier::new(params(true));
        let loose = PseudogeneClassifier::new(params(false));

        // within 2% of the best score
        assert!(!best.passes_gate(94.0, 98.0, 95.0));
        assert!(loose.passes_gate(94.0, 98.0, 95.0));
        assert!(!loose.passes_gate(92.0, 98.0, 95.0));

        // relaxed branch: 1.05 * 90 = 94.5, 0.97 * 97 = 94.09
        assert!(best.passes_gate(95.0, 95.0, 95.0));
        assert!(!best.passes_gate(94.0, 95.0, 94.0));
        assert!(!best.passes_gate(95.0, 94.0, 95.0));
    }

    #[test]
    fn test_groups_are_independent() {
        let classifier = PseudogeneClassifier::new(params(false));
        let flagged = classifier.classify(&[
            record("A", 1000, 95.0, 2, 99.0),
            record("B", 1000, 99.0, 3, 99.0),
            record("A", 8000, 94.0, 1, 98.0),
            record("B", 8000, 50.0, 1, 98.0),
        ]);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].1.source_id(), "A");
    }

    #[test]
    fn test_run_builds_gene_models() {
        let classifier = PseudogeneClassifier::new(params(true));
        let genome = InMemoryGenome::new();
        let candidates = classifier
            .run(
                &[
                    record("X", 1000, 95.0, 1, 98.0),
                    record("X", 5000, 95.0, 3, 99.0),
                ],
                &genome,
            )
            .unwrap();

        assert_eq!(candidates.len(), 1);
        let cand = &candidates[0];
        assert_eq!(cand.gene.biotype(), PSEUDOGENE_BIOTYPE);
        assert_eq!(cand.gene.id(), "X:chr1:1000-1029");
        assert_eq!(cand.gene.transcripts().len(), 1);
        assert_eq!(cand.gene.transcripts()[0].exons().len(), 1);
        assert!(!cand.strand_corrected);
    }
}
