use super::assign::{assign_evidence, classify_matches, MatchKind};
use super::project::{common_frame, project_evidence};
use super::source::EvidenceSource;
use crate::libs::config::Config;
use crate::libs::distance::{
    evidence_distance, pairwise_distances, DistanceClass, DistanceMatrix,
};
use crate::libs::error::GarError;
use crate::libs::locus::{EvidenceItem, Locus, Transcript};
use crate::libs::msa::{differing_columns, select_columns, AlignmentBuilder, PairwiseParams};
use crate::libs::seq::{SequenceFetcher, SequenceSlicer};
use anyhow::anyhow;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Progress of an [`EvidenceClusterer`]; stages only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uninitialized,
    SharedDiscovered,
    DistancesComputed,
    Clustered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClustererParams {
    /// Fraction of an EST that must be aligned for it to count
    pub coverage_cutoff: f64,
    pub twilight: f64,
    pub class: DistanceClass,
    pub pairwise: PairwiseParams,
}

impl Default for ClustererParams {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ClustererParams {
    fn from(config: &Config) -> Self {
        Self {
            coverage_cutoff: crate::libs::config::normalize_cutoff(config.est_coverage_cutoff),
            twilight: config.distance_twilight,
            class: config.distance_class,
            pairwise: PairwiseParams::default(),
        }
    }
}

/// ESTs of one locus, by how they match it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocusMatches {
    pub single: BTreeSet<String>,
    pub multiple: BTreeSet<String>,
    pub incorrect: BTreeSet<String>,
}

impl LocusMatches {
    pub fn insert(&mut self, evidence: &str, kind: MatchKind) {
        let set = match kind {
            MatchKind::Single => &mut self.single,
            MatchKind::Multiple => &mut self.multiple,
            MatchKind::Incorrect => &mut self.incorrect,
        };
        set.insert(evidence.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.multiple.is_empty() && self.incorrect.is_empty()
    }
}

/// Decides which of several overlapping loci an EST really belongs to.
///
/// ESTs overlapping a single locus match it without further work. ESTs
/// shared by two or more loci are compared against each locus in a common
/// alignment frame and assigned to the nearest ones.
///
/// Every stage method runs the stages before it when needed and does
/// nothing when its stage is already done.
pub struct EvidenceClusterer<'a> {
    loci: Vec<Locus>,
    // representative transcript of each locus, same order as `loci`
    references: Vec<Transcript>,
    evidence: &'a dyn EvidenceSource,
    fetcher: &'a dyn SequenceFetcher,
    slicer: &'a dyn SequenceSlicer,
    params: ClustererParams,
    stage: Stage,

    overlaps: IndexMap<String, Vec<EvidenceItem>>,
    shared: IndexMap<String, Vec<String>>,
    builder: AlignmentBuilder,
    matrix: DistanceMatrix,
    assignees: IndexMap<String, Vec<String>>,
    matches: IndexMap<String, LocusMatches>,
}

impl<'a> EvidenceClusterer<'a> {
    pub fn new(
        loci: Vec<Locus>,
        evidence: &'a dyn EvidenceSource,
        fetcher: &'a dyn SequenceFetcher,
        slicer: &'a dyn SequenceSlicer,
        params: ClustererParams,
    ) -> Self {
        let references = loci
            .iter()
            .map(|l| l.representative_transcript().clone())
            .collect();
        let matches = loci
            .iter()
            .map(|l| (l.id().to_string(), LocusMatches::default()))
            .collect();

        Self {
            loci,
            references,
            evidence,
            fetcher,
            slicer,
            params,
            stage: Stage::Uninitialized,
            overlaps: IndexMap::new(),
            shared: IndexMap::new(),
            builder: AlignmentBuilder::new(),
            matrix: DistanceMatrix::new(),
            assignees: IndexMap::new(),
            matches,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn loci(&self) -> &[Locus] {
        &self.loci
    }

    pub fn params(&self) -> &ClustererParams {
        &self.params
    }

    /// EST name -> ids of the loci it overlaps, for ESTs on two or more loci
    pub fn shared_evidence(&self) -> &IndexMap<String, Vec<String>> {
        &self.shared
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.matrix
    }

    pub fn matches(&self, locus_id: &str) -> Option<&LocusMatches> {
        self.matches.get(locus_id)
    }

    /// Locus id -> matches, loci in input order
    pub fn all_matches(&self) -> &IndexMap<String, LocusMatches> {
        &self.matches
    }

    pub fn assignees(&self, evidence: &str) -> Option<&[String]> {
        self.assignees.get(evidence).map(|v| v.as_slice())
    }

    pub fn all_assignees(&self) -> &IndexMap<String, Vec<String>> {
        &self.assignees
    }

    /// Collects the evidence of every locus above the coverage cutoff and
    /// settles the ESTs seen on one locus only
    pub fn discover_shared_evidence(&mut self) -> anyhow::Result<()> {
        if self.stage >= Stage::SharedDiscovered {
            return Ok(());
        }

        let cutoff = self.params.coverage_cutoff;
        let mut est_loci: IndexMap<String, Vec<String>> = IndexMap::new();
        for locus in &self.loci {
            let mut kept: Vec<EvidenceItem> = vec![];
            for item in self.evidence.overlapping_evidence(locus)? {
                if item.coverage() / 100.0 < cutoff {
                    debug!(
                        "{} on {} below the coverage cutoff ({:.1}%)",
                        item.name(),
                        locus.id(),
                        item.coverage()
                    );
                    continue;
                }
                if kept.iter().any(|k| k.name() == item.name()) {
                    warn!(
                        "{} aligned to {} more than once, keeping the first alignment",
                        item.name(),
                        locus.id()
                    );
                    continue;
                }
                kept.push(item);
            }

            for item in &kept {
                est_loci
                    .entry(item.name().to_string())
                    .or_default()
                    .push(locus.id().to_string());
            }
            debug!("{}: {} evidence alignments kept", locus.id(), kept.len());
            self.overlaps.insert(locus.id().to_string(), kept);
        }

        for (est, loci) in est_loci {
            if loci.len() == 1 {
                if let Some(m) = self.matches.get_mut(&loci[0]) {
                    m.insert(&est, MatchKind::Single);
                }
            } else {
                self.shared.insert(est, loci);
            }
        }

        info!(
            "{} loci, {} shared ESTs",
            self.loci.len(),
            self.shared.len()
        );
        self.stage = Stage::SharedDiscovered;
        Ok(())
    }

    /// Distances between every shared EST and the loci it overlaps.
    ///
    /// Locus pairs are visited in input order. A locus-EST distance is
    /// measured once, in the frame of the first pair holding that locus, and
    /// only over the columns the EST covers.
    pub fn compute_distances(&mut self) -> anyhow::Result<()> {
        if self.stage >= Stage::DistancesComputed {
            return Ok(());
        }
        self.discover_shared_evidence()?;

        let mut pairs: IndexMap<(usize, usize), Vec<String>> = IndexMap::new();
        for (est, loci) in &self.shared {
            let mut idx: Vec<usize> = loci.iter().filter_map(|id| self.locus_index(id)).collect();
            idx.sort_unstable();
            for (i, j) in idx.into_iter().tuple_combinations() {
                pairs.entry((i, j)).or_default().push(est.clone());
            }
        }
        pairs.sort_keys();

        for ((i, j), ests) in pairs {
            self.compare_pair(i, j, &ests)?;
        }

        info!("{} distances computed", self.matrix.len());
        self.stage = Stage::DistancesComputed;
        Ok(())
    }

    /// Assigns each shared EST and fills the per-locus match sets
    pub fn cluster(&mut self) -> anyhow::Result<()> {
        if self.stage >= Stage::Clustered {
            return Ok(());
        }
        self.compute_distances()?;

        for (est, loci) in &self.shared {
            let assignees = assign_evidence(
                est,
                loci,
                &self.matrix,
                self.params.class,
                self.params.twilight,
            )?;
            for (locus, kind) in classify_matches(loci, &assignees) {
                if let Some(m) = self.matches.get_mut(&locus) {
                    m.insert(est, kind);
                }
            }
            debug!("{} assigned to {}", est, assignees.join(","));
            self.assignees.insert(est.clone(), assignees);
        }

        self.stage = Stage::Clustered;
        Ok(())
    }

    fn locus_index(&self, id: &str) -> Option<usize> {
        self.loci.iter().position(|l| l.id() == id)
    }

    // evidence alignment of one locus over its shared ESTs, built once
    fn ensure_alignment(&mut self, idx: usize) -> anyhow::Result<()> {
        let tx = &self.references[idx];
        if self.builder.is_cached(tx.id()) {
            return Ok(());
        }

        let reference = tx.sequence(self.slicer)?;
        let items = self
            .overlaps
            .get(self.loci[idx].id())
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let mut rows = vec![];
        for item in items.iter().filter(|i| self.shared.contains_key(i.name())) {
            let seq = self
                .fetcher
                .fetch_by_accession(item.name())
                .ok_or_else(|| GarError::MissingSequence(item.name().to_string()))?;
            rows.push(project_evidence(tx, item, &seq)?);
        }

        self.builder.build(tx.id(), &reference, &rows)?;
        Ok(())
    }

    fn compare_pair(&mut self, i: usize, j: usize, ests: &[String]) -> anyhow::Result<()> {
        self.ensure_alignment(i)?;
        self.ensure_alignment(j)?;

        let id1 = self.loci[i].id().to_string();
        let id2 = self.loci[j].id().to_string();
        let tx1 = self.references[i].id();
        let tx2 = self.references[j].id();
        let aln1 = self
            .builder
            .get(tx1)
            .ok_or_else(|| anyhow!("No alignment built for {}", tx1))?;
        let aln2 = self
            .builder
            .get(tx2)
            .ok_or_else(|| anyhow!("No alignment built for {}", tx2))?;

        let frame = common_frame(
            (id1.as_str(), aln1),
            (id2.as_str(), aln2),
            ests,
            &self.params.pairwise,
        );
        debug!(
            "{} vs {}: {} columns, {} shared ESTs",
            id1,
            id2,
            frame[0].len(),
            ests.len()
        );

        let class = self.params.class;
        let columns: Vec<usize> = match class {
            DistanceClass::InformativeSites => {
                self.store(&id1, &id2, class, 1.0)?;
                let columns = differing_columns(frame[0].as_bytes(), frame[1].as_bytes());
                if columns.is_empty() {
                    warn!(
                        "No informative sites between {} and {}, EST distances set to 0",
                        id1, id2
                    );
                }
                columns
            }
            DistanceClass::Nucleotide => {
                let dists = pairwise_distances(&frame)?;
                if let Some(d) = dists.get(&id1, &id2) {
                    self.store(&id1, &id2, class, d)?;
                }
                (0..frame[0].len()).collect()
            }
        };
        let sites = select_columns(&frame, &columns);

        for est in ests {
            let Some(est_row) = sites.get(est) else {
                continue;
            };
            for locus in [&id1, &id2] {
                // the first pair holding this locus and EST decides
                if self.matrix.contains(locus, est, class) {
                    continue;
                }
                let d = sites
                    .get(locus.as_str())
                    .and_then(|row| evidence_distance(row.as_bytes(), est_row.as_bytes()))
                    .unwrap_or_else(|| {
                        debug!("{} has no base at the sites of {} vs {}", est, id1, id2);
                        0.0
                    });
                self.store(locus, est, class, d)?;
            }
        }

        Ok(())
    }

    // a key written before keeps its first value
    fn store(&mut self, a: &str, b: &str, class: DistanceClass, d: f64) -> Result<(), GarError> {
        match self.matrix.insert(a, b, class, d) {
            Err(err @ GarError::DuplicateDistance(..)) => {
                warn!("{}, keeping the first value", err);
                Ok(())
            }
            other => other,
        }
    }
}
