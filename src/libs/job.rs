//! Annotation jobs: fetch the input, run the analysis, write a report.
//!
//! ```no_run
//! # use gar::libs::job::{run_job, PseudogeneJob, PslAlignmentSource};
//! # use gar::libs::pseudogene::ClassifierParams;
//! # use gar::libs::seq::InMemoryGenome;
//! let source = PslAlignmentSource::new("hits.psl");
//! let genome = InMemoryGenome::from_fasta("genome.fa").unwrap();
//! let mut job = PseudogeneJob::new(&source, &genome, ClassifierParams::default());
//! let mut writer = gar::writer("stdout").unwrap();
//! run_job(&mut job, &mut writer).unwrap();
//! ```

use crate::libs::discriminator::{ClustererParams, EvidenceClusterer, EvidenceSource};
use crate::libs::locus::Locus;
use crate::libs::psl::read_psl;
use crate::libs::pseudogene::{CandidatePseudogene, ClassifierParams, PseudogeneClassifier};
use crate::libs::record::AlignmentRecord;
use crate::libs::seq::{SequenceFetcher, SequenceSlicer};
use anyhow::Context;
use log::info;
use std::io::Write;

/// Supplies the spliced alignments of source sequences against the genome
pub trait AlignmentSource {
    fn alignments(&self) -> anyhow::Result<Vec<AlignmentRecord>>;
}

/// Alignments read from a PSL file, e.g. a converted Exonerate run
#[derive(Debug, Clone)]
pub struct PslAlignmentSource {
    path: String,
}

impl PslAlignmentSource {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl AlignmentSource for PslAlignmentSource {
    fn alignments(&self) -> anyhow::Result<Vec<AlignmentRecord>> {
        let mut records = vec![];
        for psl in read_psl(&self.path)? {
            records.push(psl.to_alignment_record()?);
        }
        Ok(records)
    }
}

impl AlignmentSource for Vec<AlignmentRecord> {
    fn alignments(&self) -> anyhow::Result<Vec<AlignmentRecord>> {
        Ok(self.clone())
    }
}

/// Reads transcript alignments as loci, one single-transcript locus per PSL
/// line named after the query
pub fn read_loci(infile: &str, biotype: &str) -> anyhow::Result<Vec<Locus>> {
    let mut loci = vec![];
    for psl in read_psl(infile)? {
        let tx = psl.to_transcript(true)?;
        loci.push(Locus::new(&psl.q_name, biotype, vec![tx])?);
    }
    Ok(loci)
}

pub trait AnnotationJob {
    fn name(&self) -> &str;

    fn fetch_input(&mut self) -> anyhow::Result<()>;

    fn run(&mut self) -> anyhow::Result<()>;

    fn write_output(&self, writer: &mut dyn Write) -> anyhow::Result<()>;
}

/// Drives the three phases of a job
pub fn run_job(job: &mut dyn AnnotationJob, writer: &mut dyn Write) -> anyhow::Result<()> {
    let name = job.name().to_string();

    info!("{}: fetching input", name);
    job.fetch_input()
        .with_context(|| format!("{}: could not fetch input", name))?;

    info!("{}: running", name);
    job.run().with_context(|| format!("{}: run failed", name))?;

    info!("{}: writing output", name);
    job.write_output(writer)
        .with_context(|| format!("{}: could not write output", name))?;
    writer.flush()?;

    Ok(())
}

//----------------------------
// Processed pseudogenes
//----------------------------
pub struct PseudogeneJob<'a> {
    source: &'a dyn AlignmentSource,
    slicer: &'a dyn SequenceSlicer,
    classifier: PseudogeneClassifier,
    records: Vec<AlignmentRecord>,
    candidates: Vec<CandidatePseudogene>,
}

impl<'a> PseudogeneJob<'a> {
    pub fn new(
        source: &'a dyn AlignmentSource,
        slicer: &'a dyn SequenceSlicer,
        params: ClassifierParams,
    ) -> Self {
        Self {
            source,
            slicer,
            classifier: PseudogeneClassifier::new(params),
            records: vec![],
            candidates: vec![],
        }
    }

    pub fn records(&self) -> &[AlignmentRecord] {
        &self.records
    }

    pub fn candidates(&self) -> &[CandidatePseudogene] {
        &self.candidates
    }
}

impl AnnotationJob for PseudogeneJob<'_> {
    fn name(&self) -> &str {
        "pseudo"
    }

    fn fetch_input(&mut self) -> anyhow::Result<()> {
        self.records = self.source.alignments()?;
        info!("{} alignment records", self.records.len());
        Ok(())
    }

    fn run(&mut self) -> anyhow::Result<()> {
        self.candidates = self.classifier.run(&self.records, self.slicer)?;
        Ok(())
    }

    fn write_output(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        writer.write_fmt(format_args!(
            "{}\n",
            [
                "#gene",
                "source",
                "region",
                "start",
                "end",
                "strand",
                "rank",
                "coverage",
                "percent_id",
                "exons",
                "strand_corrected",
            ]
            .join("\t")
        ))?;

        for cand in &self.candidates {
            let gene = &cand.gene;
            let exons = gene
                .transcripts()
                .first()
                .map(|t| t.exons().len())
                .unwrap_or(0);
            writer.write_fmt(format_args!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}\t{}\n",
                gene.id(),
                cand.record.source_id(),
                gene.region(),
                gene.start(),
                gene.end(),
                gene.strand(),
                cand.rank,
                cand.record.coverage(),
                cand.record.percent_id(),
                exons,
                if cand.strand_corrected { "yes" } else { "no" },
            ))?;
        }
        Ok(())
    }
}

//----------------------------
// EST discrimination
//----------------------------
pub struct EstDiscriminationJob<'a> {
    clusterer: EvidenceClusterer<'a>,
}

impl<'a> EstDiscriminationJob<'a> {
    pub fn new(
        loci: Vec<Locus>,
        evidence: &'a dyn EvidenceSource,
        fetcher: &'a dyn SequenceFetcher,
        slicer: &'a dyn SequenceSlicer,
        params: ClustererParams,
    ) -> Self {
        Self {
            clusterer: EvidenceClusterer::new(loci, evidence, fetcher, slicer, params),
        }
    }

    pub fn clusterer(&self) -> &EvidenceClusterer<'a> {
        &self.clusterer
    }
}

impl AnnotationJob for EstDiscriminationJob<'_> {
    fn name(&self) -> &str {
        "est"
    }

    fn fetch_input(&mut self) -> anyhow::Result<()> {
        self.clusterer.discover_shared_evidence()
    }

    fn run(&mut self) -> anyhow::Result<()> {
        self.clusterer.cluster()
    }

    /// One line per (locus, EST) with the match kind and the loci the EST
    /// was assigned to
    fn write_output(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        writer.write_fmt(format_args!("#locus\tevidence\tmatch\tassigned_to\n"))?;

        for (locus, matches) in self.clusterer.all_matches() {
            let groups = [
                ("single", &matches.single),
                ("multiple", &matches.multiple),
                ("incorrect", &matches.incorrect),
            ];
            for (kind, set) in groups {
                for est in set {
                    let assigned = match self.clusterer.assignees(est) {
                        Some(list) => list.join(","),
                        None => locus.clone(),
                    };
                    writer.write_fmt(format_args!(
                        "{}\t{}\t{}\t{}\n",
                        locus, est, kind, assigned
                    ))?;
                }
            }
        }
        Ok(())
    }
}
