//! Processed pseudogene detection.
//!
//! Alignments of one source sequence are ranked; an unspliced alignment
//! scoring close to a spliced best alignment of the same source is the
//! signature of a retrotransposed, intron-less copy.
//!
//! * [`classify`] - ranking, the coverage/identity gate, gene models.
//! * [`splice`] - strand sanity check from intron dinucleotides.

pub mod classify;
pub mod splice;

pub use classify::{
    compare_records, group_by_source, CandidatePseudogene, ClassifierParams, PseudogeneClassifier,
    PSEUDOGENE_BIOTYPE,
};
pub use splice::{correct_strand, SpliceClass, SpliceTally};
