//! Discrimination of EST evidence between overlapping loci.
//!
//! * [`source`] - where the EST alignments come from.
//! * [`project`] - ESTs placed on transcripts, and two loci in one frame.
//! * [`assign`] - twilight-zone assignment of an EST to loci.
//! * [`clusterer`] - the staged driver over all loci.

pub mod assign;
pub mod clusterer;
pub mod project;
pub mod source;

pub use assign::{assign_evidence, classify_matches, MatchKind};
pub use clusterer::{ClustererParams, EvidenceClusterer, LocusMatches, Stage};
pub use project::{common_frame, project_evidence};
pub use source::{EvidenceSource, InMemoryEvidence};
