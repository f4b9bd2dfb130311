//! `gar` - Genome Annotation Refiner
//!
//! Post-processing of genome alignments: processed-pseudogene detection and
//! assignment of shared EST evidence to the locus it most likely came from.

pub mod libs;

pub use libs::io::{reader, writer};
