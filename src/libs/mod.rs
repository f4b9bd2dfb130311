pub mod config;
pub mod discriminator;
pub mod distance;
pub mod error;
pub mod io;
pub mod job;
pub mod locus;
pub mod msa;
pub mod psl;
pub mod pseudogene;
pub mod record;
pub mod seq;
pub mod twobit;
