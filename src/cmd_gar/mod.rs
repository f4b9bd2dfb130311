//! Subcommand modules for the `gar` binary.

pub mod est;
pub mod pseudo;

use clap::{Arg, ArgMatches};
use gar::libs::config::Config;
use gar::libs::seq::{InMemoryGenome, SequenceSlicer};
use gar::libs::twobit::TwoBitFile;

pub fn arg_config() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .num_args(1)
        .help("Config file of KEY VALUE lines")
}

pub fn arg_genome() -> Arg {
    Arg::new("genome")
        .long("genome")
        .short('g')
        .required(true)
        .num_args(1)
        .help("Genome sequences, .2bit or (gzipped) FASTA")
}

pub fn arg_outfile() -> Arg {
    Arg::new("outfile")
        .long("outfile")
        .short('o')
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}

/// The config file if given, then every `(arg id, KEY)` override present on
/// the command line
pub fn load_config(args: &ArgMatches, overrides: &[(&str, &str)]) -> anyhow::Result<Config> {
    let mut config = match args.get_one::<String>("config") {
        Some(file) => Config::from_file(file)?,
        None => Config::default(),
    };
    for (id, key) in overrides {
        if let Some(value) = args.get_one::<String>(id) {
            config.set(key, value)?;
        }
    }
    config.validate()?;
    Ok(config)
}

pub fn open_genome(path: &str) -> anyhow::Result<Box<dyn SequenceSlicer>> {
    if path.ends_with(".2bit") {
        Ok(Box::new(TwoBitFile::open(path)?))
    } else {
        Ok(Box::new(InMemoryGenome::from_fasta(path)?))
    }
}
