use clap::*;
use gar::libs::discriminator::{ClustererParams, InMemoryEvidence};
use gar::libs::job::{read_loci, run_job, EstDiscriminationJob};
use gar::libs::seq::InMemoryGenome;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("est")
        .about("Assign ESTs shared by overlapping loci")
        .after_help(
            r###"
Each line of <loci.psl> is one transcript alignment and becomes a locus named
after its query. <est.psl> holds the EST alignments, <est.fa> their
sequences.

An EST aligned to a single locus (above EST_COVERAGE_CUTOFF) is a single
match. An EST aligned to several loci is compared with each of them in a
common alignment; it goes to the nearest loci, all loci within
DISTANCE_TWILIGHT of each other being kept.

Output columns:
    locus  evidence  match(single|multiple|incorrect)  assigned_to

Examples:
1. Informative sites only (default)
   gar est loci.psl est.psl est.fa -g genome.fa

2. Whole alignment, 90% EST coverage
   gar est loci.psl est.psl est.fa -g genome.fa --class nucleotide --cutoff 90

"###,
        )
        .arg(
            Arg::new("loci")
                .required(true)
                .index(1)
                .help("Transcript alignments in PSL format"),
        )
        .arg(
            Arg::new("est")
                .required(true)
                .index(2)
                .help("EST alignments in PSL format"),
        )
        .arg(
            Arg::new("est_seq")
                .required(true)
                .index(3)
                .help("EST sequences in FASTA format"),
        )
        .arg(super::arg_genome())
        .arg(super::arg_config())
        .arg(
            Arg::new("cutoff")
                .long("cutoff")
                .num_args(1)
                .help("EST_COVERAGE_CUTOFF, a fraction or a percentage"),
        )
        .arg(
            Arg::new("twilight")
                .long("twilight")
                .num_args(1)
                .help("DISTANCE_TWILIGHT"),
        )
        .arg(
            Arg::new("class")
                .long("class")
                .num_args(1)
                .value_parser(["informative", "nucleotide"])
                .help("DISTANCE_CLASS"),
        )
        .arg(
            Arg::new("biotype")
                .long("biotype")
                .num_args(1)
                .default_value("protein_coding")
                .help("Biotype of the loci"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let config = super::load_config(
        args,
        &[
            ("cutoff", "EST_COVERAGE_CUTOFF"),
            ("twilight", "DISTANCE_TWILIGHT"),
            ("class", "DISTANCE_CLASS"),
        ],
    )?;

    let loci = read_loci(
        args.get_one::<String>("loci").unwrap(),
        args.get_one::<String>("biotype").unwrap(),
    )?;
    let evidence = InMemoryEvidence::from_psl(args.get_one::<String>("est").unwrap())?;
    let est_seqs = InMemoryGenome::from_fasta(args.get_one::<String>("est_seq").unwrap())?;
    let genome = super::open_genome(args.get_one::<String>("genome").unwrap())?;
    let mut writer = gar::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Ops
    //----------------------------
    let mut job = EstDiscriminationJob::new(
        loci,
        &evidence,
        &est_seqs,
        genome.as_ref(),
        ClustererParams::from(&config),
    );
    run_job(&mut job, &mut writer)?;

    Ok(())
}
