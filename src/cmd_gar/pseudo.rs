use clap::*;
use gar::libs::job::{run_job, PseudogeneJob, PslAlignmentSource};
use gar::libs::pseudogene::ClassifierParams;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("pseudo")
        .about("Flag processed pseudogenes among spliced alignments")
        .after_help(
            r###"
Alignments are grouped by query. Within a group they are ranked by coverage,
block count and identity; an unspliced alignment ranked below a spliced best
alignment is a processed pseudogene candidate when it passes the
coverage/identity thresholds.

Coverage and identity of a PSL line are its query coverage and identity, in
percent.

Output columns:
    gene  source  region  start  end  strand  rank  coverage  percent_id
    exons  strand_corrected

Examples:
1. Default thresholds
   gar pseudo hits.psl -g genome.fa

2. Keep candidates within 2% of the best score
   gar pseudo hits.psl -g genome.2bit --permissive -o candidates.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Spliced alignments in PSL format"),
        )
        .arg(super::arg_genome())
        .arg(super::arg_config())
        .arg(
            Arg::new("min_coverage")
                .long("min-coverage")
                .num_args(1)
                .help("MIN_COVERAGE, in percent"),
        )
        .arg(
            Arg::new("min_percent_id")
                .long("min-pid")
                .num_args(1)
                .help("MIN_PERCENT_ID, in percent"),
        )
        .arg(
            Arg::new("permissive")
                .long("permissive")
                .action(ArgAction::SetTrue)
                .help("Set BEST_IN_GENOME to 0"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut config = super::load_config(
        args,
        &[
            ("min_coverage", "MIN_COVERAGE"),
            ("min_percent_id", "MIN_PERCENT_ID"),
        ],
    )?;
    if args.get_flag("permissive") {
        config.best_in_genome = false;
    }

    let infile = args.get_one::<String>("infile").unwrap();
    let genome = super::open_genome(args.get_one::<String>("genome").unwrap())?;
    let mut writer = gar::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Ops
    //----------------------------
    let source = PslAlignmentSource::new(infile);
    let mut job = PseudogeneJob::new(&source, genome.as_ref(), ClassifierParams::from(&config));
    run_job(&mut job, &mut writer)?;

    Ok(())
}
