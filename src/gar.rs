extern crate clap;
use clap::*;

mod cmd_gar;

fn main() -> anyhow::Result<()> {
    let app = Command::new("gar")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`gar` - Genome Annotation Refiner")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug messages"),
        )
        .subcommand(cmd_gar::pseudo::make_subcommand())
        .subcommand(cmd_gar::est::make_subcommand())
        .after_help(
            r###"Subcommands:

* pseudo - Flag processed pseudogenes among spliced alignments
* est    - Assign ESTs shared by overlapping loci

Logging goes to stderr; RUST_LOG overrides the level set by -v.

"###,
        );

    let matches = app.get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        Some(("pseudo", sub_matches)) => cmd_gar::pseudo::execute(sub_matches),
        Some(("est", sub_matches)) => cmd_gar::est::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
