//! `validator` (§6.3): recursively verify a provenance chain and render a
//! report to `.html` or `.csv`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use provtool_store::{ReadOptions, ReaderRegistry};
use provtool_validator::check::Validator;
use provtool_validator::writer::{write_report, ReportFormat};

#[derive(Parser, Debug)]
#[command(name = "validator", version, about = "Provenance chain validator")]
struct Args {
    /// Directory containing provenance containers in file form.
    #[arg(long)]
    filelocation: Option<PathBuf>,

    /// Hash of the container whose provenance chain should be validated.
    #[arg(long)]
    target: String,

    /// File the validation report is written to; must end in .html or .csv.
    #[arg(long)]
    reportfile: PathBuf,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    if ReportFormat::from_path(&args.reportfile).is_none() {
        eprintln!("Invalid reportfile. Please specify a file ending with .html or .csv");
        std::process::exit(2);
    }

    let registry = ReaderRegistry::default_registry();
    let opts = ReadOptions::new(args.filelocation.unwrap_or_else(|| PathBuf::from(".")));
    let validator = Validator::new(&registry, opts);
    let report = validator.check(&args.target);

    write_report(&report, &args.reportfile).context("writing validation report")?;
    Ok(())
}

fn main() {
    provtool_cli::init_logging("Validator.log");
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
