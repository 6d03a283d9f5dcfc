//! `search` (§6.3): find provenance containers by entity label.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use provtool_store::{ReadOptions, ReaderRegistry};

#[derive(Parser, Debug)]
#[command(name = "search", version, about = "Search prov files by entity name")]
struct Args {
    /// The entity name (label) to search for.
    #[arg(long)]
    entityname: String,

    /// The directory to search, recursively.
    #[arg(long)]
    searchdir: PathBuf,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let registry = ReaderRegistry::default_registry();
    let opts = ReadOptions::new(&args.searchdir);
    let hits = registry.search(&opts, &args.entityname).context("searching directory")?;

    for hit in hits {
        println!("{}", hit.display());
    }
    Ok(())
}

fn main() {
    provtool_cli::init_logging("search.log");
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
