//! `directorywrapper` (§6.3): wrap a non-provenance-aware tool's output
//! directory into containers, or unpack an input directory of containers
//! back into plain files, given a static activity/agent configuration.

use std::path::PathBuf;

use anyhow::Context;
use chrono::DateTime;
use clap::Parser;
use tracing::info;

use provtool_core::constants::TIMESTAMP_FORMAT;
use provtool_core::hash::Sha256Digest;
use provtool_core::ProvtoolError;
use provtool_dirwrap::config::{load_agentinfo, load_config, resolve_agent_chain};
use provtool_dirwrap::plain2prov::{plain2prov, Plain2ProvRequest};
use provtool_dirwrap::prov2plain::prov2plain;

/// Generates a fresh activity id: 16 random bytes, hex-encoded. Mirrors the
/// reference tool's `--createactivityid` mode, which hands back a random
/// identifier suitable for `--activityid`/`--startedby` on a later run.
fn generate_activity_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Parser, Debug)]
#[command(name = "directorywrapper", version, about = "Provenance directory wrapper")]
struct Args {
    /// Static information about the used activity and agents.
    #[arg(long)]
    configfile: Option<PathBuf>,

    /// Optional additional per-invocation agent information.
    #[arg(long)]
    agentinfo: Option<PathBuf>,

    /// Start the program in activity id generation mode; no wrapping occurs.
    #[arg(long, default_value_t = false)]
    createactivityid: bool,

    /// Activity id of an overall workflow that started this one.
    #[arg(long)]
    startedby: Option<String>,

    /// Activity id to use instead of a derived one.
    #[arg(long)]
    activityid: Option<String>,

    #[arg(long)]
    inputdir: Option<PathBuf>,

    #[arg(long)]
    outputdir: Option<PathBuf>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,
}

fn parse_timestamp(s: &str) -> Result<provtool_core::types::ProvTimestamp, ProvtoolError> {
    DateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| ProvtoolError::Other(format!("invalid timestamp {s:?}: {e}")))
}

/// Re-reads every `.prov` file directly under `dir`, verifying its filename
/// matches its own content hash, and returns the set of container ids to
/// declare as `used`. Mirrors `run_out`'s input-collection step.
fn collect_used(dir: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let mut used = Vec::new();
    for entry in walkdir::WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("prov") {
            continue;
        }
        let bytes = std::fs::read(entry.path())?;
        let expected = entry
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let actual = Sha256Digest::of(&bytes).to_hex();
        if actual != expected {
            anyhow::bail!(
                "hash does not match file name for {}: expected {expected}, got {actual}",
                entry.path().display()
            );
        }
        used.push(actual);
    }
    Ok(used)
}

/// Every plain file directly produced by this activity, i.e. every file
/// under `dir`.
fn collect_output_files(dir: &std::path::Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.createactivityid {
        println!("{}", generate_activity_id());
        return Ok(());
    }

    if let (Some(inputdir), None) = (&args.inputdir, &args.outputdir) {
        info!(dir = %inputdir.display(), "unpacking provenance containers into plain files");
        let used = prov2plain(inputdir).context("unpacking input directory")?;
        info!(count = used.len(), "unpacked containers");
        return Ok(());
    }

    if let (Some(outputdir), Some(start), Some(end), Some(configfile)) =
        (&args.outputdir, &args.start, &args.end, &args.configfile)
    {
        let config = load_config(configfile).context("loading configuration")?;
        let agentinfo = args
            .agentinfo
            .as_deref()
            .map(load_agentinfo)
            .transpose()
            .context("loading agent info")?;
        let agent = resolve_agent_chain(Some(&config), agentinfo.as_ref()).context("resolving agent chain")?;

        let used_set = match &args.inputdir {
            Some(inputdir) => collect_used(inputdir)?,
            None => Vec::new(),
        };
        let files = collect_output_files(outputdir);

        plain2prov(Plain2ProvRequest {
            files: &files,
            activity: &config.activity,
            agent: &agent,
            used_set,
            start: parse_timestamp(start)?,
            end: Some(parse_timestamp(end)?),
            activity_id: args.activityid.clone(),
            started_by: args.startedby.clone(),
        })
        .context("wrapping output directory")?;

        info!(dir = %outputdir.display(), count = files.len(), "wrapped output files");
        return Ok(());
    }

    anyhow::bail!(
        "invalid arguments: need either --inputdir alone, or --outputdir/--start/--end/--configfile together"
    );
}

fn main() {
    provtool_cli::init_logging("DirectoryWrapper.log");
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
