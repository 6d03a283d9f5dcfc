//! `standalone` (§6.3): create one container for one file, either from an
//! interactive Q&A session or from the most recent Git commit that touched
//! the file.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use provtool_model::AgentNode;
use provtool_standalone::{last_commit_for_file, write_prov_file, MemoStore, Session};

#[derive(Parser, Debug)]
#[command(name = "standalone", version, about = "Standalone single-file provenance container creation")]
struct Args {
    /// Path to a Git repository. Combined with `--filepath`, switches to
    /// Git-commit-driven mode instead of the interactive Q&A session.
    #[arg(long)]
    repopath: Option<PathBuf>,

    /// File (relative to `--repopath`) whose most recent commit provides
    /// the provenance inputs.
    #[arg(long)]
    filepath: Option<PathBuf>,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let written = match (&args.repopath, &args.filepath) {
        (Some(repopath), Some(filepath)) => {
            let commit = last_commit_for_file(repopath, filepath).context("resolving last commit")?;
            let agent = AgentNode::person(commit.author_given_name, commit.author_family_name, None);
            let activity_time = commit.committed_at.with_timezone(
                &chrono::FixedOffset::east_opt(0).expect("zero offset is always valid"),
            );
            let label = format!("Git commit {}", commit.commit_hex);
            let absolute = repopath.join(filepath);

            write_prov_file(&absolute, activity_time, "Unkown", &label, "-", vec![], &agent)
                .context("writing container from commit provenance")?
        }
        (None, None) => {
            let memo = MemoStore::open("provtool.db").context("opening input memoization store")?;
            let stdin = io::stdin().lock();
            let stdout = io::stdout();
            let mut session = Session::new(&memo, stdin, stdout.lock());
            let answers = session.run().context("running interactive session")?;

            write_prov_file(
                &answers.entity_path,
                answers.activity_time,
                &answers.location,
                &answers.label,
                &answers.means,
                answers.used,
                &answers.agent,
            )
            .context("writing container from interactive answers")?
        }
        _ => anyhow::bail!("--repopath and --filepath must be given together"),
    };

    info!(prov = %written.prov_path.display(), cid = %written.cid, "wrote container");
    println!("{}", written.prov_path.display());
    Ok(())
}

fn main() {
    provtool_cli::init_logging("standalone.log");
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
