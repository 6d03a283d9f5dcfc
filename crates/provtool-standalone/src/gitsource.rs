//! Git-commit-driven single-file mode (§6.3 `standalone --repopath/--filepath`):
//! resolve the most recent commit that touched a file and turn its author
//! and commit time into provenance inputs, without any interactive prompts.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Repository, Sort, StatusOptions};
use std::path::Path;

use provtool_core::ProvtoolError;

/// Everything extracted from a file's most recent commit.
pub struct CommitProvenance {
    pub committed_at: DateTime<Utc>,
    pub commit_hex: String,
    pub author_given_name: String,
    pub author_family_name: String,
}

fn map_git(e: git2::Error) -> ProvtoolError {
    ProvtoolError::Other(format!("git error: {e}"))
}

/// Splits a commit author's display name the way the reference tool does:
/// first whitespace-delimited token is the given name, the rest (possibly
/// empty) is the family name.
fn split_author_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let given = parts.next().unwrap_or("Unknown").to_string();
    let family = parts.collect::<Vec<_>>().join(" ");
    (given, family)
}

/// Find the most recent commit that touched `file_path` (relative to the
/// repository root) and return its provenance. Fails if the working tree
/// has uncommitted changes — the reference tool refuses to proceed on a
/// dirty repository so that the commit it reports is unambiguously the
/// source of the file's current bytes.
pub fn last_commit_for_file(repo_path: &Path, file_path: &Path) -> Result<CommitProvenance, ProvtoolError> {
    let repo = Repository::discover(repo_path).map_err(map_git)?;

    let mut status_opts = StatusOptions::new();
    status_opts.include_untracked(false).include_ignored(false);
    let statuses = repo.statuses(Some(&mut status_opts)).map_err(map_git)?;
    if !statuses.is_empty() {
        return Err(ProvtoolError::Other(
            "repository is dirty. Please commit before using this tool".into(),
        ));
    }

    let mut revwalk = repo.revwalk().map_err(map_git)?;
    revwalk.push_head().map_err(map_git)?;
    revwalk.set_sorting(Sort::TIME).map_err(map_git)?;

    for oid in revwalk {
        let oid = oid.map_err(map_git)?;
        let commit = repo.find_commit(oid).map_err(map_git)?;
        let tree = commit.tree().map_err(map_git)?;

        let touches_file = if commit.parent_count() == 0 {
            tree.get_path(file_path).is_ok()
        } else {
            let parent_tree = commit.parent(0).map_err(map_git)?.tree().map_err(map_git)?;
            let diff = repo
                .diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)
                .map_err(map_git)?;
            diff.deltas()
                .any(|d| d.new_file().path() == Some(file_path) || d.old_file().path() == Some(file_path))
        };

        if !touches_file {
            continue;
        }

        let author = commit.author();
        let (given, family) = split_author_name(author.name().unwrap_or("Unknown"));
        let committed_at = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .ok_or_else(|| ProvtoolError::Other("commit has an invalid timestamp".into()))?;

        return Ok(CommitProvenance {
            committed_at,
            commit_hex: commit.id().to_string(),
            author_given_name: given,
            author_family_name: family,
        });
    }

    Err(ProvtoolError::Other(format!(
        "no commit touches {}",
        file_path.display()
    )))
}
