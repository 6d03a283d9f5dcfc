//! `plain2prov` (§4.4): wrap a batch of plain files, produced by one
//! activity, into sibling `<cid>.prov` containers.

use std::path::{Path, PathBuf};

use provtool_core::constants::TIMESTAMP_FORMAT;
use provtool_core::hash::Sha256Digest;
use provtool_core::types::ProvTimestamp;
use provtool_core::{DataHash, ProvtoolError};
use provtool_model::{Activity, AgentNode, Entity, EntityType};

use crate::config::ActivityConfig;

/// One file this activity produced, and the container written for it.
pub struct WrappedFile {
    pub plain_path: PathBuf,
    pub prov_path: PathBuf,
    pub cid: String,
}

/// Everything `plain2prov` needs beyond the file list itself. Grouped into
/// one struct because every field is independently optional or has a
/// sensible caller-supplied value — a long positional argument list would
/// only hide which is which at call sites.
pub struct Plain2ProvRequest<'a> {
    pub files: &'a [PathBuf],
    pub activity: &'a ActivityConfig,
    pub agent: &'a AgentNode,
    pub used_set: Vec<String>,
    pub start: ProvTimestamp,
    pub end: Option<ProvTimestamp>,
    /// Forces the Activity's identity instead of deriving it from its
    /// attributes — lets several runs share one logical activity.
    pub activity_id: Option<String>,
    /// Emits a `wasStartedBy` record pointing at this parent activity id,
    /// referenced by id only (never expanded).
    pub started_by: Option<String>,
}

pub fn plain2prov(request: Plain2ProvRequest<'_>) -> Result<Vec<WrappedFile>, ProvtoolError> {
    let mut activity = Activity::new(
        request.start,
        request.end,
        &request.activity.location,
        &request.activity.label,
        &request.activity.means,
        request.used_set,
    );
    if let Some(parent) = &request.started_by {
        activity = activity.with_started_by(parent.clone());
    }
    if let Some(forced) = &request.activity_id {
        activity = activity.with_forced_id(forced.clone());
    }

    let mut wrapped = Vec::with_capacity(request.files.len());
    for file in request.files {
        let bytes = std::fs::read(file)?;
        let datahash = Sha256Digest::of(&bytes).to_hex();
        let label = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ProvtoolError::Other(format!("not a valid file name: {}", file.display())))?
            .to_string();

        let entity = Entity::new(label, EntityType::File, DataHash(datahash));
        let built =
            provtool_codec::ContainerBuilder::new(entity, activity.clone(), request.agent.clone()).build()?;

        let dir = file.parent().unwrap_or_else(|| Path::new("."));
        let prov_path = dir.join(format!("{}.prov", built.cid));
        std::fs::write(&prov_path, &built.container_bytes)?;

        wrapped.push(WrappedFile {
            plain_path: file.clone(),
            prov_path,
            cid: built.cid,
        });
    }
    Ok(wrapped)
}

/// Formats a timestamp the way the container codec does, for callers that
/// only have a `chrono` value and need to log it consistently.
pub fn format_timestamp(t: &ProvTimestamp) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::fs;

    fn t(s: &str) -> ProvTimestamp {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("provtool-dirwrap-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn wraps_each_file_with_a_shared_activity() {
        let dir = scratch_dir("plain2prov");
        let a = dir.join("a.txt");
        let b = dir.join("b.txt");
        fs::write(&a, b"hello").unwrap();
        fs::write(&b, b"world").unwrap();

        let activity_cfg = ActivityConfig {
            location: "loc".into(),
            label: "ingest".into(),
            means: "manual".into(),
        };
        let agent = AgentNode::person("Ada", "Lovelace", None);

        let result = plain2prov(Plain2ProvRequest {
            files: &[a.clone(), b.clone()],
            activity: &activity_cfg,
            agent: &agent,
            used_set: vec![],
            start: t("2026-01-01T00:00:00+0000"),
            end: None,
            activity_id: None,
            started_by: None,
        })
        .unwrap();

        assert_eq!(result.len(), 2);
        for wrapped in &result {
            assert!(wrapped.prov_path.is_file());
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn forced_activity_id_is_identical_across_independent_calls() {
        let dir = scratch_dir("forced-id");
        let a = dir.join("a.txt");
        fs::write(&a, b"hello").unwrap();

        let activity_cfg = ActivityConfig {
            location: "loc".into(),
            label: "ingest".into(),
            means: "manual".into(),
        };
        let agent = AgentNode::person("Ada", "Lovelace", None);

        let first = plain2prov(Plain2ProvRequest {
            files: &[a.clone()],
            activity: &activity_cfg,
            agent: &agent,
            used_set: vec![],
            start: t("2026-01-01T00:00:00+0000"),
            end: None,
            activity_id: Some("fixed-activity".into()),
            started_by: None,
        })
        .unwrap();
        let second = plain2prov(Plain2ProvRequest {
            files: &[a.clone()],
            activity: &activity_cfg,
            agent: &agent,
            used_set: vec![],
            start: t("2030-06-01T00:00:00+0000"),
            end: None,
            activity_id: Some("fixed-activity".into()),
            started_by: None,
        })
        .unwrap();

        assert_eq!(first[0].cid, second[0].cid);
        fs::remove_dir_all(&dir).unwrap();
    }
}
