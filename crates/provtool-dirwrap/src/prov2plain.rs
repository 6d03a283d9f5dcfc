//! `prov2plain` (§4.4): the inverse of `plain2prov` — unpack every container
//! under a directory back into plain files, collecting the set of container
//! ids a downstream activity should declare as `used`.

use std::collections::HashSet;
use std::path::Path;

use provtool_core::ProvtoolError;
use provtool_store::reader::resolve_payload_path;
use walkdir::WalkDir;

fn is_safe_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ' ' | '-'))
}

/// Unpack every `*.prov` file found under `input_dir` into a plain file
/// named by its entity's label, placed alongside the container. Returns the
/// set of container ids read — the `used` set a subsequent `plain2prov` run
/// over this directory's outputs should declare.
pub fn prov2plain(input_dir: &Path) -> Result<HashSet<String>, ProvtoolError> {
    let mut used = HashSet::new();

    for entry in WalkDir::new(input_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("prov") {
            continue;
        }

        let bytes = std::fs::read(entry.path())?;
        let parsed = provtool_codec::parse_container(&bytes)?;

        if !is_safe_label(&parsed.label) {
            return Err(ProvtoolError::UnsafeLabel { label: parsed.label });
        }

        let dir = entry.path().parent().unwrap_or(input_dir);
        let target = dir.join(&parsed.label);
        if target.exists() {
            return Err(ProvtoolError::TargetExists(target.display().to_string()));
        }

        let payload_path = resolve_payload_path(dir, &parsed.data_hash)
            .ok_or_else(|| ProvtoolError::MissingPayload(parsed.data_hash.clone()))?;
        let payload = std::fs::read(&payload_path)?;
        std::fs::write(&target, &payload)?;

        used.insert(parsed.cid);
    }

    Ok(used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActivityConfig;
    use crate::plain2prov::{plain2prov, Plain2ProvRequest};
    use chrono::DateTime;
    use provtool_core::constants::TIMESTAMP_FORMAT;
    use provtool_model::AgentNode;
    use std::fs;
    use std::path::PathBuf;

    fn t(s: &str) -> chrono::DateTime<chrono::FixedOffset> {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("provtool-dirwrap-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn round_trip_reproduces_original_content() {
        let dir = scratch_dir("roundtrip");
        let plain = dir.join("report.txt");
        fs::write(&plain, b"original contents").unwrap();

        let activity_cfg = ActivityConfig {
            location: "loc".into(),
            label: "ingest".into(),
            means: "manual".into(),
        };
        let agent = AgentNode::person("Ada", "Lovelace", None);
        plain2prov(Plain2ProvRequest {
            files: &[plain.clone()],
            activity: &activity_cfg,
            agent: &agent,
            used_set: vec![],
            start: t("2026-01-01T00:00:00+0000"),
            end: None,
            activity_id: None,
            started_by: None,
        })
        .unwrap();

        let rebuild = scratch_dir("roundtrip-out");
        // Copy only the .prov file and the (self-identifying) plain payload
        // into a fresh directory to simulate a clean unpack target.
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            fs::copy(entry.path(), rebuild.join(entry.file_name())).unwrap();
        }
        fs::remove_file(rebuild.join("report.txt")).unwrap();

        let used = prov2plain(&rebuild).unwrap();
        assert_eq!(used.len(), 1);
        let rebuilt_contents = fs::read(rebuild.join("report.txt")).unwrap();
        assert_eq!(rebuilt_contents, b"original contents");

        fs::remove_dir_all(&dir).unwrap();
        fs::remove_dir_all(&rebuild).unwrap();
    }

    #[test]
    fn refuses_to_overwrite_existing_target() {
        let dir = scratch_dir("target-exists");
        let plain = dir.join("report.txt");
        fs::write(&plain, b"original contents").unwrap();

        let activity_cfg = ActivityConfig {
            location: "loc".into(),
            label: "ingest".into(),
            means: "manual".into(),
        };
        let agent = AgentNode::person("Ada", "Lovelace", None);
        plain2prov(Plain2ProvRequest {
            files: &[plain.clone()],
            activity: &activity_cfg,
            agent: &agent,
            used_set: vec![],
            start: t("2026-01-01T00:00:00+0000"),
            end: None,
            activity_id: None,
            started_by: None,
        })
        .unwrap();

        // report.txt already exists in `dir` itself, so unpacking in place must fail.
        let err = prov2plain(&dir);
        assert!(matches!(err, Err(ProvtoolError::TargetExists(_))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unsafe_label_is_rejected() {
        assert!(is_safe_label("report-final_v2.txt"));
        assert!(!is_safe_label("../escape.txt"));
        assert!(!is_safe_label("report*.txt"));
    }
}
