//! Single-file container creation: the common tail of both standalone entry
//! points (interactive and Git-commit-driven). Builds one container for one
//! plain file, writes it and its payload alongside the source file, and
//! appends a line to `provtool_filemapping.txt` (§6.4).

use std::fs;
use std::path::{Path, PathBuf};

use provtool_core::hash::sha256_hex;
use provtool_core::types::ProvTimestamp;
use provtool_core::{DataHash, ProvtoolError};
use provtool_model::{Activity, AgentNode, Entity, EntityType};

pub struct WrittenContainer {
    pub prov_path: PathBuf,
    pub payload_path: PathBuf,
    pub cid: String,
}

/// Build and persist a container for `entity_path`. Mirrors the reference
/// tool's `write_prov_file`: the activity's `end_time` is set equal to
/// `start_time` (a standalone conversion is treated as instantaneous), and
/// the container, its payload, and a mapping-file line all land next to
/// the source file.
pub fn write_prov_file(
    entity_path: &Path,
    activity_time: ProvTimestamp,
    location: &str,
    label: &str,
    means: &str,
    used: Vec<String>,
    agent: &AgentNode,
) -> Result<WrittenContainer, ProvtoolError> {
    let bytes = fs::read(entity_path)?;
    let datahash = sha256_hex(&bytes);

    let filename = entity_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ProvtoolError::Other(format!("not a valid file name: {}", entity_path.display())))?
        .to_string();

    let entity = Entity::new(filename, EntityType::File, DataHash(datahash.clone()));
    let activity = Activity::new(activity_time, Some(activity_time), location, label, means, used);
    let built = provtool_codec::ContainerBuilder::new(entity, activity, agent.clone()).build()?;

    let dir = entity_path.parent().unwrap_or_else(|| Path::new("."));
    let prov_path = dir.join(format!("{}.prov", built.cid));
    fs::write(&prov_path, &built.container_bytes)?;

    let payload_path = dir.join(&datahash);
    fs::write(&payload_path, &bytes)?;

    let mapping_line = format!(
        "{}={}\n",
        entity_path.display(),
        prov_path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    );
    append_mapping(dir, &mapping_line)?;

    Ok(WrittenContainer {
        prov_path,
        payload_path,
        cid: built.cid,
    })
}

fn append_mapping(dir: &Path, line: &str) -> Result<(), ProvtoolError> {
    use std::io::Write;
    let path = dir.join("provtool_filemapping.txt");
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use provtool_core::constants::TIMESTAMP_FORMAT;
    use std::path::PathBuf;

    fn t(s: &str) -> ProvTimestamp {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("provtool-standalone-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_container_payload_and_mapping_line() {
        let dir = scratch_dir("writer");
        let file = dir.join("report.txt");
        fs::write(&file, b"contents").unwrap();

        let agent = AgentNode::person("Ada", "Lovelace", None);
        let written = write_prov_file(
            &file,
            t("2026-01-01T00:00:00+0000"),
            "lab",
            "manual entry",
            "-",
            vec![],
            &agent,
        )
        .unwrap();

        assert!(written.prov_path.is_file());
        assert!(written.payload_path.is_file());
        let mapping = fs::read_to_string(dir.join("provtool_filemapping.txt")).unwrap();
        assert!(mapping.contains("report.txt="));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn end_time_equals_start_time() {
        let dir = scratch_dir("writer-end-time");
        let file = dir.join("a.txt");
        fs::write(&file, b"x").unwrap();

        let agent = AgentNode::person("Ada", "Lovelace", None);
        let written = write_prov_file(&file, t("2026-01-01T00:00:00+0000"), "lab", "label", "-", vec![], &agent)
            .unwrap();

        let bytes = fs::read(&written.prov_path).unwrap();
        let parsed = provtool_codec::parse_container(&bytes).unwrap();
        assert_eq!(parsed.end_time.as_deref(), Some("2026-01-01T00:00:00+0000"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
