//! Store / Reader interface (§4.3): a pluggable resolver from
//! `(directory, container-id) -> (raw_prov_bytes, payload_bytes)`.
//!
//! Readers are discovered at process start — never via environment-wide
//! scanning (§9 Design Notes) — and registered in the order the caller
//! wants them tried. The registry iterates them and treats the first
//! non-error response as authoritative: container integrity is
//! self-verifying (both the `.prov` filename and the payload's hash are
//! checked), so there is no trust placed in the reader itself.

use std::path::{Path, PathBuf};

use provtool_core::hash::Sha256Digest;
use provtool_core::ProvtoolError;
use walkdir::WalkDir;

/// Options passed to a reader. Currently just the search root, but kept as
/// a struct so a future reader (e.g. a networked one) can carry its own
/// fields without changing the trait signature.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    pub root: PathBuf,
}

impl ReadOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// A resolved container: its container-form bytes plus its payload bytes.
pub struct Resolved {
    pub raw_prov: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Capability every reader implements. `name()` is how it's keyed in the
/// registry (§9: "a plugin registry keyed by a name such as `file`").
pub trait Reader: Send + Sync {
    fn name(&self) -> &str;

    fn read(&self, opts: &ReadOptions, cid: &str) -> Result<Resolved, ProvtoolError>;

    /// Label search: absolute paths of every `*.prov` file under `opts.root`
    /// whose entity `prov:label` matches `query`.
    fn search(&self, opts: &ReadOptions, query: &str) -> Result<Vec<PathBuf>, ProvtoolError>;
}

/// The default, file-system-backed reader (§4.3 steps 1-5).
pub struct FileReader;

impl FileReader {
    fn find_prov_file(root: &Path, cid: &str) -> Option<PathBuf> {
        let want = format!("{cid}.prov");
        WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .find(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == want)
            .map(|e| e.path().to_path_buf())
    }

    /// Scan every sibling file in `dir` for one whose SHA-256 matches
    /// `datahash`. Used as the fallback when the named payload file is
    /// missing (§4.3 step 5).
    fn scan_for_datahash(dir: &Path, datahash: &str) -> Option<PathBuf> {
        resolve_payload_path(dir, datahash)
    }
}

/// Locate a payload by datahash in `dir`: first the file literally named
/// `<datahash>`, then (§4.3 step 5) any sibling whose SHA-256 matches.
/// Exposed for other components (the Comparator, the Directory Wrapper)
/// that need the same fallback without going through a full `Reader`.
pub fn resolve_payload_path(dir: &Path, datahash: &str) -> Option<PathBuf> {
    let named = dir.join(datahash);
    if named.is_file() {
        return Some(named);
    }
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Ok(bytes) = std::fs::read(&path) {
            if Sha256Digest::of(&bytes).to_hex() == datahash {
                return Some(path);
            }
        }
    }
    None
}

impl Reader for FileReader {
    fn name(&self) -> &str {
        "file"
    }

    fn read(&self, opts: &ReadOptions, cid: &str) -> Result<Resolved, ProvtoolError> {
        let prov_path = Self::find_prov_file(&opts.root, cid)
            .ok_or_else(|| ProvtoolError::MissingContainer(cid.to_string()))?;

        let raw_prov = std::fs::read(&prov_path)?;
        let actual = Sha256Digest::of(&raw_prov).to_hex();
        if actual != cid {
            return Err(ProvtoolError::HashMismatch {
                expected: cid.to_string(),
                got: actual,
            });
        }

        let parsed = provtool_codec::parse_container(&raw_prov)?;
        let dir = prov_path.parent().unwrap_or(&opts.root);
        let named_payload_path = dir.join(&parsed.data_hash);

        let payload_path = if named_payload_path.is_file() {
            named_payload_path
        } else {
            Self::scan_for_datahash(dir, &parsed.data_hash)
                .ok_or_else(|| ProvtoolError::MissingPayload(parsed.data_hash.clone()))?
        };

        let payload = std::fs::read(&payload_path)?;
        let payload_hash = Sha256Digest::of(&payload).to_hex();
        if payload_hash != parsed.data_hash {
            return Err(ProvtoolError::HashMismatch {
                expected: parsed.data_hash.clone(),
                got: payload_hash,
            });
        }

        Ok(Resolved { raw_prov, payload })
    }

    fn search(&self, opts: &ReadOptions, query: &str) -> Result<Vec<PathBuf>, ProvtoolError> {
        let mut matches = Vec::new();
        for entry in WalkDir::new(&opts.root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("prov") {
                continue;
            }
            let Ok(bytes) = std::fs::read(entry.path()) else {
                continue;
            };
            let Ok(parsed) = provtool_codec::parse_container(&bytes) else {
                continue;
            };
            if parsed.label.contains(query) {
                if let Ok(abs) = entry.path().canonicalize() {
                    matches.push(abs);
                } else {
                    matches.push(entry.path().to_path_buf());
                }
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use provtool_core::constants::TIMESTAMP_FORMAT;
    use provtool_core::DataHash;
    use provtool_model::{Activity, AgentNode, Entity, EntityType};
    use std::fs;

    fn t(s: &str) -> chrono::DateTime<chrono::FixedOffset> {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn write_container(dir: &Path, label: &str, payload: &[u8]) -> String {
        let datahash = Sha256Digest::of(payload).to_hex();
        fs::write(dir.join(&datahash), payload).unwrap();

        let entity = Entity::new(label, EntityType::File, DataHash(datahash));
        let activity = Activity::new(t("2026-01-01T00:00:00+0000"), None, "loc", "label", "means", vec![]);
        let agent = AgentNode::person("Ada", "Lovelace", None);
        let built = provtool_codec::ContainerBuilder::new(entity, activity, agent).build().unwrap();
        fs::write(dir.join(format!("{}.prov", built.cid)), &built.container_bytes).unwrap();
        built.cid
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("provtool-store-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_container_and_payload() {
        let dir = scratch_dir("read-ok");
        let cid = write_container(&dir, "a.txt", b"hello");
        let reader = FileReader;
        let opts = ReadOptions::new(&dir);
        let resolved = reader.read(&opts, &cid).unwrap();
        assert_eq!(resolved.payload, b"hello");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn falls_back_to_directory_scan_when_named_payload_missing() {
        let dir = scratch_dir("fallback");
        let cid = write_container(&dir, "a.txt", b"hello");
        let datahash = Sha256Digest::of(b"hello").to_hex();
        let named = dir.join(&datahash);
        let renamed = dir.join("renamed-payload");
        fs::rename(&named, &renamed).unwrap();

        let reader = FileReader;
        let opts = ReadOptions::new(&dir);
        let resolved = reader.read(&opts, &cid).unwrap();
        assert_eq!(resolved.payload, b"hello");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_container_is_reported() {
        let dir = scratch_dir("missing");
        let reader = FileReader;
        let opts = ReadOptions::new(&dir);
        let err = reader.read(&opts, "deadbeef");
        assert!(matches!(err, Err(ProvtoolError::MissingContainer(_))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn tampered_prov_file_fails_hash_check() {
        let dir = scratch_dir("tampered");
        let cid = write_container(&dir, "a.txt", b"hello");
        let prov_path = dir.join(format!("{cid}.prov"));
        let mut bytes = fs::read(&prov_path).unwrap();
        bytes.push(b' ');
        fs::write(&prov_path, bytes).unwrap();

        let reader = FileReader;
        let opts = ReadOptions::new(&dir);
        let err = reader.read(&opts, &cid);
        assert!(matches!(err, Err(ProvtoolError::HashMismatch { .. })));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn label_search_matches_by_substring() {
        let dir = scratch_dir("search");
        write_container(&dir, "report-final.pdf", b"one");
        write_container(&dir, "dataset.csv", b"two");

        let reader = FileReader;
        let opts = ReadOptions::new(&dir);
        let hits = reader.search(&opts, "report").unwrap();
        assert_eq!(hits.len(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }
}
