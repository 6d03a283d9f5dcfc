//! Pairwise set-merge of two container directories (§4.6 step 4): an outer
//! join on `(provenance_hash, data_hash)`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use provtool_core::ProvtoolError;
use provtool_store::reader::resolve_payload_path;
use tracing::warn;
use walkdir::WalkDir;

use crate::normalize::{data_hash, provenance_hash, PayloadRewrite};

/// One row of a comparison report. `matching` rows have both sides
/// populated; the rest are diffs present on exactly one side.
#[derive(Clone, Debug)]
pub struct ComparisonRow {
    pub provenance_hash: String,
    pub data_hash: String,
    pub left_path: Option<PathBuf>,
    pub right_path: Option<PathBuf>,
    pub matching: bool,
    /// False if schema validation failed for the container at this key —
    /// the row still participates in the join (§4.6 step 1: "flag
    /// `validcontainer=false` ... but continue").
    pub valid_container: bool,
}

struct Keyed {
    path: PathBuf,
    provenance_hash: String,
    data_hash: String,
    valid_container: bool,
}

fn collect_dir(dir: &Path, rewrite: Option<PayloadRewrite>) -> Vec<Keyed> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("prov") {
            continue;
        }
        let path = entry.path().to_path_buf();
        let Ok(bytes) = std::fs::read(&path) else {
            warn!(path = %path.display(), "could not read container during comparison");
            continue;
        };
        let document: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "container is not valid JSON, skipping");
                continue;
            }
        };
        let valid_container = provtool_schema::validate_container(&document).is_ok();

        let prov_hash = match provenance_hash(&document) {
            Ok(h) => h,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "container could not be normalized, skipping");
                continue;
            }
        };

        let data_hash_value = match provtool_codec_datahash(&document, &path, rewrite) {
            Some(h) => h,
            None => {
                warn!(path = %path.display(), "payload could not be located, skipping");
                continue;
            }
        };

        out.push(Keyed {
            path,
            provenance_hash: prov_hash,
            data_hash: data_hash_value,
            valid_container,
        });
    }
    out
}

/// Resolve and hash the payload the container claims, outside of
/// `provtool-codec` directly: we only need `provtool:datahash` and the
/// sibling-file lookup, both already exposed by `provtool-store`.
fn provtool_codec_datahash(
    document: &serde_json::Value,
    prov_path: &Path,
    rewrite: Option<PayloadRewrite>,
) -> Option<String> {
    let entity_map = document.get("entity")?.as_object()?;
    let (_id, attrs) = entity_map.iter().next()?;
    let datahash = attrs.get("provtool:datahash")?.as_str()?;
    let dir = prov_path.parent()?;
    let payload_path = resolve_payload_path(dir, datahash)?;
    let payload = std::fs::read(payload_path).ok()?;
    Some(data_hash(&payload, rewrite))
}

/// Compare every container under `left_dir` against every container under
/// `right_dir`.
pub fn dircompare(
    left_dir: &Path,
    right_dir: &Path,
    rewrite: Option<PayloadRewrite>,
) -> Result<Vec<ComparisonRow>, ProvtoolError> {
    let left = collect_dir(left_dir, rewrite);
    let right = collect_dir(right_dir, rewrite);

    let mut left_by_key: HashMap<(String, String), Vec<&Keyed>> = HashMap::new();
    for k in &left {
        left_by_key
            .entry((k.provenance_hash.clone(), k.data_hash.clone()))
            .or_default()
            .push(k);
    }
    let mut right_by_key: HashMap<(String, String), Vec<&Keyed>> = HashMap::new();
    for k in &right {
        right_by_key
            .entry((k.provenance_hash.clone(), k.data_hash.clone()))
            .or_default()
            .push(k);
    }

    let mut keys: Vec<(String, String)> = left_by_key.keys().chain(right_by_key.keys()).cloned().collect();
    keys.sort();
    keys.dedup();

    let mut rows = Vec::new();
    for key in keys {
        let lefts = left_by_key.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let rights = right_by_key.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let pairs = lefts.len().max(rights.len());
        for i in 0..pairs {
            let l = lefts.get(i);
            let r = rights.get(i);
            let valid_container = l.map(|x| x.valid_container).unwrap_or(true) && r.map(|x| x.valid_container).unwrap_or(true);
            rows.push(ComparisonRow {
                provenance_hash: key.0.clone(),
                data_hash: key.1.clone(),
                left_path: l.map(|x| x.path.clone()),
                right_path: r.map(|x| x.path.clone()),
                matching: l.is_some() && r.is_some(),
                valid_container,
            });
        }
    }
    Ok(rows)
}
