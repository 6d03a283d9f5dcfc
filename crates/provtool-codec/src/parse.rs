//! Reading a container back off disk into a typed, queryable view. Every
//! other component (Store, Validator, Comparator, Directory Wrapper) parses
//! through this module rather than poking at raw `serde_json::Value`.

use provtool_core::ProvtoolError;
use serde_json::Value;

/// A parsed container: just enough structure for the rest of the system to
/// work with, without committing to a full typed round-trip of every
/// freeform `additional_props` key an Activity might carry.
#[derive(Clone, Debug)]
pub struct ParsedContainer {
    pub cid: String,
    pub label: String,
    pub data_hash: String,
    pub activity_id: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub activity_label: String,
    pub used_entity_ids: Vec<String>,
    pub started_by: Option<String>,
    pub has_signature: bool,
    pub document: Value,
}

fn str_field<'a>(obj: &'a Value, field: &str) -> Result<&'a str, ProvtoolError> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ProvtoolError::InvalidSchema(format!("missing field {field:?}")))
}

/// Parse container bytes (already known to be in container form, i.e. the
/// entity is keyed by its own hash rather than `"self"`).
pub fn parse_container(bytes: &[u8]) -> Result<ParsedContainer, ProvtoolError> {
    let document: Value = serde_json::from_slice(bytes)?;

    let entity_map = document
        .get("entity")
        .and_then(Value::as_object)
        .ok_or_else(|| ProvtoolError::InvalidSchema("missing entity map".into()))?;
    let (cid, entity_attrs) = entity_map
        .iter()
        .next()
        .ok_or_else(|| ProvtoolError::InvalidSchema("entity map is empty".into()))?;

    let label = str_field(entity_attrs, "prov:label")?.to_string();
    let data_hash = str_field(entity_attrs, "provtool:datahash")?.to_string();

    let activity_map = document
        .get("activity")
        .and_then(Value::as_object)
        .ok_or_else(|| ProvtoolError::InvalidSchema("missing activity map".into()))?;
    let (activity_id, activity_attrs) = activity_map
        .iter()
        .next()
        .ok_or_else(|| ProvtoolError::InvalidSchema("activity map is empty".into()))?;

    let start_time = str_field(activity_attrs, "prov:startTime")?.to_string();
    let end_time = activity_attrs
        .get("prov:endTime")
        .and_then(Value::as_str)
        .map(str::to_string);
    let activity_label = str_field(activity_attrs, "prov:label")?.to_string();

    let mut used_entity_ids = Vec::new();
    if let Some(used_map) = document.get("used").and_then(Value::as_object) {
        for record in used_map.values() {
            if let Some(eid) = record.get("prov:entity").and_then(Value::as_str) {
                used_entity_ids.push(eid.to_string());
            }
        }
    }
    used_entity_ids.sort();
    used_entity_ids.dedup();

    let started_by = document
        .get("wasStartedBy")
        .and_then(Value::as_object)
        .and_then(|m| m.values().next())
        .and_then(|r| r.get("prov:starter"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let has_signature = document.get("signature").is_some();

    Ok(ParsedContainer {
        cid: cid.clone(),
        label,
        data_hash,
        activity_id: activity_id.clone(),
        start_time,
        end_time,
        activity_label,
        used_entity_ids,
        started_by,
        has_signature,
        document,
    })
}

/// Strip the `signature` field (if present) and return the canonical bytes
/// of what remains. Used both to compute the sign-hash a PSS signature
/// covers and to verify previously-signed containers (§4.8).
pub fn sign_hash_bytes(document: &Value) -> Result<Vec<u8>, ProvtoolError> {
    let mut doc = document.clone();
    if let Value::Object(map) = &mut doc {
        map.remove("signature");
    }
    provtool_canon::canonicalize(&doc)
}
