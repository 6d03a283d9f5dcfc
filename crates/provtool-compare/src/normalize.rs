//! Normalization (§4.6 step 2): rewrite a container document so two
//! nominally-equal derivations — same shape, different timestamps and
//! different hash-derived ids for the activity/relation records that
//! carry them — compare equal.

use provtool_core::constants::{
    COMPARATOR_ACTIVITY_PLACEHOLDER, COMPARATOR_DEFAULT_TIMESTAMP, COMPARATOR_ENTITY_PLACEHOLDER,
};
use provtool_core::ProvtoolError;
use serde_json::{json, Map, Value};

fn sorted_join(mut values: Vec<String>) -> String {
    values.sort();
    values.join(",")
}

/// Produce the normalized comparison document for one container. This is
/// deliberately *not* a valid container — it's a scratch shape whose
/// canonical bytes are only ever hashed for comparison.
pub fn normalize_container(document: &Value) -> Result<Value, ProvtoolError> {
    let entity_map = document
        .get("entity")
        .and_then(Value::as_object)
        .ok_or_else(|| ProvtoolError::InvalidSchema("missing entity map".into()))?;
    let (_entity_id, entity_attrs) = entity_map
        .iter()
        .next()
        .ok_or_else(|| ProvtoolError::InvalidSchema("entity map is empty".into()))?;

    let activity_map = document
        .get("activity")
        .and_then(Value::as_object)
        .ok_or_else(|| ProvtoolError::InvalidSchema("missing activity map".into()))?;
    let (_activity_id, activity_attrs) = activity_map
        .iter()
        .next()
        .ok_or_else(|| ProvtoolError::InvalidSchema("activity map is empty".into()))?;

    let mut norm_activity = activity_attrs.as_object().cloned().unwrap_or_default();
    norm_activity.insert("prov:startTime".into(), json!(COMPARATOR_DEFAULT_TIMESTAMP));
    if norm_activity.contains_key("prov:endTime") {
        norm_activity.insert("prov:endTime".into(), json!(COMPARATOR_DEFAULT_TIMESTAMP));
    }

    let used_entities: Vec<String> = document
        .get("used")
        .and_then(Value::as_object)
        .map(|m| {
            m.values()
                .filter_map(|r| r.get("prov:entity").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let associated_agents: Vec<String> = document
        .get("wasAssociatedWith")
        .and_then(Value::as_object)
        .map(|m| {
            m.values()
                .filter_map(|r| r.get("prov:agent").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let delegation_edges: Vec<String> = document
        .get("actedOnBehalfOf")
        .and_then(Value::as_object)
        .map(|m| {
            m.values()
                .map(|r| {
                    let d = r.get("prov:delegate").and_then(Value::as_str).unwrap_or("");
                    let p = r.get("prov:responsible").and_then(Value::as_str).unwrap_or("");
                    format!("{d}->{p}")
                })
                .collect()
        })
        .unwrap_or_default();

    let has_parent_activity = document
        .get("wasStartedBy")
        .and_then(Value::as_object)
        .map(|m| !m.is_empty())
        .unwrap_or(false);

    let mut out = Map::new();
    out.insert(
        "entity".into(),
        json!({COMPARATOR_ENTITY_PLACEHOLDER: entity_attrs}),
    );
    out.insert(
        "activity".into(),
        json!({COMPARATOR_ACTIVITY_PLACEHOLDER: norm_activity}),
    );
    out.insert(
        "wasGeneratedBy".into(),
        json!({"prov:entity": COMPARATOR_ENTITY_PLACEHOLDER, "prov:activity": COMPARATOR_ACTIVITY_PLACEHOLDER}),
    );
    out.insert("used".into(), json!(sorted_join(used_entities)));
    out.insert("wasAssociatedWith".into(), json!(sorted_join(associated_agents)));
    out.insert("actedOnBehalfOf".into(), json!(sorted_join(delegation_edges)));
    out.insert("wasStartedBy".into(), json!(has_parent_activity));

    Ok(Value::Object(out))
}

/// `SHA256(canonical(normalize_container(document)))`.
pub fn provenance_hash(document: &Value) -> Result<String, ProvtoolError> {
    let normalized = normalize_container(document)?;
    let bytes = provtool_canon::canonicalize(&normalized)?;
    Ok(provtool_core::hash::sha256_hex(&bytes))
}

/// A payload-rewrite hook: strips or transforms payload bytes before
/// hashing (§4.6 step 2, "strip comments"). Plain function pointers are
/// enough — no dynamic state is needed by the callbacks this system ships.
pub type PayloadRewrite = fn(&[u8]) -> Vec<u8>;

pub fn data_hash(payload: &[u8], rewrite: Option<PayloadRewrite>) -> String {
    let rewritten;
    let bytes = match rewrite {
        Some(f) => {
            rewritten = f(payload);
            &rewritten[..]
        }
        None => payload,
    };
    provtool_core::hash::sha256_hex(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use provtool_core::constants::TIMESTAMP_FORMAT;
    use provtool_core::DataHash;
    use provtool_model::{Activity, AgentNode, Entity, EntityType};

    fn t(s: &str) -> chrono::DateTime<chrono::FixedOffset> {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn container_with_time(start: &str) -> Value {
        let entity = Entity::new("a.txt", EntityType::File, DataHash("cafe".into()));
        let activity = Activity::new(t(start), None, "loc", "label", "means", vec![]);
        let agent = AgentNode::person("Ada", "Lovelace", None);
        let built = provtool_codec::ContainerBuilder::new(entity, activity, agent).build().unwrap();
        serde_json::from_slice(&built.container_bytes).unwrap()
    }

    #[test]
    fn differing_timestamps_normalize_to_the_same_hash() {
        let a = container_with_time("2026-01-01T00:00:00+0000");
        let b = container_with_time("2026-06-15T12:30:00+0000");
        assert_eq!(provenance_hash(&a).unwrap(), provenance_hash(&b).unwrap());
    }

    #[test]
    fn differing_labels_normalize_to_different_hashes() {
        let entity_a = Entity::new("a.txt", EntityType::File, DataHash("cafe".into()));
        let entity_b = Entity::new("b.txt", EntityType::File, DataHash("cafe".into()));
        let activity = Activity::new(t("2026-01-01T00:00:00+0000"), None, "loc", "label", "means", vec![]);
        let agent = AgentNode::person("Ada", "Lovelace", None);
        let built_a = provtool_codec::ContainerBuilder::new(entity_a, activity.clone(), agent.clone())
            .build()
            .unwrap();
        let built_b = provtool_codec::ContainerBuilder::new(entity_b, activity, agent).build().unwrap();
        let a: Value = serde_json::from_slice(&built_a.container_bytes).unwrap();
        let b: Value = serde_json::from_slice(&built_b.container_bytes).unwrap();
        assert_ne!(provenance_hash(&a).unwrap(), provenance_hash(&b).unwrap());
    }
}
