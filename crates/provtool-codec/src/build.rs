//! Two-phase content addressing (§4.2): a container is built twice — once
//! with its entity keyed by the literal placeholder `"self"` so it can be
//! hashed, then again with the entity rekeyed to that hash so it can be
//! written to disk.

use provtool_core::constants::SELF_PLACEHOLDER;
use provtool_core::hash::Sha256Digest;
use provtool_core::ProvtoolError;
use provtool_model::{Activity, AgentNode, Entity};
use serde_json::{json, Map, Value};

/// Deterministic relation-record key: a hash of the edge it represents, so
/// that the relation map's *contents* (not its build order) determine the
/// canonical bytes. Two builders assembling the same edges in different
/// order produce byte-identical containers.
fn relation_id(parts: &[&str]) -> String {
    Sha256Digest::of(parts.join("|").as_bytes()).to_hex()
}

/// Everything needed to assemble one container: the entity/activity/agent
/// triad plus any freeform prefix namespaces.
pub struct ContainerBuilder {
    pub entity: Entity,
    pub activity: Activity,
    pub agent: AgentNode,
    pub prefix: Map<String, Value>,
}

/// The two serialized forms the codec emits, plus the derived id.
pub struct BuiltContainer {
    /// The document with the entity keyed by `"self"`. This is what gets
    /// signed (§4.8) and what the id is computed over.
    pub raw_bytes: Vec<u8>,
    /// The document with the entity rekeyed to `cid`. This is what gets
    /// written to disk as `<cid>.prov`.
    pub container_bytes: Vec<u8>,
    pub cid: String,
}

impl ContainerBuilder {
    pub fn new(entity: Entity, activity: Activity, agent: AgentNode) -> Self {
        Self {
            entity,
            activity,
            agent,
            prefix: default_prefix(),
        }
    }

    pub fn with_prefix(mut self, prefix: Map<String, Value>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Assemble the raw ("self"-keyed) document. Shared by `build` (which
    /// hashes it) and the signer (which signs these exact bytes).
    fn assemble(&self, entity_key: &str) -> Value {
        let activity_id = self.activity.id();

        let mut entity_map = Map::new();
        entity_map.insert(entity_key.to_string(), Value::Object(self.entity.attributes()));

        let mut activity_map = Map::new();
        activity_map.insert(activity_id.clone(), Value::Object(self.activity.attributes()));

        let (agent_map, acted_on_behalf_of_edges) = self.agent.flatten();
        let root_agent_id = self.agent.id();

        let mut was_generated_by = Map::new();
        was_generated_by.insert(
            relation_id(&["wasGeneratedBy", entity_key, &activity_id]),
            json!({"prov:entity": entity_key, "prov:activity": activity_id}),
        );

        let mut used = Map::new();
        for used_entity in &self.activity.used {
            used.insert(
                relation_id(&["used", &activity_id, used_entity]),
                json!({"prov:activity": activity_id, "prov:entity": used_entity}),
            );
        }

        let mut was_associated_with = Map::new();
        for agent_id in agent_map.keys() {
            was_associated_with.insert(
                relation_id(&["wasAssociatedWith", &activity_id, agent_id]),
                json!({"prov:activity": activity_id, "prov:agent": agent_id}),
            );
        }
        // Ensure at least the root agent is recorded even if flatten() ever
        // returns an empty map (it never does — every AgentNode yields itself).
        was_associated_with
            .entry(relation_id(&["wasAssociatedWith", &activity_id, &root_agent_id]))
            .or_insert_with(|| json!({"prov:activity": activity_id, "prov:agent": root_agent_id}));

        let mut acted_on_behalf_of = Map::new();
        for (delegate, responsible) in &acted_on_behalf_of_edges {
            acted_on_behalf_of.insert(
                relation_id(&["actedOnBehalfOf", delegate, responsible]),
                json!({"prov:delegate": delegate, "prov:responsible": responsible}),
            );
        }

        let mut doc = Map::new();
        doc.insert("prefix".into(), Value::Object(self.prefix.clone()));
        doc.insert("entity".into(), Value::Object(entity_map));
        doc.insert("activity".into(), Value::Object(activity_map));
        doc.insert("agent".into(), Value::Object(agent_map));
        doc.insert("wasGeneratedBy".into(), Value::Object(was_generated_by));
        if !used.is_empty() {
            doc.insert("used".into(), Value::Object(used));
        }
        doc.insert("wasAssociatedWith".into(), Value::Object(was_associated_with));
        if !acted_on_behalf_of.is_empty() {
            doc.insert("actedOnBehalfOf".into(), Value::Object(acted_on_behalf_of));
        }
        if let Some(starter) = &self.activity.started_by {
            let mut was_started_by = Map::new();
            was_started_by.insert(
                relation_id(&["wasStartedBy", &activity_id, starter]),
                json!({"prov:activity": activity_id, "prov:starter": starter}),
            );
            doc.insert("wasStartedBy".into(), Value::Object(was_started_by));
        }

        Value::Object(doc)
    }

    /// Run the full two-phase addressing protocol.
    pub fn build(&self) -> Result<BuiltContainer, ProvtoolError> {
        if self.entity.data_hash.as_str().is_empty() {
            return Err(ProvtoolError::MissingDataHash);
        }
        let raw = self.assemble(SELF_PLACEHOLDER);
        let raw_bytes = provtool_canon::canonicalize(&raw)?;
        let cid = Sha256Digest::of(&raw_bytes).to_hex();

        let container = self.assemble(&cid);
        let container_bytes = provtool_canon::canonicalize(&container)?;

        Ok(BuiltContainer {
            raw_bytes,
            container_bytes,
            cid,
        })
    }
}

fn default_prefix() -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("prov".into(), json!("http://www.w3.org/ns/prov#"));
    m.insert("provtool".into(), json!("https://provtool.local/ns#"));
    m.insert("person".into(), json!("https://provtool.local/ns/person#"));
    m.insert("software".into(), json!("https://provtool.local/ns/software#"));
    m.insert("creative".into(), json!("https://provtool.local/ns/creative#"));
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use provtool_core::constants::TIMESTAMP_FORMAT;
    use provtool_core::DataHash;
    use provtool_model::EntityType;

    fn t(s: &str) -> chrono::DateTime<chrono::FixedOffset> {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn sample_builder(used: Vec<String>) -> ContainerBuilder {
        let entity = Entity::new("out.txt", EntityType::File, DataHash("deadbeef".into()));
        let activity = Activity::new(t("2026-01-01T00:00:00+0000"), None, "loc", "label", "means", used);
        let agent = AgentNode::person("Ada", "Lovelace", None);
        ContainerBuilder::new(entity, activity, agent)
    }

    #[test]
    fn self_placeholder_present_in_raw_absent_in_container() {
        let built = sample_builder(vec![]).build().unwrap();
        let raw_str = String::from_utf8(built.raw_bytes.clone()).unwrap();
        let container_str = String::from_utf8(built.container_bytes.clone()).unwrap();
        assert!(raw_str.contains("\"self\""));
        assert!(!container_str.contains("\"self\""));
        assert!(container_str.contains(&built.cid));
    }

    #[test]
    fn cid_equals_sha256_of_raw_bytes() {
        let built = sample_builder(vec![]).build().unwrap();
        assert_eq!(built.cid, Sha256Digest::of(&built.raw_bytes).to_hex());
    }

    #[test]
    fn permuting_used_yields_identical_container_bytes() {
        let a = sample_builder(vec!["1".into(), "2".into(), "3".into()]).build().unwrap();
        let b = sample_builder(vec!["3".into(), "2".into(), "1".into()]).build().unwrap();
        assert_eq!(a.container_bytes, b.container_bytes);
        assert_eq!(a.cid, b.cid);
    }

    #[test]
    fn missing_datahash_is_rejected() {
        let entity = Entity::new("out.txt", EntityType::File, DataHash(String::new()));
        let activity = Activity::new(t("2026-01-01T00:00:00+0000"), None, "loc", "label", "means", vec![]);
        let agent = AgentNode::person("Ada", "Lovelace", None);
        let err = ContainerBuilder::new(entity, activity, agent).build();
        assert!(matches!(err, Err(ProvtoolError::MissingDataHash)));
    }
}
