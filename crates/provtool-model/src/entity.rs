use provtool_core::DataHash;
use serde_json::{json, Map, Value};

/// `prov:type` values an entity may carry. The source tool only ever emits
/// `File`; the variant exists so a future payload kind doesn't require
/// touching every call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityType {
    File,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::File => "File",
        }
    }
}

/// The single entity a container describes. Its identity is not computed
/// independently — it *is* the container's own content address (see
/// `provtool-codec`), so this struct only carries the attributes that get
/// written under the entity's key.
#[derive(Clone, Debug)]
pub struct Entity {
    pub label: String,
    pub entity_type: EntityType,
    pub data_hash: DataHash,
}

impl Entity {
    pub fn new(label: impl Into<String>, entity_type: EntityType, data_hash: DataHash) -> Self {
        Self {
            label: label.into(),
            entity_type,
            data_hash,
        }
    }

    pub fn attributes(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("prov:label".into(), json!(self.label));
        m.insert("prov:type".into(), json!(self.entity_type.as_str()));
        m.insert("provtool:datahash".into(), json!(self.data_hash.as_str()));
        m
    }
}
