//! Structural validation for the three document shapes the system reads and
//! writes: the static `config` file, the per-invocation `agentinfo` file,
//! and the container (`.prov`) document itself.
//!
//! Schemas are ported attribute-for-attribute from the reference tool's
//! constants; one deliberate deviation is recorded on `PROV_SCHEMA`:
//! `prov:endTime` is optional here, matching the container invariant that an
//! in-progress activity's id must not change once it completes.

use once_cell::sync::Lazy;
use provtool_core::ProvtoolError;
use serde_json::{json, Value};

fn agents_definition() -> Value {
    json!({
        "anyOf": [
            {
                "type": "object",
                "required": ["family_name", "given_name", "type"],
                "properties": {
                    "family_name": {"type": "string"},
                    "given_name": {"type": "string"},
                    "type": {"const": "person"},
                    "acted_on_behalf_of": {"$ref": "#/definitions/agents"}
                }
            },
            {
                "type": "object",
                "required": ["label", "type"],
                "properties": {
                    "label": {"type": "string"},
                    "type": {"const": "organization"}
                }
            },
            {
                "type": "object",
                "required": ["type", "creator", "version", "location", "label"],
                "properties": {
                    "type": {"const": "software"},
                    "creator": {"type": "string"},
                    "version": {"type": "string"},
                    "location": {"type": "string"},
                    "label": {"type": "string"},
                    "acted_on_behalf_of": {"$ref": "#/definitions/agents"}
                }
            }
        ]
    })
}

pub static CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "definitions": { "agents": agents_definition() },
        "type": "object",
        "required": ["activity"],
        "properties": {
            "activity": {
                "type": "object",
                "required": ["location", "label", "means"],
                "properties": {
                    "location": {"type": "string"},
                    "label": {"type": "string"},
                    "means": {"type": "string"}
                }
            },
            "agent": {"$ref": "#/definitions/agents"}
        }
    })
});

pub static AGENT_INFO_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "definitions": { "agents": agents_definition() },
        "type": "object",
        "required": ["agent"],
        "properties": {
            "agent": {"$ref": "#/definitions/agents"}
        }
    })
});

pub static PROV_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["activity", "agent", "entity", "prefix"],
        "properties": {
            "activity": {
                "type": "object",
                "minProperties": 1,
                "patternProperties": {
                    ".*": {
                        "type": "object",
                        "required": ["prov:startTime", "prov:label", "prov:location", "provtool:means"],
                        "properties": {
                            "prov:startTime": {"type": "string"},
                            "prov:endTime": {"type": "string"},
                            "prov:label": {"type": "string"},
                            "prov:location": {"type": "string"},
                            "provtool:means": {"type": "string"}
                        }
                    }
                }
            },
            "agent": {
                "type": "object",
                "minProperties": 1,
                "patternProperties": {
                    ".*": {
                        "anyOf": [
                            {
                                "type": "object",
                                "required": ["person:familyName", "person:givenName", "prov:label", "prov:type"],
                                "properties": {
                                    "person:familyName": {"type": "string"},
                                    "person:givenName": {"type": "string"},
                                    "prov:label": {"type": "string"},
                                    "prov:type": {"const": "prov:Person"}
                                }
                            },
                            {
                                "type": "object",
                                "required": ["prov:label", "prov:type"],
                                "properties": {
                                    "prov:label": {"type": "string"},
                                    "prov:type": {"const": "prov:Organization"}
                                }
                            },
                            {
                                "type": "object",
                                "required": ["prov:type", "creative:creator", "software:softwareVersion",
                                             "prov:location", "prov:label"],
                                "properties": {
                                    "prov:type": {"const": "prov:SoftwareAgent"},
                                    "creative:creator": {"type": "string"},
                                    "software:softwareVersion": {"type": "string"},
                                    "prov:location": {"type": "string"},
                                    "prov:label": {"type": "string"}
                                }
                            },
                            {
                                "type": "object",
                                "required": ["prov:type", "prov:label"],
                                "properties": {
                                    "prov:type": {"const": "provtool:Machine"},
                                    "prov:label": {"type": "string"}
                                }
                            }
                        ]
                    }
                }
            },
            "entity": {
                "type": "object",
                "minProperties": 1,
                "patternProperties": {
                    ".*": {
                        "type": "object",
                        "required": ["prov:label", "prov:type", "provtool:datahash"],
                        "properties": {
                            "prov:label": {"type": "string"},
                            "prov:type": {"type": "string"},
                            "provtool:datahash": {"type": "string"}
                        }
                    }
                }
            },
            "prefix": {
                "type": "object",
                "minProperties": 1,
                "patternProperties": { ".*": {"type": "string"} }
            },
            "used": {
                "type": "object",
                "minProperties": 1,
                "patternProperties": {
                    ".*": {
                        "type": "object",
                        "required": ["prov:activity", "prov:entity"],
                        "properties": {
                            "prov:activity": {"type": "string"},
                            "prov:entity": {"type": "string"}
                        }
                    }
                }
            }
        }
    })
});

fn validate_against(schema: &Value, instance: &Value) -> Result<(), ProvtoolError> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| ProvtoolError::InvalidSchema(format!("bad schema definition: {e}")))?;
    let errors: Vec<String> = validator.iter_errors(instance).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProvtoolError::InvalidSchema(errors.join("; ")))
    }
}

pub fn validate_config(doc: &Value) -> Result<(), ProvtoolError> {
    validate_against(&CONFIG_SCHEMA, doc)
}

pub fn validate_agentinfo(doc: &Value) -> Result<(), ProvtoolError> {
    validate_against(&AGENT_INFO_SCHEMA, doc)
}

pub fn validate_container(doc: &Value) -> Result<(), ProvtoolError> {
    validate_against(&PROV_SCHEMA, doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_with_person_agent_is_valid() {
        let doc = json!({
            "activity": {"location": "loc", "label": "label", "means": "means"},
            "agent": {"type": "person", "given_name": "Ada", "family_name": "Lovelace"}
        });
        assert!(validate_config(&doc).is_ok());
    }

    #[test]
    fn config_missing_activity_is_rejected() {
        let doc = json!({"agent": {"type": "organization", "label": "ACME"}});
        assert!(validate_config(&doc).is_err());
    }

    #[test]
    fn container_missing_prefix_is_rejected() {
        let doc = json!({"activity": {}, "agent": {}, "entity": {}});
        assert!(validate_container(&doc).is_err());
    }
}
