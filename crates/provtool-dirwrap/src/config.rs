//! The two input documents a Directory Wrapper run reads (§6.2, §10.3): a
//! static `config` describing the activity and the software's own agent
//! chain, and a per-invocation `agentinfo` describing the human running it.

use provtool_core::ProvtoolError;
use provtool_model::AgentNode;
use serde::Deserialize;

/// One node of the `agent`/`acted_on_behalf_of` tree as it appears in
/// `config`/`agentinfo` JSON. Mirrors the `anyOf` shape `provtool-schema`
/// validates against before this ever gets deserialized.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum AgentSpec {
    #[serde(rename = "person")]
    Person {
        given_name: String,
        family_name: String,
        #[serde(default)]
        acted_on_behalf_of: Option<Box<AgentSpec>>,
    },
    #[serde(rename = "organization")]
    Organization { label: String },
    #[serde(rename = "software")]
    Software {
        creator: String,
        version: String,
        location: String,
        label: String,
        #[serde(default)]
        acted_on_behalf_of: Option<Box<AgentSpec>>,
    },
}

impl AgentSpec {
    pub fn to_agent_node(&self) -> Result<AgentNode, ProvtoolError> {
        match self {
            AgentSpec::Person {
                given_name,
                family_name,
                acted_on_behalf_of,
            } => {
                let principal = acted_on_behalf_of.as_deref().map(AgentSpec::to_agent_node).transpose()?;
                Ok(AgentNode::person(given_name, family_name, principal))
            }
            AgentSpec::Organization { label } => Ok(AgentNode::organization(label)),
            AgentSpec::Software {
                creator,
                version,
                location,
                label,
                acted_on_behalf_of,
            } => {
                let principal = acted_on_behalf_of
                    .as_deref()
                    .map(AgentSpec::to_agent_node)
                    .transpose()?
                    .ok_or_else(|| {
                        ProvtoolError::InvalidAgent(
                            "software agent in config requires acted_on_behalf_of".into(),
                        )
                    })?;
                Ok(AgentNode::acting_software(creator, version, location, label, principal))
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ActivityConfig {
    pub location: String,
    pub label: String,
    pub means: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub activity: ActivityConfig,
    #[serde(default)]
    pub agent: Option<AgentSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AgentInfo {
    pub agent: AgentSpec,
}

fn read_validated<T: for<'de> Deserialize<'de>>(
    path: &std::path::Path,
    validate: fn(&serde_json::Value) -> Result<(), ProvtoolError>,
) -> Result<T, ProvtoolError> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    validate(&value)?;
    Ok(serde_json::from_value(value)?)
}

pub fn load_config(path: &std::path::Path) -> Result<Config, ProvtoolError> {
    read_validated(path, provtool_schema::validate_config)
}

pub fn load_agentinfo(path: &std::path::Path) -> Result<AgentInfo, ProvtoolError> {
    read_validated(path, provtool_schema::validate_agentinfo)
}

/// Resolve the effective agent chain for a run (§4.4): if both a config and
/// an agentinfo agent are present, the agentinfo agent is spliced onto the
/// tail of the config agent's delegation chain. If only one is present, it
/// is used as-is. If neither is present, fails with `NoAgentDefined`.
pub fn resolve_agent_chain(
    config: Option<&Config>,
    agentinfo: Option<&AgentInfo>,
) -> Result<AgentNode, ProvtoolError> {
    let config_agent = config
        .and_then(|c| c.agent.as_ref())
        .map(AgentSpec::to_agent_node)
        .transpose()?;
    let agentinfo_agent = agentinfo.map(|a| a.agent.to_agent_node()).transpose()?;

    match (config_agent, agentinfo_agent) {
        (Some(mut chain), Some(addition)) => {
            chain.splice_tail(addition)?;
            Ok(chain)
        }
        (Some(chain), None) => Ok(chain),
        (None, Some(agent)) => Ok(agent),
        (None, None) => Err(ProvtoolError::NoAgentDefined),
    }
}
