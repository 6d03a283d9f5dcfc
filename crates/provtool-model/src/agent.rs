use provtool_core::constants::MAX_AGENT_CHAIN_DEPTH;
use provtool_core::hash::Sha256Digest;
use provtool_core::ProvtoolError;
use serde_json::{json, Map, Value};

/// The four agent shapes the container schema admits (`anyOf` in the
/// original config/agent schemas).
#[derive(Clone, Debug)]
pub enum AgentKind {
    Person {
        given_name: String,
        family_name: String,
    },
    Organization {
        label: String,
    },
    /// `prov:SoftwareAgent`. Always acts on behalf of a human or
    /// organization — see `AgentNode::new`.
    ActingSoftware {
        creator: String,
        version: String,
        location: String,
        label: String,
    },
    Machine {
        label: String,
    },
}

impl AgentKind {
    fn own_attributes(&self) -> Map<String, Value> {
        let mut m = Map::new();
        match self {
            AgentKind::Person {
                given_name,
                family_name,
            } => {
                m.insert("prov:type".into(), json!("prov:Person"));
                m.insert("person:givenName".into(), json!(given_name));
                m.insert("person:familyName".into(), json!(family_name));
                m.insert("prov:label".into(), json!(format!("{given_name} {family_name}")));
            }
            AgentKind::Organization { label } => {
                m.insert("prov:type".into(), json!("prov:Organization"));
                m.insert("prov:label".into(), json!(label));
            }
            AgentKind::ActingSoftware {
                creator,
                version,
                location,
                label,
            } => {
                m.insert("prov:type".into(), json!("prov:SoftwareAgent"));
                m.insert("creative:creator".into(), json!(creator));
                m.insert("software:softwareVersion".into(), json!(version));
                m.insert("prov:location".into(), json!(location));
                m.insert("prov:label".into(), json!(label));
            }
            AgentKind::Machine { label } => {
                m.insert("prov:type".into(), json!("provtool:Machine"));
                m.insert("prov:label".into(), json!(label));
            }
        }
        m
    }

    fn is_software(&self) -> bool {
        matches!(self, AgentKind::ActingSoftware { .. })
    }
}

/// A node in an agent delegation chain. `acted_on_behalf_of` points at the
/// party this agent acts for; walking that chain to its end (`None`)
/// reconstructs the full responsibility tree for a container.
#[derive(Clone, Debug)]
pub struct AgentNode {
    pub kind: AgentKind,
    pub acted_on_behalf_of: Option<Box<AgentNode>>,
}

impl AgentNode {
    /// General constructor. Fails with `InvalidAgent` if `kind` is
    /// `ActingSoftware` and no principal is supplied — software cannot act
    /// except on someone's behalf.
    pub fn new(kind: AgentKind, acted_on_behalf_of: Option<AgentNode>) -> Result<Self, ProvtoolError> {
        if kind.is_software() && acted_on_behalf_of.is_none() {
            return Err(ProvtoolError::InvalidAgent(
                "ActingSoftware agent requires a principal (acted_on_behalf_of)".into(),
            ));
        }
        Ok(Self {
            kind,
            acted_on_behalf_of: acted_on_behalf_of.map(Box::new),
        })
    }

    pub fn person(
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        acted_on_behalf_of: Option<AgentNode>,
    ) -> Self {
        Self {
            kind: AgentKind::Person {
                given_name: given_name.into(),
                family_name: family_name.into(),
            },
            acted_on_behalf_of: acted_on_behalf_of.map(Box::new),
        }
    }

    pub fn organization(label: impl Into<String>) -> Self {
        Self {
            kind: AgentKind::Organization { label: label.into() },
            acted_on_behalf_of: None,
        }
    }

    pub fn acting_software(
        creator: impl Into<String>,
        version: impl Into<String>,
        location: impl Into<String>,
        label: impl Into<String>,
        principal: AgentNode,
    ) -> Self {
        Self {
            kind: AgentKind::ActingSoftware {
                creator: creator.into(),
                version: version.into(),
                location: location.into(),
                label: label.into(),
            },
            acted_on_behalf_of: Some(Box::new(principal)),
        }
    }

    pub fn machine(label: impl Into<String>, acted_on_behalf_of: Option<AgentNode>) -> Self {
        Self {
            kind: AgentKind::Machine { label: label.into() },
            acted_on_behalf_of: acted_on_behalf_of.map(Box::new),
        }
    }

    /// Attaches `addition` to the tail of this chain (the first node with
    /// no existing principal). Used to splice a per-invocation agent-info
    /// agent onto a static config agent's chain.
    pub fn splice_tail(&mut self, addition: AgentNode) -> Result<(), ProvtoolError> {
        let mut cur = self;
        for _ in 0..MAX_AGENT_CHAIN_DEPTH {
            if cur.acted_on_behalf_of.is_none() {
                cur.acted_on_behalf_of = Some(Box::new(addition));
                return Ok(());
            }
            cur = cur.acted_on_behalf_of.as_mut().unwrap();
        }
        Err(ProvtoolError::CyclicAgentChain {
            max: MAX_AGENT_CHAIN_DEPTH,
        })
    }

    pub fn id(&self) -> String {
        let mut attrs = self.kind.own_attributes();
        if let Some(principal) = &self.acted_on_behalf_of {
            attrs.insert("acted_on_behalf_of".into(), json!(principal.id()));
        }
        let bytes = provtool_canon::canonicalize(&Value::Object(attrs)).expect("agent attrs serialize");
        Sha256Digest::of(&bytes).to_hex()
    }

    /// Flattens the chain into the container's `agent` map plus the list of
    /// `(delegate_id, responsible_id)` pairs for the `actedOnBehalfOf`
    /// relation table.
    pub fn flatten(&self) -> (Map<String, Value>, Vec<(String, String)>) {
        let mut agent_map = Map::new();
        let mut edges = Vec::new();
        self.flatten_into(&mut agent_map, &mut edges);
        (agent_map, edges)
    }

    fn flatten_into(&self, agent_map: &mut Map<String, Value>, edges: &mut Vec<(String, String)>) {
        let id = self.id();
        agent_map
            .entry(id.clone())
            .or_insert_with(|| Value::Object(self.kind.own_attributes()));
        if let Some(principal) = &self.acted_on_behalf_of {
            principal.flatten_into(agent_map, edges);
            edges.push((id, principal.id()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acting_software_without_principal_is_rejected() {
        let err = AgentNode::new(
            AgentKind::ActingSoftware {
                creator: "x".into(),
                version: "1".into(),
                location: "loc".into(),
                label: "tool".into(),
            },
            None,
        );
        assert!(matches!(err, Err(ProvtoolError::InvalidAgent(_))));
    }

    #[test]
    fn chain_flattens_to_one_edge_per_hop() {
        let org = AgentNode::organization("ACME");
        let person = AgentNode::person("Ada", "Lovelace", Some(org));
        let (map, edges) = person.flatten();
        assert_eq!(map.len(), 2);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn splice_tail_attaches_at_the_end() {
        let mut chain = AgentNode::person("Ada", "Lovelace", None);
        chain.splice_tail(AgentNode::organization("ACME")).unwrap();
        assert!(chain.acted_on_behalf_of.is_some());
        assert!(chain.acted_on_behalf_of.unwrap().acted_on_behalf_of.is_none());
    }
}
