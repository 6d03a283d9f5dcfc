use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvtoolError {
    // ── Schema / structural validation ───────────────────────────────────────
    #[error("document failed schema validation: {0}")]
    InvalidSchema(String),

    #[error("no agent defined: neither config nor agent-info supplied one")]
    NoAgentDefined,

    #[error("invalid agent: {0}")]
    InvalidAgent(String),

    #[error("agent chain contains a cycle (more than {max} acted_on_behalf_of hops)")]
    CyclicAgentChain { max: usize },

    // ── Content addressing / integrity ───────────────────────────────────────
    #[error("hash mismatch: expected {expected}, got {got}")]
    HashMismatch { expected: String, got: String },

    #[error("raw provenance is missing the \"self\" placeholder entity key")]
    MissingSelf,

    #[error("container is missing provtool:datahash")]
    MissingDataHash,

    // ── Directory wrapper ─────────────────────────────────────────────────────
    #[error("unsafe label {label:?}: must match [A-Za-z0-9._ -]+")]
    UnsafeLabel { label: String },

    #[error("target already exists: {0}")]
    TargetExists(String),

    // ── Store / reader ────────────────────────────────────────────────────────
    #[error("container not found: {0}")]
    MissingContainer(String),

    #[error("payload not found for datahash {0}")]
    MissingPayload(String),

    #[error("reader error: {0}")]
    ReaderError(String),

    // ── Signer ─────────────────────────────────────────────────────────────────
    #[error("signing error: {0}")]
    SignerError(String),

    // ── Serialization / IO ────────────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ProvtoolError {
    fn from(e: serde_json::Error) -> Self {
        ProvtoolError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for ProvtoolError {
    fn from(e: std::io::Error) -> Self {
        ProvtoolError::Io(e.to_string())
    }
}
