//! Directory Wrapper (§4.4): ingest plain files into containers, and the
//! inverse operation of unpacking containers back into plain files.

pub mod config;
pub mod plain2prov;
pub mod prov2plain;

pub use config::{load_agentinfo, load_config, resolve_agent_chain, AgentInfo, AgentSpec, Config};
pub use plain2prov::{plain2prov, Plain2ProvRequest, WrappedFile};
pub use prov2plain::prov2plain;

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
