pub mod activity;
pub mod agent;
pub mod entity;

pub use activity::Activity;
pub use agent::{AgentKind, AgentNode};
pub use entity::{Entity, EntityType};

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
