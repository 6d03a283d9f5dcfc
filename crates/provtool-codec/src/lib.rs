//! Container Codec (§4.2): builds the two serialized forms of a container
//! (raw, self-keyed; and container, cid-keyed) and parses containers back
//! off disk into a queryable view.

pub mod build;
pub mod parse;

pub use build::{BuiltContainer, ContainerBuilder};
pub use parse::{parse_container, sign_hash_bytes, ParsedContainer};

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
