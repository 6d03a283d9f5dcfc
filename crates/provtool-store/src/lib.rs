//! Store / Reader (§4.3): content-addressed lookup of containers and their
//! payloads through a small, statically-registered plugin interface.

pub mod reader;
pub mod registry;

pub use reader::{FileReader, ReadOptions, Reader, Resolved};
pub use registry::ReaderRegistry;

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
