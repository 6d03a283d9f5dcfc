pub mod constants;
pub mod error;
pub mod hash;
pub mod types;

pub use constants::*;
pub use error::ProvtoolError;
pub use hash::{sha256_hex, Sha256Digest};
pub use types::*;

pub type Result<T> = std::result::Result<T, ProvtoolError>;
