//! Signer (§4.8): detached RSA-PSS signature plus an RFC 3161 timestamp
//! round-trip over a persisted container.

pub mod keys;
pub mod pss;
pub mod signer;
pub mod timestamp;

pub use keys::load_private_key_pem;
pub use pss::{sign_pss_sha256, verify_pss_sha256};
pub use signer::{sign_container, verify_signed_container, SignedOutput};
pub use timestamp::{HttpTimestampAuthority, TimestampAuthority};

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
