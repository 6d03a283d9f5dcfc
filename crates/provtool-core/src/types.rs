use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::Sha256Digest;

/// Timestamp formatted per RFC 3339 with an explicit offset, e.g.
/// `2026-07-28T09:00:00+0000`. Container fields carry this as a plain string;
/// `provtool-canon` never reinterprets it.
pub type ProvTimestamp = chrono::DateTime<chrono::FixedOffset>;

// ── ContainerId ────────────────────────────────────────────────────────────

/// A container's identity: SHA-256 of its own canonical "self"-substituted
/// bytes. Doubles as the `.prov` filename (hex, no extension added here).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn from_digest(d: Sha256Digest) -> Self {
        Self(d.to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = if self.0.len() > 12 { &self.0[..12] } else { &self.0 };
        write!(f, "ContainerId({}…)", short)
    }
}

impl From<String> for ContainerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── DataHash ─────────────────────────────────────────────────────────────────

/// SHA-256 of a payload's raw bytes; names the sibling file on disk.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataHash(pub String);

impl DataHash {
    pub fn from_digest(d: Sha256Digest) -> Self {
        Self(d.to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = if self.0.len() > 12 { &self.0[..12] } else { &self.0 };
        write!(f, "DataHash({}…)", short)
    }
}
