//! ─── Provenance container constants ─────────────────────────────────────────
//!
//! Shared literal values referenced by the codec, the directory wrapper and
//! the schema validator. These are not configuration — they are part of the
//! wire contract and changing them changes container identity.

/// Placeholder entity key used in the "raw" (pre-addressing) phase of a
/// container, before its SHA-256 self-hash is known.
pub const SELF_PLACEHOLDER: &str = "self";

/// Canonical timestamp format: ISO-8601 with a numeric UTC offset, no
/// fractional seconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Character whitelist for entity labels that are used to reconstruct plain
/// filenames during `prov2plain`. Anything outside this set trips
/// `UnsafeLabel`.
pub const SAFE_LABEL_PATTERN: &str = r"^[A-Za-z0-9._ \-]+$";

/// Upper bound on `acted_on_behalf_of` hops walked while splicing an
/// agent-info agent onto the tail of a config agent's delegation chain.
/// Exceeding this is treated as a cycle.
pub const MAX_AGENT_CHAIN_DEPTH: usize = 64;

/// Default "neutral" timestamp the comparator substitutes for every
/// `startTime`/`endTime` field before hashing, so that timing differences
/// alone never cause two otherwise-identical derivations to mismatch.
pub const COMPARATOR_DEFAULT_TIMESTAMP: &str = "1970-01-01T00:00:00+0000";

/// Placeholder keys the comparator rekeys onto before hashing.
pub const COMPARATOR_ENTITY_PLACEHOLDER: &str = "ent_placeholder";
pub const COMPARATOR_ACTIVITY_PLACEHOLDER: &str = "act_placeholder";
