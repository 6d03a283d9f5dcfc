//! Comparator (§4.6): directory-level provenance comparison.

pub mod dircompare;
pub mod normalize;

pub use dircompare::{dircompare, ComparisonRow};
pub use normalize::{data_hash, normalize_container, provenance_hash, PayloadRewrite};

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
