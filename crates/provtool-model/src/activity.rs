use provtool_core::constants::TIMESTAMP_FORMAT;
use provtool_core::hash::Sha256Digest;
use provtool_core::types::ProvTimestamp;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

/// A single activity. Identity is a SHA-256 of its own attributes, with two
/// deliberate exclusions (§8.1 invariants 3 and 4 of the container spec):
/// `end_time` never participates (an in-progress activity must keep its id
/// once it completes), and `used` is folded in as a sorted, concatenated
/// string rather than an ordered list (permuting `used` must not change the
/// activity's id).
#[derive(Clone, Debug)]
pub struct Activity {
    pub start_time: ProvTimestamp,
    pub end_time: Option<ProvTimestamp>,
    pub location: String,
    pub label: String,
    pub means: String,
    pub used: BTreeSet<String>,
    /// Parent activity id, linked via `wasStartedBy`. Referenced by id only —
    /// never expanded — so a still-running parent never blocks this one.
    pub started_by: Option<String>,
    /// Overrides the computed id. Set when a caller wants several containers
    /// to share one logical activity (`plain2prov`'s `activity_id` flag).
    pub forced_id: Option<String>,
}

impl Activity {
    pub fn new(
        start_time: ProvTimestamp,
        end_time: Option<ProvTimestamp>,
        location: impl Into<String>,
        label: impl Into<String>,
        means: impl Into<String>,
        used: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            start_time,
            end_time,
            location: location.into(),
            label: label.into(),
            means: means.into(),
            used: used.into_iter().collect(),
            started_by: None,
            forced_id: None,
        }
    }

    pub fn with_started_by(mut self, parent_activity_id: impl Into<String>) -> Self {
        self.started_by = Some(parent_activity_id.into());
        self
    }

    pub fn with_forced_id(mut self, id: impl Into<String>) -> Self {
        self.forced_id = Some(id.into());
        self
    }

    fn format_time(t: &ProvTimestamp) -> String {
        t.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Attributes used to compute the activity id: start_time, location,
    /// label, means, and the normalized `used` token. `end_time` and
    /// `started_by` are intentionally absent.
    fn id_attributes(&self) -> Value {
        let used: Vec<&str> = {
            let mut v: Vec<&str> = self.used.iter().map(String::as_str).collect();
            v.sort_unstable();
            v
        };
        json!({
            "prov:startTime": Self::format_time(&self.start_time),
            "prov:location": self.location,
            "prov:label": self.label,
            "provtool:means": self.means,
            "used": used.join(","),
        })
    }

    pub fn id(&self) -> String {
        if let Some(forced) = &self.forced_id {
            return forced.clone();
        }
        let bytes =
            provtool_canon::canonicalize(&self.id_attributes()).expect("activity attrs serialize");
        Sha256Digest::of(&bytes).to_hex()
    }

    /// Attributes as written into the container's `activity` map. Unlike
    /// `id_attributes`, this includes `end_time` when present.
    pub fn attributes(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("prov:startTime".into(), json!(Self::format_time(&self.start_time)));
        if let Some(end) = &self.end_time {
            m.insert("prov:endTime".into(), json!(Self::format_time(end)));
        }
        m.insert("prov:location".into(), json!(self.location));
        m.insert("prov:label".into(), json!(self.label));
        m.insert("provtool:means".into(), json!(self.means));
        m
    }
}
