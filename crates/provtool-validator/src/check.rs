//! Recursive chain verification (§4.5): walk a container's `used` edges
//! back through its ancestry, memoizing per-call so the walk terminates
//! even on cyclic input (legitimate DAGs never are, but nothing here
//! assumes it).

use std::collections::HashMap;

use provtool_store::{ReadOptions, ReaderRegistry};
use tracing::warn;

use crate::report::ReportEntry;

pub struct Validator<'a> {
    registry: &'a ReaderRegistry,
    opts: ReadOptions,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a ReaderRegistry, opts: ReadOptions) -> Self {
        Self { registry, opts }
    }

    /// Verify `target`'s entire ancestry, returning a flat report with one
    /// entry per distinct entity reached. Dedup is keyed on entity id alone
    /// (a deliberate improvement over the original's `entity+name+valid`
    /// composite key — see §9 Design Notes), with `used_by` always merged.
    pub fn check(&self, target: &str) -> Vec<ReportEntry> {
        let mut known: HashMap<String, bool> = HashMap::new();
        let mut entries: HashMap<String, ReportEntry> = HashMap::new();
        self.visit(target, None, &mut known, &mut entries);

        let mut out: Vec<ReportEntry> = entries.into_values().collect();
        out.sort_by(|a, b| a.entity.cmp(&b.entity));
        out
    }

    fn visit(
        &self,
        cid: &str,
        caller: Option<&str>,
        known: &mut HashMap<String, bool>,
        entries: &mut HashMap<String, ReportEntry>,
    ) -> bool {
        if let Some(&valid) = known.get(cid) {
            if let Some(caller) = caller {
                if let Some(entry) = entries.get_mut(cid) {
                    if !entry.used_by.contains(&caller.to_string()) {
                        entry.used_by.push(caller.to_string());
                    }
                }
            }
            return valid;
        }

        // Placeholder guards against cycles: a re-entrant visit before this
        // call returns sees `false` rather than looping forever.
        known.insert(cid.to_string(), false);

        let resolved = match self.registry.read(&self.opts, cid) {
            Ok(r) => r,
            Err(e) => {
                warn!(cid, error = %e, "container did not resolve during chain validation");
                let mut entry = ReportEntry::unreadable(cid);
                if let Some(caller) = caller {
                    entry.used_by.push(caller.to_string());
                }
                entries.insert(cid.to_string(), entry);
                known.insert(cid.to_string(), false);
                return false;
            }
        };

        let parsed = match provtool_codec::parse_container(&resolved.raw_prov) {
            Ok(p) => p,
            Err(e) => {
                warn!(cid, error = %e, "container failed to parse during chain validation");
                let mut entry = ReportEntry::unreadable(cid);
                if let Some(caller) = caller {
                    entry.used_by.push(caller.to_string());
                }
                entries.insert(cid.to_string(), entry);
                known.insert(cid.to_string(), false);
                return false;
            }
        };

        let mut valid = true;
        for used_id in &parsed.used_entity_ids {
            if !self.visit(used_id, Some(cid), known, entries) {
                valid = false;
            }
        }

        let entry = ReportEntry {
            entity: parsed.cid.clone(),
            data: parsed.data_hash.clone(),
            name: parsed.label.clone(),
            valid,
            used_by: caller.map(|c| vec![c.to_string()]).unwrap_or_default(),
            activity: parsed.activity_label.clone(),
            start_time: parsed.start_time.clone(),
            end_time: parsed.end_time.clone(),
            used: parsed.used_entity_ids.clone(),
        };
        entries.insert(cid.to_string(), entry);
        known.insert(cid.to_string(), valid);
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use provtool_core::constants::TIMESTAMP_FORMAT;
    use provtool_core::hash::Sha256Digest;
    use provtool_core::DataHash;
    use provtool_model::{Activity, AgentNode, Entity, EntityType};
    use std::fs;
    use std::path::Path;

    fn t(s: &str) -> chrono::DateTime<chrono::FixedOffset> {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn write_container(dir: &Path, label: &str, payload: &[u8], used: Vec<String>) -> String {
        let datahash = Sha256Digest::of(payload).to_hex();
        fs::write(dir.join(&datahash), payload).unwrap();

        let entity = Entity::new(label, EntityType::File, DataHash(datahash));
        let activity = Activity::new(t("2026-01-01T00:00:00+0000"), None, "loc", "label", "means", used);
        let agent = AgentNode::person("Ada", "Lovelace", None);
        let built = provtool_codec::ContainerBuilder::new(entity, activity, agent).build().unwrap();
        fs::write(dir.join(format!("{}.prov", built.cid)), &built.container_bytes).unwrap();
        built.cid
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("provtool-validator-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn unknown_target_reports_single_invalid_entry() {
        let dir = scratch_dir("unknown");
        let registry = ReaderRegistry::default_registry();
        let opts = ReadOptions::new(&dir);
        let validator = Validator::new(&registry, opts);
        let report = validator.check("deadbeef");
        assert_eq!(report.len(), 1);
        assert!(!report[0].valid);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn three_entity_chain_with_corrupted_root_fails_all_three() {
        let dir = scratch_dir("chain");
        let e1 = write_container(&dir, "e1.txt", b"payload-one", vec![]);
        let e2 = write_container(&dir, "e2.txt", b"payload-two", vec![e1.clone()]);
        let e3 = write_container(&dir, "e3.txt", b"payload-three", vec![e2.clone()]);

        // Corrupt e1's payload in place so its datahash no longer matches.
        let datahash_e1 = Sha256Digest::of(b"payload-one").to_hex();
        fs::write(dir.join(&datahash_e1), b"payload-one-TAMPERED").unwrap();

        let registry = ReaderRegistry::default_registry();
        let opts = ReadOptions::new(&dir);
        let validator = Validator::new(&registry, opts);
        let report = validator.check(&e3);

        assert_eq!(report.len(), 3);
        let by_id: HashMap<_, _> = report.iter().map(|r| (r.entity.clone(), r)).collect();
        assert!(!by_id[&e1].valid);
        assert!(!by_id[&e2].valid);
        assert!(!by_id[&e3].valid);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn valid_chain_reports_all_valid_with_used_by_populated() {
        let dir = scratch_dir("valid-chain");
        let e1 = write_container(&dir, "e1.txt", b"one", vec![]);
        let e2 = write_container(&dir, "e2.txt", b"two", vec![e1.clone()]);

        let registry = ReaderRegistry::default_registry();
        let opts = ReadOptions::new(&dir);
        let validator = Validator::new(&registry, opts);
        let report = validator.check(&e2);

        assert_eq!(report.len(), 2);
        let by_id: HashMap<_, _> = report.iter().map(|r| (r.entity.clone(), r)).collect();
        assert!(by_id[&e1].valid);
        assert!(by_id[&e2].valid);
        assert_eq!(by_id[&e1].used_by, vec![e2.clone()]);
        fs::remove_dir_all(&dir).unwrap();
    }
}
