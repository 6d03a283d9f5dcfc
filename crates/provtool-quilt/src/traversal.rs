//! Matrix assembly from a traversal (§4.7 final paragraph): starting from a
//! target entity, walk `used` edges transitively to find every relevant
//! entity/activity, group them by per-activity depth, and describe what
//! each activity generated and consumed.

use std::collections::{HashMap, HashSet, VecDeque};

use provtool_core::ProvtoolError;
use provtool_store::registry::ReaderRegistry;
use provtool_store::reader::ReadOptions;

/// One upstream entity an activity consumed, flagged `special` when it does
/// not live on the layer directly after this activity's — the geometry
/// stage renders those with a border (§4.7).
#[derive(Clone, Debug)]
pub struct ConsumedEntity {
    pub id: String,
    pub special: bool,
}

/// Everything one activity contributes to the quilt: what it generated and
/// what it consumed, at its depth from the traversal's target entity.
#[derive(Clone, Debug)]
pub struct Matrix {
    pub depth: usize,
    pub activity_id: String,
    pub generated: Vec<String>,
    pub consumed: Vec<ConsumedEntity>,
}

/// Walk the DAG backward from `target_cid`, reading containers through
/// `registry`, and assemble one `Matrix` per activity encountered.
pub fn traverse(
    registry: &ReaderRegistry,
    opts: &ReadOptions,
    target_cid: &str,
) -> Result<Vec<Matrix>, ProvtoolError> {
    let mut depth_of_entity: HashMap<String, usize> = HashMap::new();
    let mut activity_generated: HashMap<String, Vec<String>> = HashMap::new();
    let mut activity_consumed: HashMap<String, Vec<String>> = HashMap::new();
    let mut activity_depth: HashMap<String, usize> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();

    let mut queue = VecDeque::new();
    queue.push_back((target_cid.to_string(), 0usize));

    while let Some((cid, depth)) = queue.pop_front() {
        if !visited.insert(cid.clone()) {
            continue;
        }
        depth_of_entity.entry(cid.clone()).or_insert(depth);

        let resolved = registry.read(opts, &cid)?;
        let parsed = provtool_codec::parse_container(&resolved.raw_prov)?;

        activity_generated
            .entry(parsed.activity_id.clone())
            .or_default()
            .push(cid.clone());
        activity_depth.entry(parsed.activity_id.clone()).or_insert(depth);

        for used_id in &parsed.used_entity_ids {
            activity_consumed
                .entry(parsed.activity_id.clone())
                .or_default()
                .push(used_id.clone());
            if !visited.contains(used_id) {
                queue.push_back((used_id.clone(), depth + 1));
            }
        }
    }

    let mut matrices: Vec<Matrix> = activity_generated
        .into_iter()
        .map(|(activity_id, mut generated)| {
            generated.sort();
            generated.dedup();

            let depth = activity_depth.get(&activity_id).copied().unwrap_or(0);
            let mut seen = HashSet::new();
            let mut consumed: Vec<ConsumedEntity> = activity_consumed
                .remove(&activity_id)
                .unwrap_or_default()
                .into_iter()
                .filter(|id| seen.insert(id.clone()))
                .map(|id| {
                    let special = depth_of_entity.get(&id).copied() != Some(depth + 1);
                    ConsumedEntity { id, special }
                })
                .collect();
            consumed.sort_by(|a, b| a.id.cmp(&b.id));

            Matrix {
                depth,
                activity_id,
                generated,
                consumed,
            }
        })
        .collect();

    matrices.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.activity_id.cmp(&b.activity_id)));
    Ok(matrices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use provtool_core::constants::TIMESTAMP_FORMAT;
    use provtool_core::DataHash;
    use provtool_model::{Activity, AgentNode, Entity, EntityType};
    use provtool_store::registry::ReaderRegistry;
    use std::fs;
    use std::path::PathBuf;

    fn t(s: &str) -> chrono::DateTime<chrono::FixedOffset> {
        DateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn write_container(dir: &std::path::Path, label: &str, payload: &[u8], used: Vec<String>) -> String {
        let datahash = provtool_core::hash::sha256_hex(payload);
        fs::write(dir.join(&datahash), payload).unwrap();
        let entity = Entity::new(label, EntityType::File, DataHash(datahash));
        let activity = Activity::new(t("2026-01-01T00:00:00+0000"), None, "loc", "label", "means", used);
        let agent = AgentNode::person("Ada", "Lovelace", None);
        let built = provtool_codec::ContainerBuilder::new(entity, activity, agent).build().unwrap();
        fs::write(dir.join(format!("{}.prov", built.cid)), &built.container_bytes).unwrap();
        built.cid
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("provtool-quilt-test-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn three_entity_chain_assembles_two_activities() {
        let dir = scratch_dir("traverse-chain");
        let root_cid = write_container(&dir, "root.txt", b"root", vec![]);
        let mid_cid = write_container(&dir, "mid.txt", b"mid", vec![root_cid.clone()]);
        let tip_cid = write_container(&dir, "tip.txt", b"tip", vec![mid_cid.clone()]);

        let registry = ReaderRegistry::default_registry();
        let opts = ReadOptions::new(&dir);
        let matrices = traverse(&registry, &opts, &tip_cid).unwrap();

        assert_eq!(matrices.len(), 3);
        assert_eq!(matrices[0].depth, 0);
        assert_eq!(matrices[0].generated, vec![tip_cid.clone()]);
        assert_eq!(matrices[1].generated, vec![mid_cid]);
        assert_eq!(matrices[2].generated, vec![root_cid]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
