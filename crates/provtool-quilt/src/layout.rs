//! Layered-DAG level assignment (§4.7): turn a stream of
//! `{id, level, depends_on}` records into the ordered `Row` list the
//! geometry stage paints.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::traversal::Matrix;

/// One node the quilt renders: an entity or activity id, the layer it was
/// assigned to, and the ids it depends on (consumed upstream, regardless of
/// which layer they live on).
#[derive(Clone, Debug)]
pub struct QuiltNode {
    pub id: String,
    pub level: usize,
    pub depends_on: Vec<String>,
}

impl QuiltNode {
    pub fn new(id: impl Into<String>, level: usize, depends_on: Vec<String>) -> Self {
        Self {
            id: id.into(),
            level,
            depends_on,
        }
    }
}

/// One row of the layered matrix, one per input node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: String,
    pub layer: usize,
    /// One flag per id in `ids_for_dep`: 1 if this node depends directly on
    /// that id (which lives on the very next layer), else 0.
    pub dep_to_next_layer: Vec<u8>,
    /// The ids `dep_to_next_layer` is indexed against, in the same order.
    pub ids_for_dep: Vec<String>,
    /// Dependencies that live on a layer other than the very next one.
    pub additional_dep: Vec<String>,
}

/// Assign each node a Row (§4.7 algorithm). Nodes are grouped by `level`,
/// levels visited ascending; within a level, ids keep the order they first
/// appear in `nodes` (arrival order), which is also the order used to build
/// `ids_for_dep` for the row above. This is the ordering the source
/// `quilt.py::Quilt.make_quilt` actually produces.
pub fn make_quilt(nodes: &[QuiltNode]) -> Vec<Row> {
    let level_of: HashMap<&str, usize> = nodes.iter().map(|n| (n.id.as_str(), n.level)).collect();
    let by_id: HashMap<&str, &QuiltNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut by_level: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for n in nodes {
        by_level.entry(n.level).or_default().push(n.id.clone());
    }

    let levels: Vec<usize> = by_level.keys().copied().collect();
    let max_level = levels.last().copied().unwrap_or(0);

    let mut rows = Vec::with_capacity(nodes.len());
    for level in levels {
        for id in by_level[&level].clone() {
            let node = by_id[id.as_str()];

            if level >= max_level {
                rows.push(Row {
                    id: node.id.clone(),
                    layer: level,
                    dep_to_next_layer: Vec::new(),
                    ids_for_dep: Vec::new(),
                    additional_dep: node.depends_on.clone(),
                });
                continue;
            }

            let next_level = level + 1;
            let ids_for_dep = by_level.get(&next_level).cloned().unwrap_or_default();
            let mut dep_to_next_layer = vec![0u8; ids_for_dep.len()];
            let mut additional_dep = Vec::new();

            for dep in &node.depends_on {
                if level_of.get(dep.as_str()) == Some(&next_level) {
                    if let Some(pos) = ids_for_dep.iter().position(|i| i == dep) {
                        dep_to_next_layer[pos] = 1;
                    }
                } else {
                    additional_dep.push(dep.clone());
                }
            }

            rows.push(Row {
                id: node.id.clone(),
                layer: level,
                dep_to_next_layer,
                ids_for_dep,
                additional_dep,
            });
        }
    }

    rows
}

/// Turn the per-activity matrices a traversal produces into the generic
/// `{id, level, depends_on}` nodes `make_quilt` expects: one node per
/// activity, its level the activity's depth from the traversal target, and
/// its dependencies the activities that generated the entities it consumed.
pub fn quilt_nodes_from_matrices(matrices: &[Matrix]) -> Vec<QuiltNode> {
    let mut producer_of: HashMap<&str, &str> = HashMap::new();
    for matrix in matrices {
        for entity_id in &matrix.generated {
            producer_of.insert(entity_id.as_str(), matrix.activity_id.as_str());
        }
    }

    matrices
        .iter()
        .map(|matrix| {
            let mut seen = HashSet::new();
            let depends_on = matrix
                .consumed
                .iter()
                .filter_map(|entry| producer_of.get(entry.id.as_str()).copied())
                .filter(|producer| seen.insert(*producer))
                .map(|producer| producer.to_string())
                .collect();

            QuiltNode::new(matrix.activity_id.clone(), matrix.depth, depends_on)
        })
        .collect()
}
