//! Geometric placement (§4.7): turn the per-activity matrices produced by
//! [`crate::traversal::traverse`] into a serializable description of where
//! each symbol sits — offsets, color indices, label strings — and nothing
//! past that. The raster back-end that turns this into pixels lives outside
//! this crate.

use serde::Serialize;

use crate::traversal::Matrix;

pub const CELL_SIZE: f64 = 18.0;
pub const CELL_GAP: f64 = 4.0;
pub const ROW_HEIGHT: f64 = CELL_SIZE + CELL_GAP;
pub const SUBMATRIX_GAP: f64 = 48.0;

/// What a cell paints as, beyond its position and label.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CellKind {
    /// An entity symbol, colored by its position in the global entity
    /// order. `bordered` marks a "special" (non-adjacent-layer) dependency.
    Entity { color_index: usize, bordered: bool },
    Activity,
    Agent,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub kind: CellKind,
    pub label: String,
    /// Entity-axis labels are drawn rotated 90°; activity-axis labels stay
    /// upright.
    pub rotated: bool,
}

/// One activity's row of the quilt: its own cell, the entities it
/// generated (left sub-matrix) and the entities it consumed (right
/// sub-matrix).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layer {
    pub depth: usize,
    pub activity: Cell,
    pub generated: Vec<Cell>,
    pub consumed: Vec<Cell>,
}

/// A continuous perceptual-style colormap: walks hue around the color
/// wheel at the golden-angle increment so that nearby indices land far
/// apart in hue, keeping adjacent entity colors visually distinct however
/// many there are.
pub fn color_for_index(index: usize) -> (u8, u8, u8) {
    const GOLDEN_ANGLE: f64 = 137.50776;
    let hue = (index as f64 * GOLDEN_ANGLE).rem_euclid(360.0);
    hsv_to_rgb(hue, 0.65, 0.9)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let c = v * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    (
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}

/// Build the placement data for every matrix, given the global ordering
/// used to index entity colors (typically the order entities were first
/// encountered during the traversal that produced `matrices`).
pub fn build_layers(matrices: &[Matrix], global_entity_order: &[String]) -> Vec<Layer> {
    let color_index_of = |id: &str| -> usize {
        global_entity_order.iter().position(|e| e == id).unwrap_or(0)
    };

    matrices
        .iter()
        .enumerate()
        .map(|(row, matrix)| {
            let y = row as f64 * ROW_HEIGHT;

            let activity = Cell {
                x: 0.0,
                y,
                kind: CellKind::Activity,
                label: matrix.activity_id.clone(),
                rotated: false,
            };

            let generated = matrix
                .generated
                .iter()
                .enumerate()
                .map(|(col, id)| Cell {
                    x: -(col as f64 + 1.0) * ROW_HEIGHT,
                    y,
                    kind: CellKind::Entity {
                        color_index: color_index_of(id),
                        bordered: false,
                    },
                    label: id.clone(),
                    rotated: true,
                })
                .collect();

            let consumed = matrix
                .consumed
                .iter()
                .enumerate()
                .map(|(col, entry)| Cell {
                    x: SUBMATRIX_GAP + (col as f64 + 1.0) * ROW_HEIGHT,
                    y,
                    kind: CellKind::Entity {
                        color_index: color_index_of(&entry.id),
                        bordered: entry.special,
                    },
                    label: entry.id.clone(),
                    rotated: true,
                })
                .collect();

            Layer {
                depth: matrix.depth,
                activity,
                generated,
                consumed,
            }
        })
        .collect()
}
