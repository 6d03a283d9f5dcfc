//! Quilt Layout (§4.7): layered-DAG level assignment, matrix assembly from
//! a store traversal, and the geometric placement data a raster renderer
//! consumes.

pub mod geometry;
pub mod layout;
pub mod traversal;

pub use geometry::{build_layers, color_for_index, Cell, CellKind, Layer};
pub use layout::{make_quilt, quilt_nodes_from_matrices, QuiltNode, Row};
pub use traversal::{traverse, ConsumedEntity, Matrix};

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
