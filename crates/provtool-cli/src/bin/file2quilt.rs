//! `file2quilt` (§6.3): traverse a provenance chain back from a target
//! entity, assign each activity a layered-matrix Row (`dep_to_next_layer`,
//! `ids_for_dep`, `additional_dep`), and emit those rows alongside the
//! quilt's geometric placement description — the positions, color indices
//! and labels a raster renderer would paint. The specific raster back-end
//! is out of scope (§1, §4.7): this binary hands off a serializable
//! description the way the reference workspace's QR code path hands a JSON
//! string to an external encoder.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use provtool_quilt::geometry::{build_layers, color_for_index, Layer};
use provtool_quilt::layout::{make_quilt, quilt_nodes_from_matrices, Row};
use provtool_store::{ReadOptions, ReaderRegistry};

#[derive(Parser, Debug)]
#[command(name = "file2quilt", version, about = "Render a provenance quilt's placement description")]
struct Args {
    /// The target entity id the quilt is drawn for.
    target_id: String,

    /// Where to write the placement description.
    image_file: PathBuf,

    /// Reader configuration as `key=value` pairs, e.g. `directory=/data`.
    #[arg(long = "reader", num_args = 1..)]
    reader: Vec<String>,
}

fn reader_root(pairs: &[String]) -> PathBuf {
    for pair in pairs {
        if let Some((key, value)) = pair.split_once('=') {
            if key == "directory" {
                return PathBuf::from(value);
            }
        }
    }
    PathBuf::from(".")
}

#[derive(Serialize)]
struct EntityColor {
    id: String,
    rgb: (u8, u8, u8),
}

#[derive(Serialize)]
struct QuiltDescription {
    rows: Vec<Row>,
    layers: Vec<Layer>,
    legend: Vec<EntityColor>,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let registry = ReaderRegistry::default_registry();
    let opts = ReadOptions::new(reader_root(&args.reader));

    let matrices = provtool_quilt::traversal::traverse(&registry, &opts, &args.target_id)
        .context("traversing provenance chain")?;

    let mut global_entity_order: Vec<String> = Vec::new();
    for matrix in &matrices {
        for id in &matrix.generated {
            if !global_entity_order.contains(id) {
                global_entity_order.push(id.clone());
            }
        }
        for consumed in &matrix.consumed {
            if !global_entity_order.contains(&consumed.id) {
                global_entity_order.push(consumed.id.clone());
            }
        }
    }

    let rows = make_quilt(&quilt_nodes_from_matrices(&matrices));
    let layers = build_layers(&matrices, &global_entity_order);
    let legend = global_entity_order
        .iter()
        .enumerate()
        .map(|(index, id)| EntityColor {
            id: id.clone(),
            rgb: color_for_index(index),
        })
        .collect();

    let description = QuiltDescription { rows, layers, legend };
    let json = serde_json::to_vec_pretty(&description).context("serializing quilt description")?;
    std::fs::write(&args.image_file, json)
        .with_context(|| format!("writing {}", args.image_file.display()))?;

    Ok(())
}

fn main() {
    provtool_cli::init_logging("visualisation.log");
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
