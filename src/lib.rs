//! # DXF Mesher
//!
//! A Rust library for turning 3D CAD drawings (DXF) into triangle meshes.
//!
//! ## Overview
//!
//! This library reads a DXF drawing, collects its 3D faces, the faces of
//! placed block instances and its polyface meshes, and produces one
//! triangulated mesh exported as STL, OBJ or GLB.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dxf_mesher::{load_drawing, Converter, write_mesh};
//!
//! // Load a drawing
//! let drawing = load_drawing("path/to/tile.dxf")?;
//!
//! // Generate a single mesh from every supported entity
//! let output = Converter::new().convert(&drawing)?;
//!
//! // Export to STL
//! write_mesh(&output.mesh, Path::new("tile.stl"))?;
//! ```
//!
//! ## Library Integration
//!
//! For drawings that do not come from a DXF file, implement the
//! `DrawingSource` trait or build a `Drawing` by hand:
//!
//! ```ignore
//! use dxf_mesher::{Converter, Drawing, Entity, Face3d};
//!
//! let drawing = Drawing::new().with_entity(Entity::Face(Face3d::triangle(a, b, c)));
//! let output = Converter::new().convert(&drawing)?;
//! ```

pub mod batch;
pub mod document;
pub mod error;
pub mod export;
pub mod mesher;
pub mod types;

#[cfg(test)]
mod fixtures;

// Re-export main types for convenience
pub use batch::{batch_convert, BatchOptions, BatchReport, FileResult};
pub use document::{
    load_drawing, load_drawing_from_str, Block, Drawing, DrawingSource, Entity, Face3d, Insert,
    PolyfaceRecord, Polyline,
};
pub use error::{ConvertError, EntityError, Result};
pub use export::{write_mesh, MeshFormat};
pub use mesher::{
    ConversionOutput, ConversionStats, Converter, ConverterConfig, Mesh, Triangle,
};
pub use types::{BoundingBox, InsertTransform, Placement};

use std::path::{Path, PathBuf};
use tracing::info;

/// Convert one DXF file to a mesh file.
///
/// Without `output`, the mesh is written next to the input as `.stl`.
/// Returns the path that was written.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    config: &ConverterConfig,
) -> Result<PathBuf> {
    if !input.exists() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()));
    }
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension(MeshFormat::Stl.extension()));
    // Reject the format before paying for the conversion.
    MeshFormat::from_path(&output)?;

    info!("Converting {} to {}", input.display(), output.display());
    let drawing = load_drawing(input)?;
    let converted = Converter::with_config(config.clone()).convert(&drawing)?;

    let written = write_mesh(&converted.mesh, &output)?;
    info!(
        "Saved {} ({:.2} MB)",
        output.display(),
        written as f64 / (1024.0 * 1024.0)
    );

    Ok(output)
}
