//! Mesh export formats.
//!
//! This module provides exporters for binary STL, Wavefront OBJ and GLB.

pub mod gltf;
pub mod obj;
pub mod stl;

pub use gltf::export_glb;
pub use obj::{export_obj, write_obj};
pub use stl::{export_stl, write_stl};

use crate::error::{ConvertError, Result};
use crate::mesher::Mesh;
use std::path::Path;
use tracing::debug;

/// Output formats, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Glb,
}

impl MeshFormat {
    /// Pick a format from a path's extension. A path without extension is STL.
    pub fn from_path(path: &Path) -> Result<Self> {
        let Some(extension) = path.extension() else {
            return Ok(MeshFormat::Stl);
        };
        match extension.to_string_lossy().to_ascii_lowercase().as_str() {
            "stl" => Ok(MeshFormat::Stl),
            "obj" => Ok(MeshFormat::Obj),
            "glb" => Ok(MeshFormat::Glb),
            other => Err(ConvertError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "stl",
            MeshFormat::Obj => "obj",
            MeshFormat::Glb => "glb",
        }
    }

    /// Serialize a mesh in this format.
    pub fn encode(&self, mesh: &Mesh, name: &str) -> Result<Vec<u8>> {
        match self {
            MeshFormat::Stl => export_stl(mesh),
            MeshFormat::Obj => export_obj(mesh, name).map(String::into_bytes),
            MeshFormat::Glb => export_glb(mesh),
        }
    }
}

/// Write a mesh to `path` in the format its extension names.
///
/// Returns the number of bytes written.
pub fn write_mesh(mesh: &Mesh, path: &Path) -> Result<u64> {
    let format = MeshFormat::from_path(path)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());

    let bytes = format.encode(mesh, &name)?;
    std::fs::write(path, &bytes)
        .map_err(|e| ConvertError::Export(format!("Failed to write {}: {}", path.display(), e)))?;

    debug!("Wrote {} bytes of {} to {:?}", bytes.len(), format.extension(), path);
    Ok(bytes.len() as u64)
}
