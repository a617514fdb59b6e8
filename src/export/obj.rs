//! Wavefront OBJ export.
//!
//! OBJ is a simple, widely-supported text-based 3D format. Positions are
//! written at full precision, so survey coordinates survive unchanged.

use crate::error::{ConvertError, Result};
use crate::mesher::Mesh;
use std::io::Write;

/// Export a mesh to OBJ text.
pub fn export_obj(mesh: &Mesh, name: &str) -> Result<String> {
    if mesh.is_empty() {
        return Err(ConvertError::Export("Cannot export empty mesh".to_string()));
    }

    // ~60 bytes per vertex line, ~30 per face
    let mut obj = Vec::with_capacity(256 + mesh.vertex_count() * 60 + mesh.triangle_count() * 30);
    write_obj(mesh, name, &mut obj)
        .map_err(|e| ConvertError::Export(format!("Failed to encode OBJ: {}", e)))?;

    String::from_utf8(obj).map_err(|e| ConvertError::Export(e.to_string()))
}

/// Stream a mesh as OBJ.
pub fn write_obj<W: Write>(mesh: &Mesh, name: &str, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# DXF Mesher OBJ Export")?;
    writeln!(writer, "# Vertices: {}", mesh.vertex_count())?;
    writeln!(writer, "# Triangles: {}", mesh.triangle_count())?;
    writeln!(writer)?;
    writeln!(writer, "o {}", name)?;

    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    writeln!(writer)?;

    // OBJ indices are 1-based
    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.indices();
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::MeshBuilder;
    use glam::DVec3;

    #[test]
    fn test_export_simple_obj() {
        let mut builder = MeshBuilder::new();
        builder.add_face(&[
            DVec3::new(512000.25, 5403000.5, 12.0),
            DVec3::new(512001.25, 5403000.5, 12.0),
            DVec3::new(512000.25, 5403001.5, 12.5),
        ]);
        let mesh = builder.build(0, 0).unwrap();

        let obj = export_obj(&mesh, "tile").unwrap();

        assert!(obj.contains("o tile"));
        assert!(obj.contains("v 512000.25 5403000.5 12"));
        assert!(obj.contains("v 512000.25 5403001.5 12.5"));
        assert!(obj.contains("f 1 2 3"));
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        assert!(export_obj(&Mesh::new(), "empty").is_err());
    }
}
