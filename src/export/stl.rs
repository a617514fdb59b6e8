//! Binary STL export.

use crate::error::{ConvertError, Result};
use crate::mesher::Mesh;
use glam::DVec3;
use std::io::Write;

/// Export a mesh to binary STL bytes.
pub fn export_stl(mesh: &Mesh) -> Result<Vec<u8>> {
    if mesh.is_empty() {
        return Err(ConvertError::Export("Cannot export empty mesh".to_string()));
    }

    let mut bytes = Vec::with_capacity(84 + 50 * mesh.triangle_count());
    write_stl(mesh, &mut bytes)
        .map_err(|e| ConvertError::Export(format!("Failed to encode STL: {}", e)))?;
    Ok(bytes)
}

/// Stream a mesh as binary STL. Coordinates are narrowed to `f32`.
pub fn write_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    let triangles = mesh.triangles.iter().map(|triangle| {
        let [a, b, c] = mesh.triangle_positions(triangle);
        stl_io::Triangle {
            normal: stl_io::Normal::new(to_f32(face_normal(a, b, c))),
            vertices: [
                stl_io::Vertex::new(to_f32(a)),
                stl_io::Vertex::new(to_f32(b)),
                stl_io::Vertex::new(to_f32(c)),
            ],
        }
    });
    stl_io::write_stl(writer, triangles)
}

/// Unit normal by the right-hand rule; zero for degenerate triangles.
fn face_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

fn to_f32(v: DVec3) -> [f32; 3] {
    v.as_vec3().to_array()
}
