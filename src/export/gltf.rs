//! glTF/GLB export.

use crate::error::{ConvertError, Result};
use crate::mesher::Mesh;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;

/// Export a mesh to GLB format (binary glTF).
///
/// Survey coordinates do not fit `f32` precision, so positions are stored
/// relative to the bounding box center and the node carries the center as
/// its translation.
pub fn export_glb(mesh: &Mesh) -> Result<Vec<u8>> {
    let bounds = mesh
        .bounds()
        .filter(|_| !mesh.is_empty())
        .ok_or_else(|| ConvertError::Export("Cannot export empty mesh".to_string()))?;
    let center = bounds.center();

    let positions: Vec<[f32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| (*v - center).as_vec3().to_array())
        .collect();
    let indices = mesh.indices_flat();

    let (min, max) = local_bounds(&positions);

    // Build the binary buffer: positions, then indices. Both are 4-byte aligned.
    let mut buffer_data: Vec<u8> = Vec::with_capacity(positions.len() * 12 + indices.len() * 4);
    for p in &positions {
        for c in p {
            buffer_data.extend_from_slice(&c.to_le_bytes());
        }
    }
    let idx_offset = buffer_data.len();
    for i in &indices {
        buffer_data.extend_from_slice(&i.to_le_bytes());
    }
    let total_buffer_size = buffer_data.len();

    let buffer_views = vec![
        create_buffer_view(0, idx_offset, json::buffer::Target::ArrayBuffer),
        create_buffer_view(
            idx_offset,
            total_buffer_size - idx_offset,
            json::buffer::Target::ElementArrayBuffer,
        ),
    ];
    let accessors = vec![
        create_accessor(
            0,
            positions.len(),
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            Some(min),
            Some(max),
        ),
        create_accessor(
            1,
            indices.len(),
            json::accessor::Type::Scalar,
            json::accessor::ComponentType::U32,
            None,
            None,
        ),
    ];

    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(0));
    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(1)),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    // Build glTF JSON
    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives: vec![primitive],
            weights: None,
        }],
        nodes: vec![json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: Some(center.as_vec3().to_array()),
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ConvertError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    Ok(pack_glb(json_string.as_bytes(), &buffer_data))
}

/// Wrap a JSON chunk and a binary chunk into a GLB container.
fn pack_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat(0u8).take(buffer_padding));

    glb
}

fn local_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    (min, max)
}

/// Create a buffer view.
fn create_buffer_view(
    offset: usize,
    size: usize,
    target: json::buffer::Target,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: Some(Valid(target)),
    }
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::MeshBuilder;
    use glam::DVec3;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn test_export_simple_mesh() {
        let mut builder = MeshBuilder::new();
        builder.add_face(&[
            DVec3::new(100.0, 200.0, 0.0),
            DVec3::new(101.0, 200.0, 0.0),
            DVec3::new(100.0, 201.0, 0.0),
        ]);
        let mesh = builder.build(0, 0).unwrap();

        let glb = export_glb(&mesh).unwrap();

        // Check GLB header
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());

        let json_len = read_u32(&glb, 12) as usize;
        let root: serde_json::Value = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
        assert_eq!(root["accessors"][0]["count"], 3);
        assert_eq!(root["accessors"][1]["count"], 3);
        assert_eq!(root["nodes"][0]["translation"][0], 100.5);
    }

    #[test]
    fn test_pack_glb_pads_chunks() {
        let glb = pack_glb(br#"{"a":1}"#, &[1, 2, 3, 4, 5]);

        // Header, then two chunks padded from 7 and 5 bytes up to 8.
        assert_eq!(glb.len(), 12 + 8 + 8 + 8 + 8);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());

        assert_eq!(read_u32(&glb, 12), 8);
        assert_eq!(read_u32(&glb, 16), 0x4E4F534A);
        assert_eq!(&glb[20..27], br#"{"a":1}"#);
        assert_eq!(glb[27], 0x20);

        assert_eq!(read_u32(&glb, 28), 8);
        assert_eq!(read_u32(&glb, 32), 0x004E4942);
        assert_eq!(&glb[36..41], &[1, 2, 3, 4, 5]);
        assert_eq!(&glb[41..], &[0, 0, 0]);
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        assert!(export_glb(&Mesh::new()).is_err());
    }
}
