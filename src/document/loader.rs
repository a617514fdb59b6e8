//! DXF loading through the `dxf` crate.

use super::{Block, Drawing, Entity, Face3d, Insert, PolyfaceRecord, Polyline};
use crate::error::{ConvertError, Result};
use crate::types::Placement;
use dxf::entities::EntityType;
use glam::DVec3;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

/// Polyline flag: the polyline is a polyface mesh.
const POLYLINE_POLYFACE_FLAG: i32 = 64;
/// Vertex flag: the vertex belongs to a polyface mesh.
const VERTEX_POLYFACE_FLAG: i32 = 128;
/// Vertex flag: the vertex carries a coordinate of a 3D mesh.
const VERTEX_MESH_FLAG: i32 = 64;

/// Load a drawing from a DXF file.
///
/// A normal read is tried first. If it fails, the file is read again with
/// invalid UTF-8 replaced before parsing, which recovers most exports with
/// broken text encodings.
pub fn load_drawing<P: AsRef<Path>>(path: P) -> Result<Drawing> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }

    let drawing = match dxf::Drawing::load_file(path) {
        Ok(drawing) => drawing,
        Err(e) => {
            warn!("Normal read of {} failed: {}; trying recovery mode", path.display(), e);
            let bytes = fs::read(path)?;
            let text = String::from_utf8_lossy(&bytes);
            dxf::Drawing::load(&mut Cursor::new(text.as_bytes())).map_err(|e| {
                ConvertError::UnreadableDocument {
                    name: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?
        }
    };

    let drawing = from_dxf(&drawing);
    info!(
        "Loaded DXF version {} with {} model space entities",
        drawing.version,
        drawing.entity_count()
    );
    Ok(drawing)
}

/// Load a drawing from in-memory DXF text.
pub fn load_drawing_from_str(content: &str) -> Result<Drawing> {
    let drawing = dxf::Drawing::load(&mut Cursor::new(content.as_bytes())).map_err(|e| {
        ConvertError::UnreadableDocument {
            name: "<memory>".to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(from_dxf(&drawing))
}

fn from_dxf(source: &dxf::Drawing) -> Drawing {
    let mut drawing = Drawing::new();
    drawing.version = format!("{:?}", source.header.version);

    for entity in source.entities() {
        drawing.add_entity(convert_entity(&entity.specific));
    }

    for block in source.blocks() {
        drawing.add_block(Block {
            name: block.name.clone(),
            base_point: point(&block.base_point),
            entities: block
                .entities
                .iter()
                .map(|entity| convert_entity(&entity.specific))
                .collect(),
        });
    }

    drawing
}

fn convert_entity(specific: &EntityType) -> Entity {
    match specific {
        EntityType::Face3D(face) => Entity::Face(Face3d::new([
            Some(point(&face.first_corner)),
            Some(point(&face.second_corner)),
            Some(point(&face.third_corner)),
            Some(point(&face.fourth_corner)),
        ])),
        EntityType::Insert(insert) => Entity::Insert(Insert::new(
            insert.name.clone(),
            Placement {
                location: point(&insert.location),
                scale: DVec3::new(
                    insert.x_scale_factor,
                    insert.y_scale_factor,
                    insert.z_scale_factor,
                ),
                rotation_degrees: insert.rotation,
                extrusion: DVec3::new(
                    insert.extrusion_direction.x,
                    insert.extrusion_direction.y,
                    insert.extrusion_direction.z,
                ),
            },
        )),
        EntityType::Polyline(polyline) => Entity::Polyline(convert_polyline(polyline)),
        other => Entity::Other(type_name(other).to_string()),
    }
}

fn convert_polyline(polyline: &dxf::entities::Polyline) -> Polyline {
    let is_polyface = polyline.flags & POLYLINE_POLYFACE_FLAG != 0;
    if !is_polyface {
        return Polyline::default();
    }

    let records = polyline
        .vertices()
        .map(|vertex| {
            let is_face_record = vertex.flags & VERTEX_POLYFACE_FLAG != 0
                && vertex.flags & VERTEX_MESH_FLAG == 0;
            if is_face_record {
                PolyfaceRecord::Face([
                    vertex.polyface_mesh_vertex_index1,
                    vertex.polyface_mesh_vertex_index2,
                    vertex.polyface_mesh_vertex_index3,
                    vertex.polyface_mesh_vertex_index4,
                ])
            } else {
                PolyfaceRecord::Vertex(point(&vertex.location))
            }
        })
        .collect();

    Polyline::polyface(records)
}

fn point(p: &dxf::Point) -> DVec3 {
    DVec3::new(p.x, p.y, p.z)
}

fn type_name(specific: &EntityType) -> &'static str {
    match specific {
        EntityType::Line(_) => "LINE",
        EntityType::LwPolyline(_) => "LWPOLYLINE",
        EntityType::Circle(_) => "CIRCLE",
        EntityType::Arc(_) => "ARC",
        EntityType::Text(_) => "TEXT",
        EntityType::MText(_) => "MTEXT",
        EntityType::ModelPoint(_) => "POINT",
        EntityType::Spline(_) => "SPLINE",
        EntityType::Ellipse(_) => "ELLIPSE",
        EntityType::RotatedDimension(_)
        | EntityType::RadialDimension(_)
        | EntityType::DiameterDimension(_)
        | EntityType::AngularThreePointDimension(_)
        | EntityType::OrdinateDimension(_) => "DIMENSION",
        _ => "OTHER",
    }
}
