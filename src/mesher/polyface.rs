//! Polyface mesh decoding.
//!
//! A polyface mesh is a POLYLINE whose sub-records are either vertex table
//! entries or face records holding up to four signed 1-based indices into
//! that table. Indices are local to the entity.

use super::dedup::{dedup_by_position, Unique};
use super::geometry::MeshBuilder;
use crate::document::Polyline;
use crate::error::EntityError;
use glam::DVec3;

/// A decoded polyface mesh, indexed by local vertex ordinal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPolyface {
    pub vertices: Vec<DVec3>,
    pub faces: Vec<Unique<u32>>,
    /// Face records that resolved to fewer than three corners.
    pub dropped_records: usize,
}

impl DecodedPolyface {
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|face| face.len() - 2).sum()
    }

    /// Append the vertex table, then the faces shifted to global indices.
    ///
    /// Returns the number of triangles added.
    pub fn commit(&self, builder: &mut MeshBuilder) -> usize {
        let offset = builder.vertex_count() as u32;
        for vertex in &self.vertices {
            builder.add_vertex(*vertex);
        }

        self.faces
            .iter()
            .map(|face| builder.add_fan(face.map(|ordinal| ordinal + offset).as_slice()))
            .sum()
    }
}

/// Decode a polyface polyline.
///
/// Zero indices and indices outside the vertex table never resolve. Corners
/// repeating an earlier corner of the same record (same index, or within
/// `tolerance` on every axis) are merged, so each face keeps distinct
/// vertices.
pub fn decode_polyface(
    polyline: &Polyline,
    tolerance: f64,
    max_records: usize,
) -> Result<DecodedPolyface, EntityError> {
    if polyline.records.len() > max_records {
        return Err(EntityError::TooManyRecords {
            count: polyline.records.len(),
            limit: max_records,
        });
    }

    let mut decoded = DecodedPolyface::default();

    for (ordinal, point) in polyline.vertex_records().enumerate() {
        if !point.is_finite() {
            return Err(EntityError::NonFiniteCoordinate(ordinal));
        }
        decoded.vertices.push(point);
    }

    for indices in polyline.face_records() {
        let vertices = &decoded.vertices;
        let corners = indices
            .iter()
            .filter(|&&index| index != 0)
            .map(|&index| index.unsigned_abs() as usize - 1)
            .filter(|&ordinal| ordinal < vertices.len())
            .map(|ordinal| (ordinal as u32, vertices[ordinal]));
        let unique = dedup_by_position(corners, |(_, p)| *p, tolerance);

        if unique.len() >= 3 {
            decoded.faces.push(unique.map(|(ordinal, _)| ordinal));
        } else {
            decoded.dropped_records += 1;
        }
    }

    Ok(decoded)
}
