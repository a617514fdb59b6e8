//! 3DFACE extraction, for faces placed directly or through a block.

use super::dedup::{dedup_corners, Unique, MAX_CORNERS};
use crate::document::Face3d;
use crate::error::EntityError;
use crate::types::InsertTransform;
use glam::DVec3;

/// Unique corners of one face, ready to be appended to the mesh.
pub type FacePatch = Unique<DVec3>;

/// Extract a face placed directly in model space.
pub fn extract_face(face: &Face3d, tolerance: f64) -> Result<FacePatch, EntityError> {
    extract_with(face, tolerance, Ok)
}

/// Extract a block-nested face, mapping each corner through the instance's
/// placement before merging.
pub fn extract_transformed_face(
    face: &Face3d,
    transform: &InsertTransform,
    tolerance: f64,
) -> Result<FacePatch, EntityError> {
    extract_with(face, tolerance, |corner| {
        let world = transform.transform_point(corner);
        if world.is_finite() {
            Ok(world)
        } else {
            Err(EntityError::NonFiniteTransform)
        }
    })
}

fn extract_with<F>(face: &Face3d, tolerance: f64, map: F) -> Result<FacePatch, EntityError>
where
    F: Fn(DVec3) -> Result<DVec3, EntityError>,
{
    let mut corners = [DVec3::ZERO; MAX_CORNERS];
    let mut present = 0;

    for (slot, corner) in face.corners.iter().enumerate() {
        let Some(corner) = corner else {
            continue;
        };
        if !corner.is_finite() {
            return Err(EntityError::NonFiniteCoordinate(slot));
        }
        corners[present] = map(*corner)?;
        present += 1;
    }

    if present < 3 {
        return Err(EntityError::TooFewCorners(present));
    }

    let unique = dedup_corners(corners[..present].iter().copied(), tolerance);
    if unique.len() < 3 {
        return Err(EntityError::Degenerate(unique.len()));
    }

    Ok(unique)
}
