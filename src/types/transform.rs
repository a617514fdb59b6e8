//! Placement transforms for block instances.

use glam::{DMat4, DVec3, DVec4};

/// Below this magnitude on both X and Y the arbitrary axis algorithm
/// derives the OCS X axis from world Y instead of world Z.
const ARBITRARY_AXIS_LIMIT: f64 = 1.0 / 64.0;

/// Placement attributes of a block instance, as stored on the INSERT entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Insertion point, in the instance's object coordinate system.
    pub location: DVec3,
    /// Per-axis scale factors.
    pub scale: DVec3,
    /// Rotation about the OCS Z axis, in degrees.
    pub rotation_degrees: f64,
    /// Extrusion direction defining the OCS.
    pub extrusion: DVec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            scale: DVec3::ONE,
            rotation_degrees: 0.0,
            extrusion: DVec3::Z,
        }
    }
}

impl Placement {
    pub fn at(location: DVec3) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_extrusion(mut self, extrusion: DVec3) -> Self {
        self.extrusion = extrusion;
        self
    }
}

/// World transform of one block instance.
///
/// Maps block-local coordinates to world coordinates:
/// `OCS · T(location) · Rz(rotation) · S(scale) · T(-base_point)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertTransform {
    matrix: DMat4,
}

impl InsertTransform {
    /// Compose the transform for a placement and its block's base point.
    pub fn new(placement: &Placement, base_point: DVec3) -> Self {
        let local = DMat4::from_translation(placement.location)
            * DMat4::from_rotation_z(placement.rotation_degrees.to_radians())
            * DMat4::from_scale(placement.scale)
            * DMat4::from_translation(-base_point);

        Self {
            matrix: ocs_matrix(placement.extrusion) * local,
        }
    }

    /// A pure translation.
    pub fn from_translation(offset: DVec3) -> Self {
        Self {
            matrix: DMat4::from_translation(offset),
        }
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.matrix.transform_point3(point)
    }
}

/// Object coordinate system for an extrusion direction.
///
/// Columns are the OCS axes expressed in world coordinates. A zero
/// extrusion falls back to the world system.
pub fn ocs_matrix(extrusion: DVec3) -> DMat4 {
    let normal = extrusion.normalize_or_zero();
    if normal == DVec3::ZERO {
        return DMat4::IDENTITY;
    }

    let x_axis = if normal.x.abs() < ARBITRARY_AXIS_LIMIT && normal.y.abs() < ARBITRARY_AXIS_LIMIT {
        DVec3::Y.cross(normal)
    } else {
        DVec3::Z.cross(normal)
    }
    .normalize();
    let y_axis = normal.cross(x_axis).normalize();

    DMat4::from_cols(
        x_axis.extend(0.0),
        y_axis.extend(0.0),
        normal.extend(0.0),
        DVec4::W,
    )
}
