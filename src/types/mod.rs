//! Shared types used throughout the library.

mod transform;

pub use transform::{ocs_matrix, InsertTransform, Placement};

use glam::DVec3;
use serde::Serialize;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn from_points(points: impl Iterator<Item = DVec3>) -> Option<Self> {
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> DVec3 {
        (DVec3::from(self.min) + DVec3::from(self.max)) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let bounds = BoundingBox::from_points(
            [DVec3::new(1.0, -2.0, 3.0), DVec3::new(-1.0, 4.0, 0.5)].into_iter(),
        )
        .unwrap();

        assert_eq!(bounds.min, [-1.0, -2.0, 0.5]);
        assert_eq!(bounds.max, [1.0, 4.0, 3.0]);
        assert_eq!(bounds.dimensions(), [2.0, 6.0, 2.5]);
        assert_eq!(bounds.center(), DVec3::new(0.0, 1.0, 1.75));
    }

    #[test]
    fn test_bounds_of_nothing() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }
}
