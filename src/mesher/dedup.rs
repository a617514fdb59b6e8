//! Per-face corner merging.
//!
//! Merging is local to the (at most four) corners of one face or polyface
//! record. Coincident corners of neighbouring entities are never merged.

use glam::DVec3;

/// Default per-axis merge tolerance, in drawing units.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Maximum number of corners one face can carry.
pub const MAX_CORNERS: usize = 4;

/// Up to [`MAX_CORNERS`] items that survived merging, in input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unique<T> {
    items: [T; MAX_CORNERS],
    len: usize,
}

impl<T: Copy + Default> Default for Unique<T> {
    fn default() -> Self {
        Self {
            items: [T::default(); MAX_CORNERS],
            len: 0,
        }
    }
}

impl<T: Copy + Default> Unique<T> {
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn map<U: Copy + Default>(&self, f: impl Fn(T) -> U) -> Unique<U> {
        let mut mapped = Unique::default();
        for item in self.as_slice() {
            mapped.items[mapped.len] = f(*item);
            mapped.len += 1;
        }
        mapped
    }
}

/// Whether two points lie strictly within `tolerance` on every axis.
pub fn within_tolerance(a: DVec3, b: DVec3, tolerance: f64) -> bool {
    (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance && (a.z - b.z).abs() < tolerance
}

/// Merge corners of one face.
///
/// A corner is dropped when it lies within tolerance of an earlier
/// *accepted* corner; the first occurrence wins.
pub fn dedup_corners(corners: impl IntoIterator<Item = DVec3>, tolerance: f64) -> Unique<DVec3> {
    dedup_by_position(corners, |p| *p, tolerance)
}

/// Merge arbitrary items by the position `position` extracts from them.
///
/// Input beyond [`MAX_CORNERS`] accepted items is ignored.
pub fn dedup_by_position<T, F>(
    items: impl IntoIterator<Item = T>,
    position: F,
    tolerance: f64,
) -> Unique<T>
where
    T: Copy + Default,
    F: Fn(&T) -> DVec3,
{
    let mut unique = Unique::default();

    for item in items {
        let p = position(&item);
        let duplicate = unique
            .as_slice()
            .iter()
            .any(|accepted| within_tolerance(position(accepted), p, tolerance));
        if duplicate {
            continue;
        }
        if unique.len == MAX_CORNERS {
            break;
        }
        unique.items[unique.len] = item;
        unique.len += 1;
    }

    unique
}
