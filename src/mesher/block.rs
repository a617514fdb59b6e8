//! Block instance resolution.
//!
//! Only faces placed directly in a block definition are extracted. Block
//! instances nested inside a block are not followed, so block definitions
//! that reference each other cannot recurse.

use super::face::{extract_transformed_face, FacePatch};
use crate::document::{Block, DrawingSource, Insert};
use crate::error::EntityError;
use crate::types::InsertTransform;

/// A block instance matched to its definition.
#[derive(Debug, Clone)]
pub struct ResolvedInsert<'a> {
    pub block: &'a Block,
    pub transform: InsertTransform,
}

impl<'a> ResolvedInsert<'a> {
    /// Number of faces this instance will contribute.
    pub fn face_count(&self) -> usize {
        self.block.faces().count()
    }

    /// Extract every nested face in world coordinates.
    pub fn faces(
        &self,
        tolerance: f64,
    ) -> impl Iterator<Item = Result<FacePatch, EntityError>> + '_ {
        self.block
            .faces()
            .map(move |face| extract_transformed_face(face, &self.transform, tolerance))
    }
}

/// Resolve a block instance against the drawing's block definitions.
///
/// Returns `None` when the named block is undefined; that is not an error.
pub fn resolve_insert<'a, S>(source: &'a S, insert: &Insert) -> Option<ResolvedInsert<'a>>
where
    S: DrawingSource + ?Sized,
{
    let block = source.block(&insert.block_name)?;
    Some(ResolvedInsert {
        block,
        transform: InsertTransform::new(&insert.placement, block.base_point),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Drawing, Entity, Face3d};
    use crate::mesher::dedup::DEFAULT_TOLERANCE;
    use crate::types::Placement;
    use glam::DVec3;

    fn tree_drawing() -> Drawing {
        Drawing::new().with_block(
            Block::new("TREE")
                .with_entity(Entity::Face(Face3d::triangle(DVec3::ZERO, DVec3::X, DVec3::Y)))
                .with_entity(Entity::Face(Face3d::triangle(DVec3::ZERO, DVec3::X, DVec3::X)))
                .with_entity(Entity::Insert(Insert::new("TREE", Placement::default()))),
        )
    }

    #[test]
    fn test_unresolved_block() {
        let drawing = tree_drawing();
        let insert = Insert::new("BUSH", Placement::default());
        assert!(resolve_insert(&drawing, &insert).is_none());
    }

    #[test]
    fn test_nested_faces_are_transformed() {
        let drawing = tree_drawing();
        let insert = Insert::new("tree", Placement::at(DVec3::new(100.0, 200.0, 0.0)));
        let resolved = resolve_insert(&drawing, &insert).unwrap();

        // The self-referencing insert inside the block is not followed.
        assert_eq!(resolved.face_count(), 2);

        let results: Vec<_> = resolved.faces(DEFAULT_TOLERANCE).collect();
        assert_eq!(
            results[0].as_ref().unwrap().as_slice(),
            &[
                DVec3::new(100.0, 200.0, 0.0),
                DVec3::new(101.0, 200.0, 0.0),
                DVec3::new(100.0, 201.0, 0.0),
            ]
        );
        assert_eq!(results[1], Err(EntityError::Degenerate(2)));
    }

    #[test]
    fn test_base_point_is_honoured() {
        let drawing = Drawing::new().with_block(
            Block::new("B")
                .with_base_point(DVec3::new(1.0, 1.0, 0.0))
                .with_entity(Entity::Face(Face3d::triangle(
                    DVec3::new(1.0, 1.0, 0.0),
                    DVec3::new(2.0, 1.0, 0.0),
                    DVec3::new(1.0, 2.0, 0.0),
                ))),
        );
        let insert = Insert::new("B", Placement::default());
        let resolved = resolve_insert(&drawing, &insert).unwrap();
        let patch = resolved.faces(DEFAULT_TOLERANCE).next().unwrap().unwrap();
        assert_eq!(patch.as_slice()[0], DVec3::ZERO);
    }
}
