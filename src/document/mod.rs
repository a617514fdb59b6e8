//! Read-only drawing model consumed by the mesher.
//!
//! The mesher never touches the DXF reader directly. Documents are loaded
//! into this model by [`loader`], or built by hand through the [`Drawing`]
//! builder methods, and then read through the [`DrawingSource`] trait.

pub mod loader;

pub use loader::{load_drawing, load_drawing_from_str};

use crate::types::Placement;
use glam::DVec3;
use std::collections::HashMap;

/// DXF type name of 3D face entities.
pub const FACE_KIND: &str = "3DFACE";
/// DXF type name of block instance entities.
pub const INSERT_KIND: &str = "INSERT";
/// DXF type name of (possibly polyface) polyline entities.
pub const POLYLINE_KIND: &str = "POLYLINE";

/// A planar triangle or quadrilateral given by up to four corners.
///
/// Absent slots are `None`; the mesher gathers present corners in slot order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face3d {
    pub corners: [Option<DVec3>; 4],
}

impl Face3d {
    pub fn new(corners: [Option<DVec3>; 4]) -> Self {
        Self { corners }
    }

    pub fn triangle(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self::new([Some(a), Some(b), Some(c), None])
    }

    pub fn quad(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Self {
        Self::new([Some(a), Some(b), Some(c), Some(d)])
    }
}

/// A placed instance of a named block definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub block_name: String,
    pub placement: Placement,
}

impl Insert {
    pub fn new(block_name: impl Into<String>, placement: Placement) -> Self {
        Self {
            block_name: block_name.into(),
            placement,
        }
    }
}

/// One sub-record of a polyface mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolyfaceRecord {
    /// A vertex table entry.
    Vertex(DVec3),
    /// Up to four signed 1-based vertex indices; 0 marks an unused slot and a
    /// negative index an invisible edge.
    Face([i32; 4]),
}

/// A polyline entity. Only polyface meshes carry mesh geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub is_polyface: bool,
    pub records: Vec<PolyfaceRecord>,
}

impl Polyline {
    pub fn polyface(records: Vec<PolyfaceRecord>) -> Self {
        Self {
            is_polyface: true,
            records,
        }
    }

    /// Vertex table entries in record order.
    pub fn vertex_records(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.records.iter().filter_map(|record| match record {
            PolyfaceRecord::Vertex(point) => Some(*point),
            PolyfaceRecord::Face(_) => None,
        })
    }

    /// Face index records in record order.
    pub fn face_records(&self) -> impl Iterator<Item = [i32; 4]> + '_ {
        self.records.iter().filter_map(|record| match record {
            PolyfaceRecord::Face(indices) => Some(*indices),
            PolyfaceRecord::Vertex(_) => None,
        })
    }
}

/// A drawing entity, reduced to what mesh extraction needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Face(Face3d),
    Insert(Insert),
    Polyline(Polyline),
    /// Any other entity, identified by its DXF type name.
    Other(String),
}

impl Entity {
    /// DXF type name, used for diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Entity::Face(_) => FACE_KIND,
            Entity::Insert(_) => INSERT_KIND,
            Entity::Polyline(_) => POLYLINE_KIND,
            Entity::Other(kind) => kind,
        }
    }
}

/// A named, reusable group of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    /// Block-local point that lands on an instance's insertion point.
    pub base_point: DVec3,
    pub entities: Vec<Entity>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_point: DVec3::ZERO,
            entities: Vec::new(),
        }
    }

    pub fn with_base_point(mut self, base_point: DVec3) -> Self {
        self.base_point = base_point;
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Faces placed directly in this block. Nested block instances are not
    /// followed.
    pub fn faces(&self) -> impl Iterator<Item = &Face3d> + '_ {
        self.entities.iter().filter_map(|entity| match entity {
            Entity::Face(face) => Some(face),
            _ => None,
        })
    }
}

/// Trait for drawing data sources.
pub trait DrawingSource {
    /// Iterate over the entities of the primary drawing space.
    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_>;

    /// Look up a block definition by name.
    fn block(&self, name: &str) -> Option<&Block>;

    /// Number of block definitions.
    fn block_count(&self) -> usize;
}

/// An in-memory drawing: model space entities plus block definitions.
///
/// Block names are matched case-insensitively, as DXF does.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    /// DXF version string, e.g. "R12".
    pub version: String,
    entities: Vec<Entity>,
    blocks: HashMap<String, Block>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.add_entity(entity);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.add_block(block);
        self
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.insert(block_key(&block.name), block);
    }

    /// Number of model space entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl DrawingSource for Drawing {
    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_> {
        Box::new(self.entities.iter())
    }

    fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(&block_key(name))
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

fn block_key(name: &str) -> String {
    name.to_uppercase()
}
