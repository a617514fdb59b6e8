//! Mesh geometry types.

use crate::error::{ConvertError, Result};
use crate::types::BoundingBox;
use glam::DVec3;

/// A triangle referencing three distinct vertices of its mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle(pub [u32; 3]);

impl Triangle {
    pub fn new(i0: u32, i1: u32, i2: u32) -> Self {
        Self([i0, i1, i2])
    }

    pub fn indices(&self) -> [u32; 3] {
        self.0
    }

    /// Check that all indices are distinct and below `vertex_count`.
    pub fn is_valid(&self, vertex_count: usize) -> bool {
        let [a, b, c] = self.0;
        a != b && b != c && a != c && self.0.iter().all(|&i| (i as usize) < vertex_count)
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions, in drawing units.
    pub vertices: Vec<DVec3>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().copied())
    }

    /// The three corner positions of a triangle.
    pub fn triangle_positions(&self, triangle: &Triangle) -> [DVec3; 3] {
        triangle.0.map(|i| self.vertices[i as usize])
    }

    /// Get indices as a flat array (for glTF export).
    pub fn indices_flat(&self) -> Vec<u32> {
        self.triangles.iter().flat_map(|t| t.0).collect()
    }
}

/// Append-only accumulation buffer for one conversion.
///
/// Every triangle is appended after the vertices it references, so indices
/// are always in range at the time of the append.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(position);
        index
    }

    /// Add a triangle by vertex indices.
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        let triangle = Triangle::new(i0, i1, i2);
        debug_assert!(triangle.is_valid(self.mesh.vertices.len()));
        self.mesh.triangles.push(triangle);
    }

    /// Fan-triangulate a polygon around its first index.
    ///
    /// Three indices give one triangle; four give (0,1,2) and (0,2,3).
    /// Fewer than three add nothing.
    pub fn add_fan(&mut self, indices: &[u32]) -> usize {
        if indices.len() < 3 {
            return 0;
        }
        for k in 1..indices.len() - 1 {
            self.add_triangle(indices[0], indices[k], indices[k + 1]);
        }
        indices.len() - 2
    }

    /// Append a face's corners as fresh vertices and fan-triangulate them.
    /// Returns the number of triangles added.
    pub fn add_face(&mut self, corners: &[DVec3]) -> usize {
        if corners.len() < 3 {
            return 0;
        }
        let start = self.add_vertex(corners[0]);
        for corner in &corners[1..] {
            self.add_vertex(*corner);
        }
        let indices: Vec<u32> = (start..start + corners.len() as u32).collect();
        self.add_fan(&indices)
    }

    /// Borrow the geometry accumulated so far.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Finish accumulation.
    ///
    /// Fails with [`ConvertError::EmptyGeometry`] when either buffer is empty;
    /// such a mesh cannot be exported.
    pub fn build(self, invalid_faces: usize, invalid_polyfaces: usize) -> Result<Mesh> {
        if self.mesh.vertices.is_empty() || self.mesh.triangles.is_empty() {
            return Err(ConvertError::EmptyGeometry {
                invalid_faces,
                invalid_polyfaces,
            });
        }
        Ok(self.mesh)
    }
}
