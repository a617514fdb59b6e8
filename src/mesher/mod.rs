//! Mesh generation from drawings.
//!
//! This module walks the model space of a drawing and turns its faces,
//! block instances and polyface meshes into one triangle mesh.

pub mod block;
pub mod dedup;
pub mod face;
pub mod geometry;
pub mod polyface;
pub mod stats;

pub use geometry::{Mesh, MeshBuilder, Triangle};
pub use stats::{ConversionStats, KindStats, SourceKind};

use crate::document::{DrawingSource, Entity, Face3d, Insert, Polyline};
use crate::error::{ConvertError, EntityError, Result};
use crate::types::BoundingBox;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

const FACE_PROGRESS_INTERVAL: usize = 10_000;
const BLOCK_PROGRESS_INTERVAL: usize = 100;
const POLYFACE_PROGRESS_INTERVAL: usize = 50;
const TOP_KINDS_LOGGED: usize = 10;

/// Main converter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Per-axis distance below which corners of one face are merged.
    pub tolerance: f64,
    /// Invalid entities logged per counter family before going quiet.
    pub max_logged_warnings: usize,
    /// Total block-nested faces processed per file.
    pub max_block_faces: usize,
    /// Sub-records accepted in one polyface mesh.
    pub max_polyface_records: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            tolerance: dedup::DEFAULT_TOLERANCE,
            max_logged_warnings: 5,
            max_block_faces: 5_000_000,
            max_polyface_records: 10_000_000,
        }
    }
}

impl ConverterConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_logged_warnings(mut self, max: usize) -> Self {
        self.max_logged_warnings = max;
        self
    }

    pub fn with_max_block_faces(mut self, max: usize) -> Self {
        self.max_block_faces = max;
        self
    }

    pub fn with_max_polyface_records(mut self, max: usize) -> Self {
        self.max_polyface_records = max;
        self
    }

    /// Load a configuration from a JSON file. Missing fields keep their
    /// defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConvertError::Config(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Output from the converter.
#[derive(Debug)]
pub struct ConversionOutput {
    pub mesh: Mesh,
    pub stats: ConversionStats,
    /// Bounding box of the mesh.
    pub bounds: BoundingBox,
}

/// Geometry and counters gathered by all pipelines, before validation.
#[derive(Debug, Default)]
pub struct Extraction {
    pub builder: MeshBuilder,
    pub stats: ConversionStats,
}

impl Extraction {
    /// Validate the accumulated buffer and hand it out as a finished mesh.
    pub fn assemble(self) -> Result<ConversionOutput> {
        let Extraction { builder, stats } = self;
        let mesh = builder.build(stats.faces.invalid, stats.polyfaces.invalid)?;
        let bounds = mesh.bounds().ok_or(ConvertError::EmptyGeometry {
            invalid_faces: stats.faces.invalid,
            invalid_polyfaces: stats.polyfaces.invalid,
        })?;

        info!(
            "Mesh assembled: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        info!(
            "Bounds: min {:?}, max {:?}, size {:?}",
            bounds.min,
            bounds.max,
            bounds.dimensions()
        );

        Ok(ConversionOutput { mesh, stats, bounds })
    }
}

/// The main converter struct.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    /// Create a new converter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new converter with custom configuration.
    pub fn with_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a drawing into a single mesh.
    pub fn convert<S: DrawingSource + ?Sized>(&self, source: &S) -> Result<ConversionOutput> {
        self.extract(source).assemble()
    }

    /// Run all extraction pipelines without validating the result.
    ///
    /// Faces run first, then block instances, then polyface meshes. The
    /// order only affects diagnostic output.
    pub fn extract<S: DrawingSource + ?Sized>(&self, source: &S) -> Extraction {
        let mut extraction = Extraction::default();

        let mut faces = Vec::new();
        let mut inserts = Vec::new();
        let mut polyfaces = Vec::new();

        for entity in source.entities() {
            extraction.stats.count_entity(entity.kind());
            match entity {
                Entity::Face(face) => faces.push(face),
                Entity::Insert(insert) => inserts.push(insert),
                Entity::Polyline(polyline) if polyline.is_polyface => polyfaces.push(polyline),
                _ => {}
            }
        }

        info!("Entity types in model space:");
        for (kind, count) in extraction.stats.top_kinds(TOP_KINDS_LOGGED) {
            info!("  {}: {}", kind, count);
        }

        self.extract_faces(&faces, &mut extraction);
        self.extract_inserts(source, &inserts, &mut extraction);
        self.extract_polyfaces(&polyfaces, &mut extraction);

        let stats = &extraction.stats;
        info!(
            "Faces: {} valid, {} invalid; polyface meshes: {} valid, {} invalid",
            stats.faces.valid, stats.faces.invalid, stats.polyfaces.valid, stats.polyfaces.invalid
        );

        extraction
    }

    fn extract_faces(&self, faces: &[&Face3d], extraction: &mut Extraction) {
        info!("Processing {} 3DFACE entities", faces.len());

        for (index, face) in faces.iter().enumerate() {
            let result = face::extract_face(face, self.config.tolerance);
            self.commit_face(result, SourceKind::DirectFace, index, extraction);

            if (index + 1) % FACE_PROGRESS_INTERVAL == 0 {
                debug!("Processed {}/{} faces", index + 1, faces.len());
            }
        }
    }

    fn extract_inserts<S: DrawingSource + ?Sized>(
        &self,
        source: &S,
        inserts: &[&Insert],
        extraction: &mut Extraction,
    ) {
        if inserts.is_empty() {
            return;
        }
        info!(
            "Processing {} block instances against {} block definitions",
            inserts.len(),
            source.block_count()
        );

        let mut block_faces = 0usize;
        let mut exhausted = false;

        for (index, insert) in inserts.iter().enumerate() {
            let Some(resolved) = block::resolve_insert(source, insert) else {
                extraction.stats.unresolved_inserts += 1;
                debug!("Block '{}' is not defined, skipping instance", insert.block_name);
                continue;
            };

            let face_count = resolved.face_count();
            if !exhausted && block_faces + face_count > self.config.max_block_faces {
                warn!(
                    "Block face limit of {} reached, skipping remaining block instances",
                    self.config.max_block_faces
                );
                exhausted = true;
            }
            // Once the budget runs out, later instances are skipped even if they would fit.
            if exhausted {
                extraction.stats.skipped_inserts += 1;
                continue;
            }
            block_faces += face_count;
            extraction.stats.resolved_inserts += 1;

            for result in resolved.faces(self.config.tolerance) {
                self.commit_face(result, SourceKind::BlockFace, index, extraction);
            }

            if extraction.stats.resolved_inserts % BLOCK_PROGRESS_INTERVAL == 0 {
                debug!(
                    "Resolved {}/{} block instances",
                    extraction.stats.resolved_inserts,
                    inserts.len()
                );
            }
        }

        if extraction.stats.unresolved_inserts > 0 {
            info!(
                "{} block instances reference undefined blocks",
                extraction.stats.unresolved_inserts
            );
        }
    }

    fn extract_polyfaces(&self, polyfaces: &[&Polyline], extraction: &mut Extraction) {
        if polyfaces.is_empty() {
            return;
        }
        info!("Processing {} polyface meshes", polyfaces.len());

        for (index, polyline) in polyfaces.iter().enumerate() {
            let result = polyface::decode_polyface(
                polyline,
                self.config.tolerance,
                self.config.max_polyface_records,
            );
            match result {
                Ok(decoded) => {
                    extraction.stats.dropped_face_records += decoded.dropped_records;
                    decoded.commit(&mut extraction.builder);
                    extraction.stats.record_valid(SourceKind::Polyface);
                }
                Err(err) => {
                    self.reject(SourceKind::Polyface, index, &err, extraction);
                }
            }

            if (index + 1) % POLYFACE_PROGRESS_INTERVAL == 0 {
                debug!("Processed {}/{} polyface meshes", index + 1, polyfaces.len());
            }
        }

        if extraction.stats.dropped_face_records > 0 {
            debug!(
                "Dropped {} polyface face records with fewer than 3 corners",
                extraction.stats.dropped_face_records
            );
        }
    }

    fn commit_face(
        &self,
        result: std::result::Result<face::FacePatch, EntityError>,
        kind: SourceKind,
        index: usize,
        extraction: &mut Extraction,
    ) {
        match result {
            Ok(patch) => {
                extraction.builder.add_face(patch.as_slice());
                extraction.stats.record_valid(kind);
            }
            Err(err) => {
                self.reject(kind, index, &err, extraction);
            }
        }
    }

    /// Count an invalid entity, logging only the first few of its family.
    ///
    /// Returns whether a warning was logged for it.
    fn reject(
        &self,
        kind: SourceKind,
        index: usize,
        err: &EntityError,
        extraction: &mut Extraction,
    ) -> bool {
        let invalid = extraction.stats.record_invalid(kind);
        if invalid > self.config.max_logged_warnings {
            return false;
        }
        warn!("Skipping {} #{}: {}", kind.label(), index, err);
        if invalid == self.config.max_logged_warnings {
            warn!("Further invalid {} entities will not be logged", kind.label());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Drawing, PolyfaceRecord};
    use crate::types::Placement;
    use glam::DVec3;

    fn face_entity(a: DVec3, b: DVec3, c: DVec3) -> Entity {
        Entity::Face(Face3d::triangle(a, b, c))
    }

    #[test]
    fn test_single_quad_face() {
        let drawing = Drawing::new().with_entity(Entity::Face(Face3d::quad(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::Y,
        )));

        let output = Converter::new().convert(&drawing).unwrap();
        assert_eq!(output.mesh.vertex_count(), 4);
        assert_eq!(output.mesh.triangles, vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)]);
        assert_eq!(output.stats.faces, KindStats { valid: 1, invalid: 0 });
    }

    #[test]
    fn test_translated_block_instance() {
        let drawing = Drawing::new()
            .with_block(Block::new("TRI").with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y)))
            .with_entity(Entity::Insert(Insert::new(
                "TRI",
                Placement::at(DVec3::new(100.0, 200.0, 0.0)),
            )));

        let output = Converter::new().convert(&drawing).unwrap();
        assert_eq!(
            output.mesh.vertices,
            vec![
                DVec3::new(100.0, 200.0, 0.0),
                DVec3::new(101.0, 200.0, 0.0),
                DVec3::new(100.0, 201.0, 0.0),
            ]
        );
        assert_eq!(output.mesh.triangles, vec![Triangle::new(0, 1, 2)]);
        assert_eq!(output.stats.resolved_inserts, 1);
        assert_eq!(output.bounds.min, [100.0, 200.0, 0.0]);
    }

    #[test]
    fn test_only_malformed_face_is_empty_geometry() {
        let drawing = Drawing::new().with_entity(face_entity(
            DVec3::ZERO,
            DVec3::new(0.0, f64::NAN, 0.0),
            DVec3::Y,
        ));

        let extraction = Converter::new().extract(&drawing);
        assert_eq!(extraction.stats.faces, KindStats { valid: 0, invalid: 1 });

        let err = extraction.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConvertError::EmptyGeometry {
                invalid_faces: 1,
                invalid_polyfaces: 0
            }
        ));
    }

    #[test]
    fn test_degenerate_face_counts_invalid() {
        let drawing = Drawing::new()
            .with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y))
            .with_entity(face_entity(DVec3::ZERO, DVec3::splat(0.0005), DVec3::Y));

        let output = Converter::new().convert(&drawing).unwrap();
        assert_eq!(output.mesh.triangle_count(), 1);
        assert_eq!(output.stats.faces, KindStats { valid: 1, invalid: 1 });
    }

    #[test]
    fn test_empty_drawing() {
        let result = Converter::new().convert(&Drawing::new());
        assert!(matches!(result, Err(ConvertError::EmptyGeometry { .. })));
    }

    #[test]
    fn test_unrecognized_kinds_are_ignored() {
        let drawing = Drawing::new()
            .with_entity(Entity::Other("LINE".to_string()))
            .with_entity(Entity::Other("CIRCLE".to_string()))
            .with_entity(Entity::Polyline(Polyline::default()))
            .with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y));

        let output = Converter::new().convert(&drawing).unwrap();
        assert_eq!(output.stats.entity_count("LINE"), 1);
        assert_eq!(output.stats.entity_count("POLYLINE"), 1);
        assert_eq!(output.stats.faces.processed(), 1);
        assert_eq!(output.stats.polyfaces.processed(), 0);
    }

    #[test]
    fn test_unresolved_block_is_not_invalid() {
        let drawing = Drawing::new()
            .with_entity(Entity::Insert(Insert::new("MISSING", Placement::default())))
            .with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y));

        let output = Converter::new().convert(&drawing).unwrap();
        assert_eq!(output.stats.unresolved_inserts, 1);
        assert_eq!(output.stats.faces.invalid, 0);
    }

    #[test]
    fn test_block_face_budget() {
        let drawing = Drawing::new()
            .with_block(
                Block::new("PAIR")
                    .with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y))
                    .with_entity(face_entity(DVec3::Z, DVec3::X, DVec3::Y)),
            )
            .with_entity(Entity::Insert(Insert::new("PAIR", Placement::default())))
            .with_entity(Entity::Insert(Insert::new("PAIR", Placement::at(DVec3::X))));

        let converter = Converter::with_config(ConverterConfig::default().with_max_block_faces(3));
        let output = converter.convert(&drawing).unwrap();
        assert_eq!(output.stats.resolved_inserts, 1);
        assert_eq!(output.stats.skipped_inserts, 1);
        assert_eq!(output.mesh.triangle_count(), 2);
    }

    #[test]
    fn test_block_face_budget_stays_exhausted() {
        let drawing = Drawing::new()
            .with_block(
                Block::new("PAIR")
                    .with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y))
                    .with_entity(face_entity(DVec3::Z, DVec3::X, DVec3::Y)),
            )
            .with_block(Block::new("TRI").with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y)))
            .with_entity(Entity::Insert(Insert::new("PAIR", Placement::default())))
            .with_entity(Entity::Insert(Insert::new("PAIR", Placement::at(DVec3::X))))
            .with_entity(Entity::Insert(Insert::new("TRI", Placement::at(DVec3::Y))));

        // The TRI instance would fit the remaining budget of 1 but comes after the overflow.
        let converter = Converter::with_config(ConverterConfig::default().with_max_block_faces(3));
        let output = converter.convert(&drawing).unwrap();
        assert_eq!(output.stats.resolved_inserts, 1);
        assert_eq!(output.stats.skipped_inserts, 2);
        assert_eq!(output.mesh.triangle_count(), 2);
    }

    #[test]
    fn test_warning_cap_spans_direct_and_block_faces() {
        let converter = Converter::new();
        let mut extraction = Extraction::default();
        let err = EntityError::Degenerate(2);

        let logged: Vec<bool> = (0..7)
            .map(|i| {
                let kind = if i % 2 == 0 { SourceKind::DirectFace } else { SourceKind::BlockFace };
                converter.reject(kind, i, &err, &mut extraction)
            })
            .collect();
        assert_eq!(logged, [true, true, true, true, true, false, false]);
        assert_eq!(extraction.stats.faces.invalid, 7);

        // Polyface meshes keep their own budget.
        assert!(converter.reject(SourceKind::Polyface, 0, &err, &mut extraction));
        assert_eq!(extraction.stats.polyfaces.invalid, 1);
    }

    #[test]
    fn test_all_pipelines_share_one_buffer() {
        let drawing = Drawing::new()
            .with_entity(Entity::Polyline(Polyline::polyface(vec![
                PolyfaceRecord::Vertex(DVec3::ZERO),
                PolyfaceRecord::Vertex(DVec3::X),
                PolyfaceRecord::Vertex(DVec3::Y),
                PolyfaceRecord::Face([1, 2, 3, 0]),
                PolyfaceRecord::Face([1, 1, 0, 0]),
            ])))
            .with_block(Block::new("TRI").with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y)))
            .with_entity(Entity::Insert(Insert::new("TRI", Placement::at(DVec3::Z))))
            .with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y));

        let output = Converter::new().convert(&drawing).unwrap();
        // Direct face, then block instance, then the polyface entity.
        assert_eq!(
            output.mesh.triangles,
            vec![Triangle::new(0, 1, 2), Triangle::new(3, 4, 5), Triangle::new(6, 7, 8)]
        );
        assert_eq!(output.mesh.vertices[3], DVec3::Z);
        assert_eq!(output.stats.polyfaces, KindStats { valid: 1, invalid: 0 });
        assert_eq!(output.stats.dropped_face_records, 1);
        assert!(output
            .mesh
            .triangles
            .iter()
            .all(|t| t.is_valid(output.mesh.vertex_count())));
    }

    #[test]
    fn test_malformed_polyface_leaves_buffer_untouched() {
        let drawing = Drawing::new()
            .with_entity(face_entity(DVec3::ZERO, DVec3::X, DVec3::Y))
            .with_entity(Entity::Polyline(Polyline::polyface(vec![
                PolyfaceRecord::Vertex(DVec3::ZERO),
                PolyfaceRecord::Vertex(DVec3::new(f64::INFINITY, 0.0, 0.0)),
                PolyfaceRecord::Vertex(DVec3::Y),
                PolyfaceRecord::Face([1, 2, 3, 0]),
            ])));

        let output = Converter::new().convert(&drawing).unwrap();
        assert_eq!(output.mesh.vertex_count(), 3);
        assert_eq!(output.stats.polyfaces, KindStats { valid: 0, invalid: 1 });
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ConverterConfig = serde_json::from_str(r#"{"tolerance": 0.01}"#).unwrap();
        assert_eq!(config.tolerance, 0.01);
        assert_eq!(config.max_logged_warnings, 5);
        assert_eq!(config.max_polyface_records, 10_000_000);
    }

    #[test]
    fn test_config_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_block_faces": 10}"#).unwrap();
        assert_eq!(ConverterConfig::from_json_file(&path).unwrap().max_block_faces, 10);

        std::fs::write(&path, r#"{"tolerance": -1.0}"#).unwrap();
        assert!(matches!(
            ConverterConfig::from_json_file(&path),
            Err(ConvertError::Config(_))
        ));
    }
}
