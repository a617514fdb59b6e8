//! Error types for DXF mesh conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ConvertError.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Whole-file failures. Any of these aborts the conversion of one file.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input document does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The document could not be parsed, even in recovery mode.
    #[error("Unreadable document {name}: {reason}")]
    UnreadableDocument { name: String, reason: String },

    /// No entity produced usable geometry.
    #[error(
        "No valid 3D geometry found ({invalid_faces} invalid faces, \
         {invalid_polyfaces} invalid polyface meshes)"
    )]
    EmptyGeometry {
        invalid_faces: usize,
        invalid_polyfaces: usize,
    },

    /// Failed to export mesh.
    #[error("Export error: {0}")]
    Export(String),

    /// Output path names a format no exporter handles.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Invalid converter or batch configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or write JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reason a single entity contributed no geometry.
///
/// These never abort a conversion; the mesher counts them per source kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    /// Fewer than three corner slots are populated.
    #[error("only {0} corners present, need at least 3")]
    TooFewCorners(usize),

    /// Corners collapse under the merge tolerance.
    #[error("degenerate face, {0} unique corners after merging")]
    Degenerate(usize),

    /// A face corner slot or polyface vertex carries NaN or infinity.
    #[error("non-finite coordinate at corner or vertex {0}")]
    NonFiniteCoordinate(usize),

    /// The block placement maps a corner to NaN or infinity.
    #[error("block transform produced a non-finite point")]
    NonFiniteTransform,

    /// The entity is larger than the configured decoding bound.
    #[error("{count} sub-records exceeds the limit of {limit}")]
    TooManyRecords { count: usize, limit: usize },
}

impl EntityError {
    /// Degenerate geometry, as opposed to a malformed entity.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, EntityError::TooFewCorners(_) | EntityError::Degenerate(_))
    }
}
