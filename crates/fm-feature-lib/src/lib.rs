//! FM Feature Library - per-vertex model data for polyline features
//!
//! Hydraulic structures such as fixed weirs and bridge pillars are drawn as polylines
//! and carry one value per vertex for every model quantity (crest level, pillar
//! diameter, ...). This library keeps those values aligned with the geometry while
//! the user edits it, and reads and writes them as polyline files.
//!
//! # Architecture
//!
//! - **[`Feature`]**: Named polyline that notifies observers when its geometry changes
//! - **[`DataColumn`]**: Named, typed per-vertex value list with a default and an active flag
//! - **[`ModelFeatureCoordinateData`]**: Keeps a feature's data columns in step with its vertices
//! - **[`FeatureDataModel`]**: Creates and disposes coordinate data as the model area changes
//! - **[`io`]**: `.pli` / `.pliz` reading and writing
//!
//! # Resynchronization
//!
//! When the vertex count changes, each old vertex is matched to the first new vertex
//! with exactly the same x and y. Matched values move along, new vertices get the
//! column default, unmatched old values are dropped. Nothing here fails on a
//! mismatch; values degrade to defaults instead.

pub mod bridge_pillar;
mod column;
mod coordinate_data;
mod feature;
pub mod fixed_weir;
pub mod io;
mod model;

// Public API exports
pub use column::{ColumnType, ColumnValue, DataColumn};
pub use coordinate_data::{ModelFeatureCoordinateData, map_vertices};
pub use feature::{Feature, GeometryObserver, ObserverId};
pub use fixed_weir::FixedWeirScheme;
pub use model::{CollectionChange, Config, FeatureDataModel, FeatureKind};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unexpected end of file after line {line}; expected {expected}")]
    UnexpectedEof { line: usize, expected: String },

    #[error("Index {index} out of range for column '{column}' with {len} values")]
    IndexOutOfRange {
        column: String,
        index: usize,
        len: usize,
    },

    #[error("Column '{column}' holds {expected} values, got {found}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("Unknown fixed weir scheme: {0}")]
    UnknownScheme(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
