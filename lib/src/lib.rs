//! # Toolpath
//!
//! Extrusion entity trees for 3D-printer toolpaths.
//!
//! A layer's extruded material is represented as a tree of entities: leaf
//! [`ExtrusionPath`]s grouped by nestable [`ExtrusionEntityCollection`]s.
//! This library provides the operations a G-code emitter needs on that tree:
//! - Travel-minimizing ordering of a collection's children (`chained_path`)
//! - Flattening nested collections into a leaf sequence (`flatten`)
//! - Measuring the area covered by the extrusions (`polygons_covered_by_*`)
//! - The 2D/3D line kernel those algorithms are built on
//!
//! ## Example
//!
//! ```rust,ignore
//! use toolpath::{ExtrusionEntityCollection, ExtrusionPath, ExtrusionRole, Point, Polyline};
//!
//! let mut layer = ExtrusionEntityCollection::new();
//! layer.append_path(ExtrusionPath::new(
//!     Polyline::from_points(vec![Point::new_scale(0.0, 0.0), Point::new_scale(10.0, 0.0)]),
//!     ExtrusionRole::InternalInfill,
//!     0.45,
//!     0.2,
//! ));
//! let ordered = layer.chained_path_from(Point::new_scale(0.0, 0.0), false, ExtrusionRole::Mixed)?;
//! let leaves = ordered.flatten(false);
//! ```

pub mod clipper;
pub mod config;
pub mod extrusion;
pub mod flow;
pub mod geometry;

pub use config::{ChainingConfig, CoverageConfig, CoverageMode, ToolpathConfig};
pub use extrusion::{
    CountEntities, ExtrusionEntity, ExtrusionEntityCollection, ExtrusionPath, ExtrusionRole,
    ExtrusionVisitor, ExtrusionVisitorConst, FlattenEntities, OverrideRole,
};
pub use flow::{Flow, FlowError, FlowResult, BRIDGE_EXTRA_SPACING};
pub use geometry::{Line, Linef3, Lines, Point, Points, Polygon, Polygons, Polyline, Polylines};
pub use geometry::{Transform3D, Vec3};

/// Coordinate type used throughout the library.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Generic numeric tolerance for floating-point comparisons
/// (angles in radians, line-solver denominators).
pub const EPSILON: f64 = 1e-4;

/// `EPSILON` expressed in scaled coordinates (100 nm).
pub const SCALED_EPSILON: Coord = 100;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Scale a floating-point coordinate to integer (same as scale, for compatibility).
#[inline]
pub fn scaled(v: CoordF) -> Coord {
    scale(v)
}

/// Unscale an integer coordinate to floating-point (same as unscale, for compatibility).
#[inline]
pub fn unscaled(v: Coord) -> CoordF {
    unscale(v)
}

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for extrusion tree operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A leaf-only operation was called on a collection.
    #[error("Calling {operation}() on an ExtrusionEntityCollection")]
    NotALeaf { operation: &'static str },

    #[error("Index {index} out of range for collection of {len} entities")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Calling {operation}() on an empty ExtrusionEntityCollection")]
    EmptyCollection { operation: &'static str },

    #[error("Extrusion path has no points")]
    EmptyPath,

    /// The collection's order is fixed (`no_sort`) and must not be altered.
    #[error("Collection order is locked (no_sort)")]
    Locked,

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
