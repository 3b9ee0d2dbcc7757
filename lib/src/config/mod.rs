//! Configuration for tree operations.
//!
//! Settings that choose how a layer collection is chained, flattened and
//! measured. All lengths are in millimeters. Every field has a default, so a
//! JSON file only needs to name the values it changes.

use crate::extrusion::ExtrusionRole;
use crate::geometry::Point;
use crate::{scale, unscale, CoordF, Error, Result, SCALED_EPSILON};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Path-chaining settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainingConfig {
    /// Never enter a child from its last point.
    pub no_reverse: bool,
    /// Only chain children with this role; `Mixed` chains all.
    pub role: ExtrusionRole,
    /// Start position (mm). When unset, chaining starts at the first
    /// child's first point.
    pub start_near: Option<(CoordF, CoordF)>,
}

impl Default for ChainingConfig {
    fn default() -> Self {
        Self {
            no_reverse: false,
            role: ExtrusionRole::Mixed,
            start_near: None,
        }
    }
}

impl ChainingConfig {
    /// Start position in scaled coordinates.
    pub fn start_point(&self) -> Option<Point> {
        self.start_near.map(|(x, y)| Point::new_scale(x, y))
    }

    /// Builder method: set the start position (mm).
    pub fn start_near(mut self, x: CoordF, y: CoordF) -> Self {
        self.start_near = Some((x, y));
        self
    }

    /// Builder method: set the role filter.
    pub fn role(mut self, role: ExtrusionRole) -> Self {
        self.role = role;
        self
    }

    pub fn no_reverse(mut self, no_reverse: bool) -> Self {
        self.no_reverse = no_reverse;
        self
    }
}

/// Which extrusion dimension the coverage buffer uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageMode {
    /// Nominal extrusion width.
    #[default]
    Width,
    /// Line spacing (the actually filled area).
    Spacing,
}

impl fmt::Display for CoverageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageMode::Width => write!(f, "width"),
            CoverageMode::Spacing => write!(f, "spacing"),
        }
    }
}

/// Coverage polygon settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub mode: CoverageMode,
    /// Extra growth on each side of a ribbon (mm), so adjacent ribbons
    /// overlap when unioned.
    pub epsilon: CoordF,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            mode: CoverageMode::Width,
            epsilon: unscale(SCALED_EPSILON),
        }
    }
}

impl CoverageConfig {
    /// Epsilon in scaled units.
    pub fn scaled_epsilon(&self) -> CoordF {
        scale(self.epsilon) as CoordF
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolpathConfig {
    pub chaining: ChainingConfig,
    pub coverage: CoverageConfig,
    /// Keep `no_sort` sub-collections whole when flattening.
    pub flatten_preserve_ordering: bool,
}

impl ToolpathConfig {
    /// Create a new ToolpathConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.coverage.epsilon.is_finite() || self.coverage.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "Coverage epsilon must be a non-negative number, got {}",
                self.coverage.epsilon
            )));
        }
        if let Some((x, y)) = self.chaining.start_near {
            if !x.is_finite() || !y.is_finite() {
                return Err(Error::Config("Chaining start point must be finite".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolpathConfig::default();
        assert_eq!(config.chaining.role, ExtrusionRole::Mixed);
        assert!(!config.chaining.no_reverse);
        assert_eq!(config.chaining.start_point(), None);
        assert_eq!(config.coverage.mode, CoverageMode::Width);
        assert_eq!(config.coverage.scaled_epsilon(), SCALED_EPSILON as CoordF);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ToolpathConfig::from_json_str(
            r#"{ "chaining": { "role": "Perimeter", "start_near": [1.5, 2.0] },
                 "coverage": { "mode": "spacing" } }"#,
        )
        .unwrap();
        assert_eq!(config.chaining.role, ExtrusionRole::Perimeter);
        assert_eq!(config.chaining.start_point(), Some(Point::new(1_500_000, 2_000_000)));
        assert_eq!(config.coverage.mode, CoverageMode::Spacing);
        assert_eq!(config.coverage.epsilon, CoverageConfig::default().epsilon);
        assert!(!config.flatten_preserve_ordering);
    }

    #[test]
    fn test_negative_epsilon_rejected() {
        let err = ToolpathConfig::from_json_str(r#"{ "coverage": { "epsilon": -0.1 } }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_json() {
        let err = ToolpathConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_builders() {
        let chaining = ChainingConfig::default()
            .start_near(0.0, 0.0)
            .role(ExtrusionRole::GapFill)
            .no_reverse(true);
        assert_eq!(chaining.start_point(), Some(Point::new(0, 0)));
        assert!(chaining.no_reverse);
        assert_eq!(chaining.role, ExtrusionRole::GapFill);
    }
}
