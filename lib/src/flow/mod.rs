//! # Extrusion Flow
//!
//! The cross section a path lays down fixes how much material it consumes
//! per mm of travel and how far apart neighbouring centerlines sit.
//!
//! Regular extrusions are squashed against the layer below into a rectangle
//! with semicircular sides:
//!
//! ```text
//! area    = height × spacing
//! spacing = width - height × (1 - π/4)
//! ```
//!
//! Bridges hang in the air and stay round, with `width` as the diameter.

use std::f64::consts::PI;
use thiserror::Error;

/// Gap left between neighbouring bridge threads (mm).
pub const BRIDGE_EXTRA_SPACING: f64 = 0.05;

/// Cross sections that cannot be extruded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("width {width:.3} mm is too narrow for height {height:.3} mm")]
    NegativeSpacing { width: f64, height: f64 },

    #[error("cross section of {width:.3} x {height:.3} mm has no area")]
    NegativeFlow { width: f64, height: f64 },
}

pub type FlowResult<T> = Result<T, FlowError>;

/// Shape of the extruded thread, in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    /// Rectangle with semicircular sides, pressed onto the layer below.
    Rounded { width: f64, height: f64 },
    /// Free-hanging round thread.
    Bridge { diameter: f64 },
}

impl Flow {
    /// Cross section of a supported extrusion.
    pub fn rounded(width: f64, height: f64) -> FlowResult<Self> {
        if width - height * (1.0 - 0.25 * PI) <= 0.0 {
            return Err(FlowError::NegativeSpacing { width, height });
        }
        if height <= 0.0 {
            return Err(FlowError::NegativeFlow { width, height });
        }
        Ok(Flow::Rounded { width, height })
    }

    /// Cross section of a bridge thread of the given diameter.
    pub fn bridge(diameter: f64) -> FlowResult<Self> {
        if diameter <= 0.0 {
            return Err(FlowError::NegativeFlow {
                width: diameter,
                height: diameter,
            });
        }
        Ok(Flow::Bridge { diameter })
    }

    /// Distance between neighbouring centerlines (mm).
    pub fn spacing(&self) -> f64 {
        match *self {
            Flow::Rounded { width, height } => width - height * (1.0 - 0.25 * PI),
            Flow::Bridge { diameter } => diameter + BRIDGE_EXTRA_SPACING,
        }
    }

    /// Cross-sectional area (mm²), i.e. mm³ of material per mm of travel.
    pub fn mm3_per_mm(&self) -> f64 {
        match *self {
            Flow::Rounded { height, .. } => height * self.spacing(),
            Flow::Bridge { diameter } => diameter * diameter * 0.25 * PI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rounded_flow() {
        let flow = Flow::rounded(0.45, 0.2).unwrap();
        let spacing = 0.45 - 0.2 * (1.0 - 0.25 * PI);
        assert!(approx_eq(flow.spacing(), spacing));
        assert!(approx_eq(flow.mm3_per_mm(), 0.2 * spacing));
        assert!(flow.spacing() < 0.45);
    }

    #[test]
    fn test_bridge_flow() {
        let flow = Flow::bridge(0.4).unwrap();
        assert_eq!(flow, Flow::Bridge { diameter: 0.4 });
        assert!(approx_eq(flow.spacing(), 0.4 + BRIDGE_EXTRA_SPACING));
        assert!(approx_eq(flow.mm3_per_mm(), 0.04 * PI));
    }

    #[test]
    fn test_invalid_cross_sections() {
        assert!(matches!(
            Flow::rounded(0.01, 0.2),
            Err(FlowError::NegativeSpacing { .. })
        ));
        assert!(matches!(
            Flow::rounded(0.45, 0.0),
            Err(FlowError::NegativeFlow { .. })
        ));
        assert!(Flow::bridge(0.0).is_err());
    }
}
