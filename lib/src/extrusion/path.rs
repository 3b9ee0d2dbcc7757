//! Leaf extrusion path.

use log::warn;
use serde::{Deserialize, Serialize};

use super::ExtrusionRole;
use crate::clipper;
use crate::flow::{Flow, FlowResult};
use crate::geometry::{Point, Polygon, Polygons, Polyline};
use crate::{CoordF, Error, Result, SCALING_FACTOR};

/// A single extrusion: a centerline polyline printed at a given width and
/// height.
///
/// The geometry is fixed once constructed, apart from reversal. A closed path
/// (a loop) stores its closing point explicitly, so `last_point() ==
/// first_point()` and `length()` includes the closing segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PathData")]
pub struct ExtrusionPath {
    polyline: Polyline,
    role: ExtrusionRole,

    /// Extrusion width (mm).
    width: CoordF,

    /// Layer height (mm).
    height: CoordF,

    closed: bool,

    #[serde(skip_serializing)]
    mm3_per_mm: CoordF,
}

#[derive(Deserialize)]
struct PathData {
    polyline: Polyline,
    role: ExtrusionRole,
    width: CoordF,
    height: CoordF,
    #[serde(default)]
    closed: bool,
}

impl From<PathData> for ExtrusionPath {
    fn from(data: PathData) -> Self {
        let mut path = Self::new(data.polyline, data.role, data.width, data.height);
        if data.closed && path.polyline.len() >= 2 {
            close_polyline(&mut path.polyline);
            path.closed = true;
        }
        path
    }
}

fn close_polyline(polyline: &mut Polyline) {
    if let (Some(first), Some(last)) = (polyline.first_point(), polyline.last_point()) {
        if first != last {
            polyline.push(first);
        }
    }
}

impl ExtrusionPath {
    /// Create an open extrusion path.
    pub fn new(polyline: Polyline, role: ExtrusionRole, width: CoordF, height: CoordF) -> Self {
        Self {
            polyline,
            role,
            width,
            height,
            closed: false,
            mm3_per_mm: Self::derive_mm3_per_mm(role, width, height),
        }
    }

    /// Create a closed loop following a polygon's contour.
    pub fn new_closed(polygon: &Polygon, role: ExtrusionRole, width: CoordF, height: CoordF) -> Self {
        let mut path = Self::new(Polyline::from_polygon(polygon), role, width, height);
        path.closed = path.polyline.len() >= 2;
        path
    }

    fn flow_for(role: ExtrusionRole, width: CoordF, height: CoordF) -> FlowResult<Flow> {
        if role.is_bridge() {
            Flow::bridge(width)
        } else {
            Flow::rounded(width, height)
        }
    }

    fn derive_mm3_per_mm(role: ExtrusionRole, width: CoordF, height: CoordF) -> CoordF {
        Self::flow_for(role, width, height)
            .map(|flow| flow.mm3_per_mm())
            .unwrap_or_else(|e| {
                warn!("{} path of {:.3} x {:.3} mm: {}", role, width, height, e);
                0.0
            })
    }

    #[inline]
    pub fn role(&self) -> ExtrusionRole {
        self.role
    }

    /// Change the role; the flow is re-derived since bridge roles use a
    /// round cross section.
    pub fn set_role(&mut self, role: ExtrusionRole) {
        self.role = role;
        self.mm3_per_mm = Self::derive_mm3_per_mm(role, self.width, self.height);
    }

    #[inline]
    pub fn width(&self) -> CoordF {
        self.width
    }

    #[inline]
    pub fn height(&self) -> CoordF {
        self.height
    }

    /// Flow parameters derived from this path's role, width and height.
    pub fn flow(&self) -> FlowResult<Flow> {
        Self::flow_for(self.role, self.width, self.height)
    }

    #[inline]
    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    #[inline]
    pub fn into_polyline(self) -> Polyline {
        self.polyline
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Material volume per unit of travel (mm³/mm).
    #[inline]
    pub fn mm3_per_mm(&self) -> CoordF {
        self.mm3_per_mm
    }

    pub fn first_point(&self) -> Result<Point> {
        self.polyline.first_point().ok_or(Error::EmptyPath)
    }

    pub fn last_point(&self) -> Result<Point> {
        self.polyline.last_point().ok_or(Error::EmptyPath)
    }

    /// Centerline length in scaled units.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.polyline.length()
    }

    /// Extruded volume (mm³).
    pub fn total_volume(&self) -> CoordF {
        self.mm3_per_mm * self.length() / SCALING_FACTOR
    }

    /// Loops keep their seam, so only open paths can be reversed by chaining.
    #[inline]
    pub fn can_reverse(&self) -> bool {
        !self.closed
    }

    pub fn reverse(&mut self) {
        self.polyline.reverse();
    }

    /// Center-line spacing (mm) for this path's flow.
    pub fn spacing(&self) -> FlowResult<CoordF> {
        Ok(self.flow()?.spacing())
    }

    /// Area swept by the path at its nominal width, grown by `scaled_epsilon`
    /// on each side.
    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        self.buffer_into(out, self.width, scaled_epsilon);
    }

    /// Area swept by the path at its line spacing, grown by `scaled_epsilon`
    /// on each side.
    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) -> Result<()> {
        let spacing = self.spacing()?;
        self.buffer_into(out, spacing, scaled_epsilon);
        Ok(())
    }

    fn buffer_into(&self, out: &mut Polygons, width_mm: CoordF, scaled_epsilon: CoordF) {
        if self.polyline.len() < 2 {
            warn!(
                "Skipping coverage of a {} path with {} point(s)",
                self.role,
                self.polyline.len()
            );
            return;
        }
        out.extend(clipper::offset_polyline_by_width(
            &self.polyline,
            width_mm,
            scaled_epsilon,
            self.closed,
        ));
    }

    /// Length in mm.
    pub fn length_mm(&self) -> CoordF {
        self.length() / SCALING_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale;
    use std::f64::consts::PI;

    fn straight_path(len_mm: f64, role: ExtrusionRole) -> ExtrusionPath {
        ExtrusionPath::new(
            Polyline::from_points(vec![Point::new(0, 0), Point::new_scale(len_mm, 0.0)]),
            role,
            0.45,
            0.2,
        )
    }

    #[test]
    fn test_path_basic() {
        let path = straight_path(10.0, ExtrusionRole::Perimeter);
        assert_eq!(path.first_point().unwrap(), Point::new(0, 0));
        assert_eq!(path.last_point().unwrap(), Point::new(scale(10.0), 0));
        assert!((path.length_mm() - 10.0).abs() < 1e-9);
        assert!(path.can_reverse());
        assert!(!path.is_closed());
    }

    #[test]
    fn test_path_mm3_per_mm() {
        let path = straight_path(10.0, ExtrusionRole::Perimeter);
        let expected = 0.2 * (0.45 - 0.2 * (1.0 - 0.25 * PI));
        assert!((path.mm3_per_mm() - expected).abs() < 1e-12);
        assert!((path.total_volume() - 10.0 * expected).abs() < 1e-9);

        let bridge = straight_path(10.0, ExtrusionRole::BridgeInfill);
        assert!((bridge.mm3_per_mm() - 0.45 * 0.45 * 0.25 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_path_invalid_flow_is_zero() {
        let path = ExtrusionPath::new(
            Polyline::from_points(vec![Point::new(0, 0), Point::new(10, 0)]),
            ExtrusionRole::GapFill,
            0.01,
            0.2,
        );
        assert_eq!(path.mm3_per_mm(), 0.0);
        assert!(path.spacing().is_err());
    }

    #[test]
    fn test_empty_path_endpoints() {
        let path = ExtrusionPath::new(Polyline::new(), ExtrusionRole::Perimeter, 0.45, 0.2);
        assert!(matches!(path.first_point(), Err(Error::EmptyPath)));
        assert!(matches!(path.last_point(), Err(Error::EmptyPath)));
        let mut out = Vec::new();
        path.polygons_covered_by_width(&mut out, 0.0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_closed_path() {
        let square = Polygon::rectangle(Point::new(0, 0), Point::new_scale(10.0, 10.0));
        let path = ExtrusionPath::new_closed(&square, ExtrusionRole::ExternalPerimeter, 0.45, 0.2);
        assert!(path.is_closed());
        assert!(!path.can_reverse());
        assert_eq!(path.first_point().unwrap(), path.last_point().unwrap());
        assert!((path.length_mm() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_role_rederives_flow() {
        let mut path = straight_path(1.0, ExtrusionRole::SolidInfill);
        path.set_role(ExtrusionRole::BridgeInfill);
        assert_eq!(path.role(), ExtrusionRole::BridgeInfill);
        assert!((path.mm3_per_mm() - 0.45 * 0.45 * 0.25 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_reverse() {
        let mut path = straight_path(5.0, ExtrusionRole::SolidInfill);
        path.reverse();
        assert_eq!(path.first_point().unwrap(), Point::new(scale(5.0), 0));
        assert_eq!(path.last_point().unwrap(), Point::new(0, 0));
    }

    #[test]
    fn test_coverage_width_vs_spacing() {
        let path = straight_path(10.0, ExtrusionRole::SolidInfill);
        let mut by_width = Vec::new();
        path.polygons_covered_by_width(&mut by_width, 0.0);
        let mut by_spacing = Vec::new();
        path.polygons_covered_by_spacing(&mut by_spacing, 0.0).unwrap();

        let mm2 = SCALING_FACTOR * SCALING_FACTOR;
        let area_w = clipper::total_area(&by_width) / mm2;
        let area_s = clipper::total_area(&by_spacing) / mm2;
        assert!((area_w - 4.5).abs() < 1e-6, "width area {}", area_w);
        assert!(area_s < area_w);
        assert!((area_s - 10.0 * path.spacing().unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_coverage_follows_closed_flag() {
        // An open path whose last point returns to its first keeps butt ends,
        // so the seam corner differs from the same loop marked closed.
        let square = Polygon::rectangle(Point::new(0, 0), Point::new_scale(10.0, 10.0));
        let open = ExtrusionPath::new(
            Polyline::from_polygon(&square),
            ExtrusionRole::ExternalPerimeter,
            0.45,
            0.2,
        );
        let closed = ExtrusionPath::new_closed(&square, ExtrusionRole::ExternalPerimeter, 0.45, 0.2);
        assert!(!open.is_closed());
        assert_eq!(open.polyline(), closed.polyline());

        let mut open_cover = Vec::new();
        open.polygons_covered_by_width(&mut open_cover, 0.0);
        let mut closed_cover = Vec::new();
        closed.polygons_covered_by_width(&mut closed_cover, 0.0);

        let mm2 = SCALING_FACTOR * SCALING_FACTOR;
        let open_area = clipper::total_area(&open_cover) / mm2;
        let closed_area = clipper::total_area(&closed_cover) / mm2;
        assert!(open_area > 0.0);
        assert!((open_area - closed_area).abs() > 1e-3, "open {} closed {}", open_area, closed_area);
    }

    #[test]
    fn test_serde_recomputes_flow() {
        let path = straight_path(2.0, ExtrusionRole::Perimeter);
        let json = serde_json::to_string(&path).unwrap();
        assert!(!json.contains("mm3_per_mm"));
        let back: ExtrusionPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
