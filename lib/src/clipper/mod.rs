//! Clipper offset and union operations for extrusion coverage.
//!
//! Coverage polygons are computed by buffering an extrusion's centerline by
//! half its width. Geometry is handed to geo-clipper in raw scaled units with
//! a factor of 1.0, so nothing is lost below the integer grid.

use crate::geometry::{Point, Polygon, Polygons, Polyline};
use crate::{scale, Coord, CoordF};
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Arc tolerance for round joins, in scaled units (5 microns).
const ARC_TOLERANCE: CoordF = 5_000.0;

/// Miter limit applied to mitered joins.
const MITER_LIMIT: CoordF = 3.0;

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    /// Square corners
    #[default]
    Square,
    /// Round corners
    Round,
    /// Mitered corners
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(ARC_TOLERANCE),
            OffsetJoinType::Miter => JoinType::Miter(MITER_LIMIT),
        }
    }
}

#[inline]
fn point_to_geo(p: &Point) -> GeoCoord<f64> {
    GeoCoord {
        x: p.x as f64,
        y: p.y as f64,
    }
}

#[inline]
fn geo_to_point(c: &GeoCoord<f64>) -> Point {
    Point::new(c.x.round() as Coord, c.y.round() as Coord)
}

fn polygon_to_geo(poly: &Polygon) -> GeoPolygon<f64> {
    let mut ring: Vec<GeoCoord<f64>> = poly.points().iter().map(point_to_geo).collect();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    GeoPolygon::new(LineString::new(ring), vec![])
}

/// Convert a geo ring back to our Polygon, dropping the closing point.
fn ring_to_polygon(ring: &LineString<f64>) -> Polygon {
    let mut points: Vec<Point> = ring.coords().map(geo_to_point).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Polygon::from_points(points)
}

/// Flatten a geo MultiPolygon into contours (counter-clockwise) followed by
/// their holes (clockwise), so signed areas sum to the covered area.
fn geo_multi_to_polygons(multi: &MultiPolygon<f64>) -> Polygons {
    let mut out = Vec::new();
    for geo_poly in &multi.0 {
        let mut contour = ring_to_polygon(geo_poly.exterior());
        if contour.len() < 3 {
            continue;
        }
        contour.make_counter_clockwise();
        out.push(contour);

        for interior in geo_poly.interiors() {
            let mut hole = ring_to_polygon(interior);
            if hole.len() < 3 {
                continue;
            }
            hole.make_clockwise();
            out.push(hole);
        }
    }
    out
}

/// Buffer a polyline by `delta` scaled units on each side.
///
/// An open polyline gets butt ends: each segment becomes a rectangle and the
/// corners between segments are filled according to `join_type`. A closed
/// polyline is grown outward and shrunk inward, and the band between the two
/// is returned as a contour with a hole.
pub fn offset_polyline(
    polyline: &Polyline,
    delta: CoordF,
    join_type: OffsetJoinType,
    closed: bool,
) -> Polygons {
    if polyline.len() < 2 || delta <= 0.0 {
        return vec![];
    }

    let result = if closed {
        offset_closed(polyline, delta, join_type)
    } else {
        offset_open(polyline, delta, join_type)
    };
    geo_multi_to_polygons(&result)
}

fn offset_closed(polyline: &Polyline, delta: CoordF, join_type: OffsetJoinType) -> MultiPolygon<f64> {
    let mut points = polyline.points().to_vec();
    if polyline.is_closed() {
        points.pop();
    }
    let mut contour = Polygon::from_points(points);
    if contour.len() < 3 || contour.signed_area() == 0.0 {
        // A loop with no interior sweeps the same band as its open form.
        return offset_open(polyline, delta, join_type);
    }
    contour.make_counter_clockwise();

    let geo_contour = polygon_to_geo(&contour);
    let outer = geo_contour.offset(delta, join_type.into(), EndType::ClosedPolygon, 1.0);
    let inner = geo_contour.offset(-delta, join_type.into(), EndType::ClosedPolygon, 1.0);
    if inner.0.is_empty() {
        outer
    } else {
        outer.difference(&inner, 1.0)
    }
}

fn offset_open(polyline: &Polyline, delta: CoordF, join_type: OffsetJoinType) -> MultiPolygon<f64> {
    let points = polyline.points();
    let mut pieces: Vec<Polygon> = Vec::with_capacity(2 * points.len());

    let normals: Vec<Option<(CoordF, CoordF)>> = points
        .windows(2)
        .map(|w| {
            let (dx, dy) = ((w[1].x - w[0].x) as CoordF, (w[1].y - w[0].y) as CoordF);
            let len = dx.hypot(dy);
            (len > 0.0).then(|| (-dy / len * delta, dx / len * delta))
        })
        .collect();

    for (w, normal) in points.windows(2).zip(&normals) {
        let Some((nx, ny)) = *normal else { continue };
        let (a, b) = (w[0], w[1]);
        pieces.push(Polygon::from_points(vec![
            shifted(a, -nx, -ny),
            shifted(b, -nx, -ny),
            shifted(b, nx, ny),
            shifted(a, nx, ny),
        ]));
    }

    // Corners: the vertex shared by two consecutive non-degenerate segments.
    let segments: Vec<(Point, (CoordF, CoordF))> = points
        .iter()
        .skip(1)
        .zip(&normals)
        .filter_map(|(end, normal)| normal.map(|n| (*end, n)))
        .collect();
    for pair in segments.windows(2) {
        let (vertex, n_in) = pair[0];
        let n_out = pair[1].1;
        match join_type {
            OffsetJoinType::Round => pieces.push(disc(vertex, delta)),
            OffsetJoinType::Square | OffsetJoinType::Miter => {
                for side in [1.0, -1.0] {
                    pieces.push(Polygon::from_points(vec![
                        vertex,
                        shifted(vertex, side * n_in.0, side * n_in.1),
                        shifted(vertex, side * n_out.0, side * n_out.1),
                    ]));
                }
            }
        }
    }

    if pieces.is_empty() {
        return MultiPolygon::new(vec![]);
    }
    for piece in &mut pieces {
        piece.make_counter_clockwise();
    }
    let merged = merge_to_geo(&pieces);
    Clipper::union(&merged, &MultiPolygon::<f64>::new(vec![]), 1.0)
}

#[inline]
fn shifted(p: Point, dx: CoordF, dy: CoordF) -> Point {
    Point::from_f64_rounded(p.x as CoordF + dx, p.y as CoordF + dy)
}

/// Regular polygon approximating a circle to within `ARC_TOLERANCE`.
fn disc(center: Point, radius: CoordF) -> Polygon {
    let tolerance = ARC_TOLERANCE.min(radius);
    let step = 2.0 * (1.0 - tolerance / radius).acos();
    let steps = if step > 0.0 {
        ((2.0 * std::f64::consts::PI / step).ceil() as usize).max(8)
    } else {
        8
    };
    let points = (0..steps)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as CoordF / steps as CoordF;
            shifted(center, radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    Polygon::from_points(points)
}

/// Group contours with the clockwise holes that follow them and normalize
/// the winding, so a non-zero fill keeps holes open.
///
/// Zero-area polygons are dropped. A hole with no preceding contour is
/// ignored.
fn merge_to_geo(polygons: &[Polygon]) -> MultiPolygon<f64> {
    let mut out: Vec<GeoPolygon<f64>> = Vec::new();
    for poly in polygons.iter().filter(|p| p.len() >= 3) {
        let area = poly.signed_area();
        if area > 0.0 {
            out.push(polygon_to_geo(poly));
        } else if area < 0.0 {
            if let Some(contour) = out.last_mut() {
                contour.interiors_push(polygon_to_geo(poly).exterior().clone());
            }
        }
    }
    MultiPolygon::new(out)
}

/// Buffer a polyline by a width given in millimeters, plus `scaled_epsilon`
/// on each side.
pub fn offset_polyline_by_width(
    polyline: &Polyline,
    width_mm: CoordF,
    scaled_epsilon: CoordF,
    closed: bool,
) -> Polygons {
    let delta = 0.5 * scale(width_mm) as CoordF + scaled_epsilon;
    offset_polyline(polyline, delta, OffsetJoinType::Square, closed)
}

/// Union a set of possibly overlapping polygons.
///
/// Input follows the layout produced by the offset functions: each
/// counter-clockwise contour is followed by its clockwise holes.
pub fn union(polygons: &[Polygon]) -> Polygons {
    let merged = merge_to_geo(polygons);
    if merged.0.is_empty() {
        return vec![];
    }
    let result = Clipper::union(&merged, &MultiPolygon::<f64>::new(vec![]), 1.0);
    geo_multi_to_polygons(&result)
}

/// Net covered area of a polygon set in scaled units squared, counting
/// clockwise polygons as holes.
pub fn total_area(polygons: &[Polygon]) -> CoordF {
    polygons.iter().map(Polygon::signed_area).sum()
}
