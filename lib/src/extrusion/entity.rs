//! The extrusion entity: a leaf path or a nested collection.

use serde::{Deserialize, Serialize};

use super::{
    ExtrusionEntityCollection, ExtrusionPath, ExtrusionRole, ExtrusionVisitor,
    ExtrusionVisitorConst,
};
use crate::geometry::{Point, Polygons, Polyline, Polylines};
use crate::{CoordF, Error, Result};

/// A node of the extrusion tree.
///
/// Cloning is a deep copy: every nested collection and path is duplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtrusionEntity {
    Path(ExtrusionPath),
    Collection(ExtrusionEntityCollection),
}

impl ExtrusionEntity {
    pub fn role(&self) -> ExtrusionRole {
        match self {
            ExtrusionEntity::Path(path) => path.role(),
            ExtrusionEntity::Collection(collection) => collection.role(),
        }
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        matches!(self, ExtrusionEntity::Collection(_))
    }

    pub fn first_point(&self) -> Result<Point> {
        match self {
            ExtrusionEntity::Path(path) => path.first_point(),
            ExtrusionEntity::Collection(collection) => collection.first_point(),
        }
    }

    pub fn last_point(&self) -> Result<Point> {
        match self {
            ExtrusionEntity::Path(path) => path.last_point(),
            ExtrusionEntity::Collection(collection) => collection.last_point(),
        }
    }

    /// Centerline length in scaled units. Collections have no single length.
    pub fn length(&self) -> Result<CoordF> {
        match self {
            ExtrusionEntity::Path(path) => Ok(path.length()),
            ExtrusionEntity::Collection(_) => Err(Error::NotALeaf {
                operation: "length",
            }),
        }
    }

    /// The leaf's centerline. Collections have no single polyline.
    pub fn as_polyline(&self) -> Result<&Polyline> {
        match self {
            ExtrusionEntity::Path(path) => Ok(path.polyline()),
            ExtrusionEntity::Collection(_) => Err(Error::NotALeaf {
                operation: "as_polyline",
            }),
        }
    }

    pub fn can_reverse(&self) -> bool {
        match self {
            ExtrusionEntity::Path(path) => path.can_reverse(),
            ExtrusionEntity::Collection(collection) => collection.can_reverse(),
        }
    }

    /// Reverse in place. Fails with [`Error::Locked`] on a `no_sort`
    /// collection.
    pub fn reverse(&mut self) -> Result<()> {
        match self {
            ExtrusionEntity::Path(path) => {
                path.reverse();
                Ok(())
            }
            ExtrusionEntity::Collection(collection) => collection.reverse(),
        }
    }

    /// Extruded volume (mm³) of this entity and all its descendants.
    pub fn total_volume(&self) -> CoordF {
        match self {
            ExtrusionEntity::Path(path) => path.total_volume(),
            ExtrusionEntity::Collection(collection) => collection.total_volume(),
        }
    }

    /// Smallest flow of any leaf; 0.0 for an empty collection.
    pub fn min_mm3_per_mm(&self) -> CoordF {
        match self {
            ExtrusionEntity::Path(path) => path.mm3_per_mm(),
            ExtrusionEntity::Collection(collection) => collection.min_mm3_per_mm(),
        }
    }

    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        match self {
            ExtrusionEntity::Path(path) => path.polygons_covered_by_width(out, scaled_epsilon),
            ExtrusionEntity::Collection(collection) => {
                collection.append_polygons_covered_by_width(out, scaled_epsilon)
            }
        }
    }

    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) -> Result<()> {
        match self {
            ExtrusionEntity::Path(path) => path.polygons_covered_by_spacing(out, scaled_epsilon),
            ExtrusionEntity::Collection(collection) => {
                collection.append_polygons_covered_by_spacing(out, scaled_epsilon)
            }
        }
    }

    /// Push every leaf centerline, in tree order.
    pub fn collect_polylines(&self, out: &mut Polylines) {
        match self {
            ExtrusionEntity::Path(path) => out.push(path.polyline().clone()),
            ExtrusionEntity::Collection(collection) => collection.collect_polylines(out),
        }
    }

    /// Dispatch to the visitor method for this entity's kind.
    pub fn visit<V: ExtrusionVisitorConst + ?Sized>(&self, visitor: &mut V) {
        match self {
            ExtrusionEntity::Path(path) => visitor.use_path(path),
            ExtrusionEntity::Collection(collection) => visitor.use_collection(collection),
        }
    }

    pub fn visit_mut<V: ExtrusionVisitor + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            ExtrusionEntity::Path(path) => visitor.use_path(path),
            ExtrusionEntity::Collection(collection) => visitor.use_collection(collection),
        }
    }
}

impl From<ExtrusionPath> for ExtrusionEntity {
    fn from(path: ExtrusionPath) -> Self {
        ExtrusionEntity::Path(path)
    }
}

impl From<ExtrusionEntityCollection> for ExtrusionEntity {
    fn from(collection: ExtrusionEntityCollection) -> Self {
        ExtrusionEntity::Collection(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x0: i64, x1: i64) -> ExtrusionPath {
        ExtrusionPath::new(
            Polyline::from_points(vec![Point::new(x0, 0), Point::new(x1, 0)]),
            ExtrusionRole::Perimeter,
            0.45,
            0.2,
        )
    }

    #[test]
    fn test_leaf_only_operations_fail_on_collection() {
        let entity = ExtrusionEntity::from(ExtrusionEntityCollection::from(vec![segment(0, 10)]));
        assert!(matches!(
            entity.length(),
            Err(Error::NotALeaf { operation: "length" })
        ));
        assert!(matches!(
            entity.as_polyline(),
            Err(Error::NotALeaf {
                operation: "as_polyline"
            })
        ));
    }

    #[test]
    fn test_leaf_operations() {
        let entity = ExtrusionEntity::from(segment(0, 10));
        assert_eq!(entity.length().unwrap(), 10.0);
        assert_eq!(entity.as_polyline().unwrap().len(), 2);
        assert!(!entity.is_collection());
        assert_eq!(entity.role(), ExtrusionRole::Perimeter);
    }

    #[test]
    fn test_reverse_entity() {
        let mut entity = ExtrusionEntity::from(segment(0, 10));
        entity.reverse().unwrap();
        assert_eq!(entity.first_point().unwrap(), Point::new(10, 0));

        let mut locked = ExtrusionEntityCollection::from(vec![segment(0, 10)]);
        locked.no_sort = true;
        let mut entity = ExtrusionEntity::from(locked);
        assert!(!entity.can_reverse());
        assert!(matches!(entity.reverse(), Err(Error::Locked)));
    }

    #[test]
    fn test_collect_polylines_recurses() {
        let mut inner = ExtrusionEntityCollection::new();
        inner.append_path(segment(20, 30));
        let mut outer = ExtrusionEntityCollection::from(vec![segment(0, 10)]);
        outer.append_collection(inner);

        let mut out = Vec::new();
        ExtrusionEntity::from(outer).collect_polylines(&mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].first_point(), Some(Point::new(20, 0)));
    }

    #[test]
    fn test_serde_tagged() {
        let entity = ExtrusionEntity::from(segment(0, 10));
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "path");
        let back: ExtrusionEntity = serde_json::from_value(json).unwrap();
        assert_eq!(back, entity);
    }
}
