//! Owning, nestable container of extrusion entities.

use serde::{Deserialize, Serialize};

use super::{
    CountEntities, ExtrusionEntity, ExtrusionPath, ExtrusionRole, ExtrusionVisitorConst,
    FlattenEntities,
};
use crate::geometry::{Point, Polygons, Polylines};
use crate::{CoordF, Error, Result};

/// An ordered group of extrusion entities.
///
/// `orig_indices` always has one entry per child. Every operation that
/// changes the child sequence updates it in the same step, so it cannot be
/// mutated independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CollectionData")]
pub struct ExtrusionEntityCollection {
    entities: Vec<ExtrusionEntity>,

    #[serde(skip_serializing)]
    orig_indices: Vec<usize>,

    /// When set, the child order is fixed: chaining keeps it and `reverse`
    /// refuses to run.
    pub no_sort: bool,
}

#[derive(Deserialize)]
struct CollectionData {
    #[serde(default)]
    entities: Vec<ExtrusionEntity>,
    #[serde(default)]
    no_sort: bool,
}

impl From<CollectionData> for ExtrusionEntityCollection {
    fn from(data: CollectionData) -> Self {
        let mut collection = Self::from_entities(data.entities);
        collection.no_sort = data.no_sort;
        collection
    }
}

impl ExtrusionEntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection whose order is locked.
    pub fn new_no_sort() -> Self {
        Self {
            no_sort: true,
            ..Self::default()
        }
    }

    /// Take ownership of `entities`, with an identity index table.
    pub fn from_entities(entities: Vec<ExtrusionEntity>) -> Self {
        let orig_indices = (0..entities.len()).collect();
        Self {
            entities,
            orig_indices,
            no_sort: false,
        }
    }

    /// Assemble a reordered collection from children paired with the index
    /// each one held in its source.
    pub(crate) fn from_reordered(entities: Vec<(usize, ExtrusionEntity)>, no_sort: bool) -> Self {
        let (orig_indices, entities): (Vec<usize>, Vec<ExtrusionEntity>) =
            entities.into_iter().unzip();
        Self {
            entities,
            orig_indices,
            no_sort,
        }
    }

    #[inline]
    pub fn entities(&self) -> &[ExtrusionEntity] {
        &self.entities
    }

    /// Correlation table: `orig_indices()[k]` is the position the child now
    /// at `k` had before the last reordering.
    #[inline]
    pub fn orig_indices(&self) -> &[usize] {
        &self.orig_indices
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ExtrusionEntity> {
        self.entities.get(index)
    }

    /// Mutable access to a child. The child sequence itself cannot change
    /// through this borrow.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ExtrusionEntity> {
        self.entities.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtrusionEntity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ExtrusionEntity> {
        self.entities.iter_mut()
    }

    /// Number of direct children.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Common role of all children, `None` if empty, `Mixed` if they differ.
    pub fn role(&self) -> ExtrusionRole {
        ExtrusionRole::aggregate(self.entities.iter().map(ExtrusionEntity::role))
    }

    #[inline]
    pub fn can_reverse(&self) -> bool {
        !self.no_sort
    }

    /// Append an entity, taking ownership.
    pub fn append(&mut self, entity: impl Into<ExtrusionEntity>) {
        self.orig_indices.push(self.entities.len());
        self.entities.push(entity.into());
    }

    pub fn append_path(&mut self, path: ExtrusionPath) {
        self.append(ExtrusionEntity::Path(path));
    }

    /// Nest `collection` as a single child.
    pub fn append_collection(&mut self, collection: ExtrusionEntityCollection) {
        self.append(ExtrusionEntity::Collection(collection));
    }

    /// Append deep copies of `entities`.
    pub fn append_copy(&mut self, entities: &[ExtrusionEntity]) {
        self.entities.reserve(entities.len());
        for entity in entities {
            self.append(entity.clone());
        }
    }

    /// Move every entity out of `entities` into this collection, leaving it
    /// empty.
    pub fn append_entities(&mut self, entities: &mut Vec<ExtrusionEntity>) {
        self.entities.reserve(entities.len());
        for entity in entities.drain(..) {
            self.append(entity);
        }
    }

    pub fn append_paths(&mut self, paths: Vec<ExtrusionPath>) {
        self.entities.reserve(paths.len());
        for path in paths {
            self.append_path(path);
        }
    }

    /// Replace the child at `index`, returning the previous one. The index
    /// table is unchanged.
    pub fn replace(&mut self, index: usize, entity: impl Into<ExtrusionEntity>) -> Result<ExtrusionEntity> {
        let len = self.entities.len();
        let slot = self
            .entities
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, entity.into()))
    }

    /// Remove and return the child at `index`, dropping its index entry.
    pub fn remove(&mut self, index: usize) -> Result<ExtrusionEntity> {
        let len = self.entities.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        self.orig_indices.remove(index);
        Ok(self.entities.remove(index))
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.orig_indices.clear();
    }

    /// Exchange the full state of two collections.
    pub fn swap(&mut self, other: &mut ExtrusionEntityCollection) {
        std::mem::swap(self, other);
    }

    /// Recursive number of leaf paths.
    pub fn items_count(&self) -> usize {
        let mut counter = CountEntities::default();
        counter.use_collection(self);
        counter.leaves
    }

    pub fn first_point(&self) -> Result<Point> {
        self.entities
            .first()
            .ok_or(Error::EmptyCollection {
                operation: "first_point",
            })?
            .first_point()
    }

    pub fn last_point(&self) -> Result<Point> {
        self.entities
            .last()
            .ok_or(Error::EmptyCollection {
                operation: "last_point",
            })?
            .last_point()
    }

    /// Reverse the child order and every reversible child.
    ///
    /// # Errors
    ///
    /// [`Error::Locked`] if `no_sort` is set; nothing is changed.
    pub fn reverse(&mut self) -> Result<()> {
        if self.no_sort {
            return Err(Error::Locked);
        }
        for entity in self.entities.iter_mut().filter(|e| e.can_reverse()) {
            entity.reverse()?;
        }
        self.entities.reverse();
        self.orig_indices.reverse();
        Ok(())
    }

    pub fn total_volume(&self) -> CoordF {
        self.entities.iter().map(ExtrusionEntity::total_volume).sum()
    }

    /// Smallest flow of any leaf below this collection; 0.0 when there are
    /// no leaves.
    pub fn min_mm3_per_mm(&self) -> CoordF {
        self.entities
            .iter()
            .filter(|e| !matches!(e, ExtrusionEntity::Collection(c) if c.items_count() == 0))
            .map(ExtrusionEntity::min_mm3_per_mm)
            .reduce(CoordF::min)
            .unwrap_or(0.0)
    }

    /// Concatenated coverage of every child at nominal width.
    pub fn polygons_covered_by_width(&self, scaled_epsilon: CoordF) -> Polygons {
        let mut out = Vec::new();
        self.append_polygons_covered_by_width(&mut out, scaled_epsilon);
        out
    }

    pub fn append_polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for entity in &self.entities {
            entity.polygons_covered_by_width(out, scaled_epsilon);
        }
    }

    /// Concatenated coverage of every child at line spacing.
    pub fn polygons_covered_by_spacing(&self, scaled_epsilon: CoordF) -> Result<Polygons> {
        let mut out = Vec::new();
        self.append_polygons_covered_by_spacing(&mut out, scaled_epsilon)?;
        Ok(out)
    }

    pub fn append_polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) -> Result<()> {
        for entity in &self.entities {
            entity.polygons_covered_by_spacing(out, scaled_epsilon)?;
        }
        Ok(())
    }

    pub fn collect_polylines(&self, out: &mut Polylines) {
        for entity in &self.entities {
            entity.collect_polylines(out);
        }
    }

    /// Leaf sequence of this tree.
    ///
    /// With `preserve_ordering`, nested collections marked `no_sort` are kept
    /// as single opaque children; otherwise every nested collection is
    /// expanded. The result inherits `no_sort` and has identity indices.
    pub fn flatten(&self, preserve_ordering: bool) -> ExtrusionEntityCollection {
        let mut flattener = FlattenEntities::new(preserve_ordering);
        flattener.use_collection(self);
        let mut result = flattener.into_result();
        result.no_sort = self.no_sort;
        result
    }

    /// Every leaf path, depth first, with nested structure dropped.
    pub fn into_paths(self) -> Vec<ExtrusionPath> {
        let mut paths = Vec::new();
        let mut stack: Vec<std::vec::IntoIter<ExtrusionEntity>> = vec![self.entities.into_iter()];
        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                Some(ExtrusionEntity::Path(path)) => paths.push(path),
                Some(ExtrusionEntity::Collection(collection)) => {
                    stack.push(collection.entities.into_iter())
                }
                None => {
                    stack.pop();
                }
            }
        }
        paths
    }
}

impl From<Vec<ExtrusionPath>> for ExtrusionEntityCollection {
    fn from(paths: Vec<ExtrusionPath>) -> Self {
        Self::from_entities(paths.into_iter().map(ExtrusionEntity::Path).collect())
    }
}

impl From<ExtrusionEntityCollection> for Vec<ExtrusionPath> {
    fn from(collection: ExtrusionEntityCollection) -> Self {
        collection.into_paths()
    }
}

impl FromIterator<ExtrusionEntity> for ExtrusionEntityCollection {
    fn from_iter<I: IntoIterator<Item = ExtrusionEntity>>(iter: I) -> Self {
        Self::from_entities(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ExtrusionEntityCollection {
    type Item = &'a ExtrusionEntity;
    type IntoIter = std::slice::Iter<'a, ExtrusionEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polyline;

    fn segment(x0: i64, x1: i64, role: ExtrusionRole) -> ExtrusionPath {
        ExtrusionPath::new(
            Polyline::from_points(vec![Point::new(x0, 0), Point::new(x1, 0)]),
            role,
            0.45,
            0.2,
        )
    }

    fn perimeter(x0: i64, x1: i64) -> ExtrusionPath {
        segment(x0, x1, ExtrusionRole::Perimeter)
    }

    #[test]
    fn test_role_aggregation() {
        let mut c = ExtrusionEntityCollection::new();
        assert_eq!(c.role(), ExtrusionRole::None);

        c.append_path(perimeter(0, 10));
        c.append_path(perimeter(20, 30));
        assert_eq!(c.role(), ExtrusionRole::Perimeter);

        c.append_path(segment(40, 50, ExtrusionRole::GapFill));
        assert_eq!(c.role(), ExtrusionRole::Mixed);

        c.remove(2).unwrap();
        assert_eq!(c.role(), ExtrusionRole::Perimeter);
    }

    #[test]
    fn test_append_tracks_indices() {
        let mut c = ExtrusionEntityCollection::new();
        c.append_path(perimeter(0, 10));
        c.append_paths(vec![perimeter(10, 20), perimeter(20, 30)]);
        assert_eq!(c.orig_indices(), &[0, 1, 2]);

        let mut moved = vec![ExtrusionEntity::from(perimeter(30, 40))];
        c.append_entities(&mut moved);
        assert!(moved.is_empty());

        let copied = vec![ExtrusionEntity::from(perimeter(40, 50))];
        c.append_copy(&copied);
        assert_eq!(copied.len(), 1);

        assert_eq!(c.len(), 5);
        assert_eq!(c.orig_indices(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_remove_and_replace_keep_indices_in_sync() {
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 1), perimeter(1, 2), perimeter(2, 3)]);

        let old = c.replace(1, perimeter(5, 6)).unwrap();
        assert_eq!(old.first_point().unwrap(), Point::new(1, 0));
        assert_eq!(c.orig_indices(), &[0, 1, 2]);

        c.remove(0).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.orig_indices(), &[1, 2]);
        assert_eq!(c.first_point().unwrap(), Point::new(5, 0));
    }

    #[test]
    fn test_out_of_range() {
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 1)]);
        assert!(matches!(
            c.remove(1),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            c.replace(7, perimeter(0, 1)),
            Err(Error::IndexOutOfRange { index: 7, len: 1 })
        ));
        assert_eq!(c.len(), 1);
        assert_eq!(c.orig_indices(), &[0]);
    }

    #[test]
    fn test_empty_endpoints() {
        let c = ExtrusionEntityCollection::new();
        assert!(matches!(
            c.first_point(),
            Err(Error::EmptyCollection {
                operation: "first_point"
            })
        ));
        assert!(c.last_point().is_err());
    }

    #[test]
    fn test_clear_and_swap() {
        let mut a = ExtrusionEntityCollection::from(vec![perimeter(0, 1), perimeter(1, 2)]);
        let mut b = ExtrusionEntityCollection::new_no_sort();
        a.swap(&mut b);
        assert!(a.is_empty());
        assert!(a.no_sort);
        assert_eq!(b.len(), 2);
        assert!(!b.no_sort);
        assert_eq!(b.orig_indices(), &[0, 1]);

        b.clear();
        assert!(b.is_empty());
        assert!(b.orig_indices().is_empty());
    }

    #[test]
    fn test_items_count_recursive() {
        let mut inner = ExtrusionEntityCollection::from(vec![perimeter(0, 1), perimeter(1, 2)]);
        inner.append_collection(ExtrusionEntityCollection::new());
        let mut outer = ExtrusionEntityCollection::from(vec![perimeter(5, 6)]);
        outer.append_collection(inner);
        assert_eq!(outer.len(), 2);
        assert_eq!(outer.items_count(), 3);
    }

    #[test]
    fn test_reverse() {
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 10), perimeter(20, 30)]);
        c.reverse().unwrap();
        assert_eq!(c.first_point().unwrap(), Point::new(30, 0));
        assert_eq!(c.last_point().unwrap(), Point::new(0, 0));
        assert_eq!(c.orig_indices(), &[1, 0]);
    }

    #[test]
    fn test_reverse_locked() {
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 10), perimeter(20, 30)]);
        c.no_sort = true;
        let before = c.clone();
        assert!(matches!(c.reverse(), Err(Error::Locked)));
        assert_eq!(c, before);
    }

    #[test]
    fn test_reverse_keeps_locked_child() {
        let locked = {
            let mut l = ExtrusionEntityCollection::from(vec![perimeter(40, 50), perimeter(60, 70)]);
            l.no_sort = true;
            l
        };
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 10)]);
        c.append_collection(locked.clone());
        c.reverse().unwrap();

        assert_eq!(c.get(0), Some(&ExtrusionEntity::Collection(locked)));
        assert_eq!(c.last_point().unwrap(), Point::new(0, 0));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let inner = ExtrusionEntityCollection::from(vec![perimeter(0, 1)]);
        let mut original = ExtrusionEntityCollection::new();
        original.append_collection(inner);

        let mut copy = original.clone();
        if let Some(ExtrusionEntity::Collection(nested)) = copy.get_mut(0) {
            nested.append_path(perimeter(1, 2));
        }
        assert_eq!(original.items_count(), 1);
        assert_eq!(copy.items_count(), 2);
    }

    #[test]
    fn test_min_mm3_per_mm() {
        assert_eq!(ExtrusionEntityCollection::new().min_mm3_per_mm(), 0.0);

        let thin = ExtrusionPath::new(
            Polyline::from_points(vec![Point::new(0, 0), Point::new(10, 0)]),
            ExtrusionRole::GapFill,
            0.3,
            0.2,
        );
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 1)]);
        c.append_collection(ExtrusionEntityCollection::new());
        c.append_collection(ExtrusionEntityCollection::from(vec![thin.clone()]));
        assert!((c.min_mm3_per_mm() - thin.mm3_per_mm()).abs() < 1e-12);
    }

    #[test]
    fn test_into_paths_flattens() {
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 1)]);
        c.append_collection(ExtrusionEntityCollection::from(vec![perimeter(2, 3), perimeter(4, 5)]));
        c.append_path(perimeter(6, 7));

        let paths: Vec<ExtrusionPath> = c.into();
        let starts: Vec<i64> = paths.iter().map(|p| p.first_point().unwrap().x).collect();
        assert_eq!(starts, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_serde_rebuilds_indices() {
        let mut c = ExtrusionEntityCollection::from(vec![perimeter(0, 1), perimeter(5, 6)]);
        c.reverse().unwrap();
        assert_eq!(c.orig_indices(), &[1, 0]);

        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("orig_indices"));
        let back: ExtrusionEntityCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entities(), c.entities());
        assert_eq!(back.orig_indices(), &[0, 1]);
    }
}
