//! Double-dispatch traversal of extrusion trees.
//!
//! A visitor receives one callback per entity kind and decides itself
//! whether to descend into collections. [`ExtrusionEntity::visit`] and
//! [`ExtrusionEntity::visit_mut`] pick the callback, so callers never match
//! on the entity kind.

use log::debug;

use super::{ExtrusionEntity, ExtrusionEntityCollection, ExtrusionPath, ExtrusionRole};

/// Visitor over a borrowed tree.
pub trait ExtrusionVisitorConst {
    fn use_path(&mut self, path: &ExtrusionPath);

    /// Called for a collection. The default descends into every child.
    fn use_collection(&mut self, collection: &ExtrusionEntityCollection) {
        for entity in collection {
            entity.visit(self);
        }
    }
}

/// Visitor over a mutably borrowed tree.
pub trait ExtrusionVisitor {
    fn use_path(&mut self, path: &mut ExtrusionPath);

    fn use_collection(&mut self, collection: &mut ExtrusionEntityCollection) {
        for entity in collection.iter_mut() {
            entity.visit_mut(self);
        }
    }
}

/// Counts leaf paths. Collections are not counted themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountEntities {
    pub leaves: usize,
}

impl ExtrusionVisitorConst for CountEntities {
    fn use_path(&mut self, _path: &ExtrusionPath) {
        self.leaves += 1;
    }
}

/// Collects the leaves of a tree into a new collection.
///
/// Without `preserve_ordering` every nested collection is expanded. With it,
/// a nested collection is expanded only if it is sortable; a `no_sort`
/// collection is copied whole as a single child so its fixed order survives.
#[derive(Debug, Clone)]
pub struct FlattenEntities {
    preserve_ordering: bool,
    result: ExtrusionEntityCollection,
}

impl FlattenEntities {
    pub fn new(preserve_ordering: bool) -> Self {
        Self {
            preserve_ordering,
            result: ExtrusionEntityCollection::new(),
        }
    }

    #[inline]
    pub fn preserve_ordering(&self) -> bool {
        self.preserve_ordering
    }

    pub fn result(&self) -> &ExtrusionEntityCollection {
        &self.result
    }

    pub fn into_result(self) -> ExtrusionEntityCollection {
        debug!(
            "Flattened into {} entities (preserve_ordering={})",
            self.result.len(),
            self.preserve_ordering
        );
        self.result
    }
}

impl ExtrusionVisitorConst for FlattenEntities {
    fn use_path(&mut self, path: &ExtrusionPath) {
        self.result.append_path(path.clone());
    }

    fn use_collection(&mut self, collection: &ExtrusionEntityCollection) {
        for entity in collection {
            match entity {
                ExtrusionEntity::Collection(nested)
                    if self.preserve_ordering && !nested.can_reverse() =>
                {
                    self.result.append_collection(nested.clone());
                }
                _ => entity.visit(self),
            }
        }
    }
}

/// Rewrites the role of every leaf in place.
#[derive(Debug, Clone, Copy)]
pub struct OverrideRole {
    pub role: ExtrusionRole,
}

impl OverrideRole {
    pub fn new(role: ExtrusionRole) -> Self {
        Self { role }
    }
}

impl ExtrusionVisitor for OverrideRole {
    fn use_path(&mut self, path: &mut ExtrusionPath) {
        path.set_role(self.role);
    }
}
