//! # Extrusion Entity Tree
//!
//! A layer's toolpaths as a tree:
//! - [`ExtrusionPath`] - leaf: a centerline with width, height, role and flow
//! - [`ExtrusionEntityCollection`] - owning group of entities, optionally
//!   order-locked (`no_sort`), with an index table back to the prior order
//! - [`ExtrusionEntity`] - either of the two
//!
//! Operations on the tree:
//! - Chaining (`chained_path`, `chained_path_from`): greedy nearest-neighbour
//!   reordering of a collection's direct children
//! - Flattening (`flatten`) and other traversals through the visitor traits
//! - Coverage (`polygons_covered_by_width` / `_spacing`): the area swept by
//!   the extrusions, for downstream boolean merging

mod chain;
mod collection;
mod entity;
mod path;
mod role;
mod visitor;

pub use chain::{chain_order, ChainEnds, ChainStep};
pub use collection::ExtrusionEntityCollection;
pub use entity::ExtrusionEntity;
pub use path::ExtrusionPath;
pub use role::ExtrusionRole;
pub use visitor::{
    CountEntities, ExtrusionVisitor, ExtrusionVisitorConst, FlattenEntities, OverrideRole,
};
