//! Extrusion roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of extrusion for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtrusionRole {
    /// No role: an empty collection, or an unclassified entity.
    #[default]
    None,
    /// External (outer) perimeter.
    ExternalPerimeter,
    /// Internal perimeter.
    Perimeter,
    /// Perimeter printed over air.
    OverhangPerimeter,
    /// Sparse infill.
    InternalInfill,
    /// Solid infill (top/bottom surfaces).
    SolidInfill,
    /// Top solid infill (visible surface).
    TopSolidInfill,
    /// Ironing pass over a top surface.
    Ironing,
    /// Bridge infill (over gaps).
    BridgeInfill,
    /// Single-line wall.
    ThinWall,
    /// Gap fill (thin areas).
    GapFill,
    /// Skirt/brim.
    Skirt,
    /// Support material.
    SupportMaterial,
    /// Support interface.
    SupportMaterialInterface,
    /// Wipe move.
    Wipe,
    /// Custom (user-defined).
    Custom,
    /// Children of a collection disagree on role. Also used as the
    /// "any role" wildcard by the chaining filter.
    Mixed,
}

impl ExtrusionRole {
    /// Check if this role is a perimeter.
    pub fn is_perimeter(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::ExternalPerimeter
                | ExtrusionRole::Perimeter
                | ExtrusionRole::OverhangPerimeter
        )
    }

    /// Check if this role is infill.
    pub fn is_infill(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::InternalInfill
                | ExtrusionRole::SolidInfill
                | ExtrusionRole::TopSolidInfill
                | ExtrusionRole::BridgeInfill
        )
    }

    /// Check if this role is support material.
    pub fn is_support(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::SupportMaterial | ExtrusionRole::SupportMaterialInterface
        )
    }

    /// Bridged extrusions are laid over air and form a round thread.
    pub fn is_bridge(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::BridgeInfill | ExtrusionRole::OverhangPerimeter
        )
    }

    /// True if a path with role `self` passes a chaining filter of `filter`.
    #[inline]
    pub fn matches_filter(&self, filter: ExtrusionRole) -> bool {
        filter == ExtrusionRole::Mixed || *self == filter
    }

    /// Aggregate role of a sequence of roles: the common role when uniform,
    /// `None` when empty, `Mixed` otherwise.
    pub fn aggregate<I: IntoIterator<Item = ExtrusionRole>>(roles: I) -> ExtrusionRole {
        let mut iter = roles.into_iter();
        let Some(first) = iter.next() else {
            return ExtrusionRole::None;
        };
        if iter.all(|r| r == first) {
            first
        } else {
            ExtrusionRole::Mixed
        }
    }

    /// Get a human-readable name for this role.
    pub fn name(&self) -> &'static str {
        match self {
            ExtrusionRole::None => "none",
            ExtrusionRole::ExternalPerimeter => "external perimeter",
            ExtrusionRole::Perimeter => "perimeter",
            ExtrusionRole::OverhangPerimeter => "overhang perimeter",
            ExtrusionRole::InternalInfill => "internal infill",
            ExtrusionRole::SolidInfill => "solid infill",
            ExtrusionRole::TopSolidInfill => "top solid infill",
            ExtrusionRole::Ironing => "ironing",
            ExtrusionRole::BridgeInfill => "bridge infill",
            ExtrusionRole::ThinWall => "thin wall",
            ExtrusionRole::GapFill => "gap fill",
            ExtrusionRole::Skirt => "skirt",
            ExtrusionRole::SupportMaterial => "support material",
            ExtrusionRole::SupportMaterialInterface => "support interface",
            ExtrusionRole::Wipe => "wipe",
            ExtrusionRole::Custom => "custom",
            ExtrusionRole::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ExtrusionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_roles() {
        use ExtrusionRole::*;
        assert_eq!(ExtrusionRole::aggregate([]), None);
        assert_eq!(ExtrusionRole::aggregate([Perimeter, Perimeter]), Perimeter);
        assert_eq!(ExtrusionRole::aggregate([Perimeter, GapFill]), Mixed);
        assert_eq!(ExtrusionRole::aggregate([Mixed]), Mixed);
    }

    #[test]
    fn test_matches_filter() {
        assert!(ExtrusionRole::Perimeter.matches_filter(ExtrusionRole::Mixed));
        assert!(ExtrusionRole::Perimeter.matches_filter(ExtrusionRole::Perimeter));
        assert!(!ExtrusionRole::Perimeter.matches_filter(ExtrusionRole::GapFill));
    }

    #[test]
    fn test_role_classification() {
        assert!(ExtrusionRole::OverhangPerimeter.is_perimeter());
        assert!(ExtrusionRole::OverhangPerimeter.is_bridge());
        assert!(!ExtrusionRole::SolidInfill.is_bridge());
        assert!(ExtrusionRole::SupportMaterialInterface.is_support());
        assert_eq!(ExtrusionRole::BridgeInfill.to_string(), "bridge infill");
    }
}
