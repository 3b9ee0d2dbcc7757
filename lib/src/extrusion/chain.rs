//! Travel-minimizing ordering of a collection's children.
//!
//! The ordering is the greedy nearest-neighbour heuristic: from the current
//! position, take the closest remaining child endpoint, optionally entering
//! a reversible child from its far end, then continue from where that child
//! ends. It is O(n²) in the number of direct children and is not a full
//! travelling-salesman solve.

use log::{debug, trace, warn};

use super::{ExtrusionEntity, ExtrusionEntityCollection, ExtrusionRole};
use crate::geometry::Point;
use crate::{CoordF, Result};

/// Endpoints of one chaining candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainEnds {
    pub first: Point,
    pub last: Point,
    pub can_reverse: bool,
}

/// One step of a chained order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStep {
    /// Position of the candidate in the input slice.
    pub index: usize,
    /// Whether the candidate is entered from its last point.
    pub reversed: bool,
}

/// Greedy nearest-neighbour order over `candidates`.
///
/// The walk starts at `start`, or at the first candidate's first point.
/// Equal distances go to the lower input index, and a child is entered from
/// its first point when both ends are equally near.
pub fn chain_order(candidates: &[ChainEnds], start: Option<Point>, no_reverse: bool) -> Vec<ChainStep> {
    let Some(seed) = start.or_else(|| candidates.first().map(|c| c.first)) else {
        return Vec::new();
    };

    let mut remaining: Vec<usize> = (0..candidates.len()).collect();
    let mut order = Vec::with_capacity(candidates.len());
    let mut current = seed;

    while !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_dist = i128::MAX;
        let mut reverse_best = false;

        for (pos, &idx) in remaining.iter().enumerate() {
            let candidate = &candidates[idx];

            let dist = current.distance_squared(&candidate.first);
            if dist < best_dist {
                best_dist = dist;
                best_pos = pos;
                reverse_best = false;
            }

            if candidate.can_reverse && !no_reverse {
                let dist = current.distance_squared(&candidate.last);
                if dist < best_dist {
                    best_dist = dist;
                    best_pos = pos;
                    reverse_best = true;
                }
            }
        }

        let index = remaining.remove(best_pos);
        let picked = &candidates[index];
        trace!(
            "chain pick #{} at d²={} reversed={}",
            index,
            best_dist,
            reverse_best
        );
        current = if reverse_best { picked.first } else { picked.last };
        order.push(ChainStep {
            index,
            reversed: reverse_best,
        });
    }

    order
}

impl ExtrusionEntityCollection {
    /// Chained order of the children, seeded at the first candidate's first
    /// point. See [`chained_path_from`](Self::chained_path_from).
    pub fn chained_path(&self, no_reverse: bool, role: ExtrusionRole) -> Result<ExtrusionEntityCollection> {
        self.chain(None, no_reverse, role)
    }

    /// Travel-minimizing reorder of the direct children, starting at
    /// `start`.
    ///
    /// A `no_sort` collection comes back unchanged with identity indices.
    /// Otherwise only children whose role passes `role` are kept
    /// ([`ExtrusionRole::Mixed`] keeps all). Reversible children may be
    /// reversed unless `no_reverse` is set. Children with no endpoints (empty
    /// paths or collections) are placed after the chained ones in their
    /// original order.
    ///
    /// The result's `orig_indices()[k]` is the position in `self` of the
    /// child now at `k`.
    pub fn chained_path_from(
        &self,
        start: Point,
        no_reverse: bool,
        role: ExtrusionRole,
    ) -> Result<ExtrusionEntityCollection> {
        self.chain(Some(start), no_reverse, role)
    }

    fn chain(&self, start: Option<Point>, no_reverse: bool, role: ExtrusionRole) -> Result<ExtrusionEntityCollection> {
        if self.no_sort {
            debug!("Chaining skipped: {} children locked by no_sort", self.len());
            return Ok(ExtrusionEntityCollection::from_reordered(
                self.entities().iter().cloned().enumerate().collect(),
                true,
            ));
        }

        let mut sources = Vec::new();
        let mut candidates = Vec::new();
        let mut endless = Vec::new();
        for (idx, entity) in self.entities().iter().enumerate() {
            if !entity.role().matches_filter(role) {
                continue;
            }
            match (entity.first_point(), entity.last_point()) {
                (Ok(first), Ok(last)) => {
                    sources.push(idx);
                    candidates.push(ChainEnds {
                        first,
                        last,
                        can_reverse: entity.can_reverse(),
                    });
                }
                _ => endless.push(idx),
            }
        }

        if !endless.is_empty() {
            warn!("{} children without endpoints left unchained", endless.len());
        }

        let order = chain_order(&candidates, start, no_reverse);

        let mut reordered: Vec<(usize, ExtrusionEntity)> = Vec::with_capacity(order.len() + endless.len());
        let mut reversals = 0;
        for step in &order {
            let idx = sources[step.index];
            let mut entity = self.entities()[idx].clone();
            if step.reversed {
                entity.reverse()?;
                reversals += 1;
            }
            reordered.push((idx, entity));
        }
        for idx in endless {
            reordered.push((idx, self.entities()[idx].clone()));
        }

        let result = ExtrusionEntityCollection::from_reordered(reordered, self.no_sort);
        debug!(
            "Chained {} of {} children (role filter: {}), {} reversed, travel {:.3} mm",
            result.len(),
            self.len(),
            role,
            reversals,
            result.travel_length(start) / crate::SCALING_FACTOR
        );
        Ok(result)
    }

    /// Straight-line travel between consecutive children, plus the move from
    /// `start` to the first one when given. Scaled units.
    ///
    /// Children without endpoints are skipped.
    pub fn travel_length(&self, start: Option<Point>) -> CoordF {
        let mut total = 0.0;
        let mut current = start;
        for entity in self.entities() {
            let (Ok(first), Ok(last)) = (entity.first_point(), entity.last_point()) else {
                continue;
            };
            if let Some(position) = current {
                total += position.distance(&first);
            }
            current = Some(last);
        }
        total
    }
}
