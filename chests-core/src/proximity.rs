//! Auto-suction search: which chests pull in an item at a given location.

use std::sync::Arc;

use chests_utils::ChestLocation;

use crate::chest::{Chest, SuctionScope};

/// A single nearby-chest query.
///
/// Holds no state besides the query location; callers hand it a snapshot of
/// the chests to consider, so no lock is held while filtering and sorting.
pub struct ProximityQuery<'a> {
    location: &'a ChestLocation,
}

impl<'a> ProximityQuery<'a> {
    #[must_use]
    pub const fn new(location: &'a ChestLocation) -> Self {
        Self { location }
    }

    /// Returns true if `chest` reaches the query location.
    #[must_use]
    pub fn reaches(&self, chest: &Chest) -> bool {
        let target = self.location;
        let origin = chest.location();
        if origin.world != target.world {
            return false;
        }

        match chest.data().suction_scope() {
            Some(SuctionScope::Chunk { range }) => {
                origin.pos.chunk() == target.pos.chunk()
                    && origin.pos.y().abs_diff(target.pos.y()) <= range
            }
            Some(SuctionScope::Radius { range }) => {
                let range = u64::from(range);
                origin.pos.distance_squared(&target.pos) <= range * range
            }
            None => false,
        }
    }

    /// Keeps the chests reaching the query location, nearest first.
    ///
    /// Chests at the same distance come out in no particular order.
    #[must_use]
    pub fn run(&self, chests: Vec<Arc<Chest>>) -> Vec<Arc<Chest>> {
        let mut nearby: Vec<(u64, Arc<Chest>)> = chests
            .into_iter()
            .filter(|chest| self.reaches(chest))
            .map(|chest| (chest.location().pos.distance_squared(&self.location.pos), chest))
            .collect();

        nearby.sort_unstable_by_key(|(distance, _)| *distance);
        nearby.into_iter().map(|(_, chest)| chest).collect()
    }
}
