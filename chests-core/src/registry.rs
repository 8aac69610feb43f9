//! The chest registry: every placed chest, indexed by location and by chunk.
//!
//! Maps chunk keys to the chests inside them so chunk-local lookups don't scan
//! the whole world.

use std::mem;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chests_utils::{BlockPos, ChestLocation, ChunkKey, ResourceLocation};
use rustc_hash::FxHashMap;
use scc::HashMap;
use scc::hash_map::Entry;
use uuid::Uuid;

use crate::block_entity::TileEntityBridge;
use crate::chest::{Chest, ChestData, ChestId, ChestType};
use crate::proximity::ProximityQuery;
use crate::world::WorldOracle;

/// Registry of placed chests.
///
/// Thread-safe via `scc::HashMap`, with locking per bucket rather than over
/// the whole registry.
///
/// The registry keeps three structures in step:
/// - `by_location`: the primary index, one chest per block
/// - `by_chunk`: chests grouped by the chunk column they sit in
/// - `live`: every indexed chest by id, scanned for listings and proximity queries
///
/// Writers take the `by_location` entry for a location first, then the chunk
/// bucket, then `live`, and hold the location entry until all three agree.
pub struct ChestRegistry {
    by_location: HashMap<ChestLocation, Arc<Chest>>,
    by_chunk: HashMap<ChunkKey, FxHashMap<BlockPos, Arc<Chest>>>,
    live: HashMap<ChestId, Arc<Chest>>,
    next_id: AtomicU64,
    world: Arc<dyn WorldOracle>,
    tile_entities: Arc<dyn TileEntityBridge>,
    /// The block a chest must stand on to stay registered.
    container_block: ResourceLocation,
}

impl ChestRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(
        world: Arc<dyn WorldOracle>,
        tile_entities: Arc<dyn TileEntityBridge>,
        container_block: ResourceLocation,
    ) -> Self {
        Self {
            by_location: HashMap::new(),
            by_chunk: HashMap::new(),
            live: HashMap::new(),
            next_id: AtomicU64::new(1),
            world,
            tile_entities,
            container_block,
        }
    }

    /// Places a chest, replacing whatever chest was registered at `location`.
    pub fn insert(
        &self,
        location: ChestLocation,
        chest_type: ChestType,
        data: Arc<ChestData>,
        owner: Uuid,
    ) -> Arc<Chest> {
        let id = ChestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let chest = Arc::new(Chest::new(id, location.clone(), chest_type, data, owner));

        match self.by_location.entry_sync(location) {
            Entry::Occupied(mut entry) => {
                let previous = mem::replace(entry.get_mut(), chest.clone());
                log::debug!(
                    "Chest {} at {} replaced by {}",
                    previous.id(),
                    previous.location(),
                    chest.id()
                );
                self.unlink(&previous);
                self.link(&chest);
            }
            Entry::Vacant(entry) => {
                self.link(&chest);
                entry.insert_entry(chest.clone());
            }
        }

        self.tile_entities.bind_storage(&chest);
        log::debug!("Chest {} ({}) added at {}", chest.id(), chest_type, chest.location());
        chest
    }

    /// Inserts many chests at once, as read back from storage.
    ///
    /// Returns how many were inserted.
    pub fn load_all(
        &self,
        chests: impl IntoIterator<Item = (ChestLocation, ChestType, Arc<ChestData>, Uuid)>,
    ) -> usize {
        let mut loaded = 0;
        for (location, chest_type, data, owner) in chests {
            self.insert(location, chest_type, data, owner);
            loaded += 1;
        }
        loaded
    }

    /// Removes the chest at `location` from every index.
    pub fn remove(&self, location: &ChestLocation) -> Option<Arc<Chest>> {
        match self.by_location.entry_sync(location.clone()) {
            Entry::Occupied(entry) => {
                let chest = entry.get().clone();
                self.unlink(&chest);
                let _ = entry.remove_entry();
                log::debug!("Chest {} removed from {location}", chest.id());
                Some(chest)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Gets the chest of type `chest_type` at `location`.
    ///
    /// Returns `None` if there is no chest there, if the chest there is of
    /// another type, or if its block turns out to be gone. The block is only
    /// checked when its chunk is active; chests in unloaded chunks are returned
    /// as cached.
    #[must_use]
    pub fn get_by_location(
        &self,
        location: &ChestLocation,
        chest_type: ChestType,
    ) -> Option<Arc<Chest>> {
        let chest = self.by_location.read_sync(location, |_, chest| chest.clone())?;

        if !self.is_still_placed(&chest) {
            self.evict(&chest);
            return None;
        }

        (chest.chest_type() == chest_type).then_some(chest)
    }

    /// Gets the regular chest at `location`.
    #[must_use]
    pub fn get_chest(&self, location: &ChestLocation) -> Option<Arc<Chest>> {
        self.get_by_location(location, ChestType::Chest)
    }

    /// Gets the linked chest at `location`.
    #[must_use]
    pub fn get_linked_chest(&self, location: &ChestLocation) -> Option<Arc<Chest>> {
        self.get_by_location(location, ChestType::LinkedChest)
    }

    /// Gets the storage unit at `location`.
    #[must_use]
    pub fn get_storage_chest(&self, location: &ChestLocation) -> Option<Arc<Chest>> {
        self.get_by_location(location, ChestType::StorageUnit)
    }

    /// A snapshot of every registered chest, in no particular order.
    #[must_use]
    pub fn chests(&self) -> Vec<Arc<Chest>> {
        let mut chests = Vec::with_capacity(self.live.len());
        self.live.iter_sync(|_, chest| {
            chests.push(chest.clone());
            true
        });
        chests
    }

    /// A snapshot of the chests inside one chunk column.
    #[must_use]
    pub fn chests_in_chunk(&self, chunk: &ChunkKey) -> Vec<Arc<Chest>> {
        self.by_chunk
            .read_sync(chunk, |_, bucket| bucket.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Chests that should pull in items dropped at `location`, nearest first.
    #[must_use]
    pub fn nearby_chests(&self, location: &ChestLocation) -> Vec<Arc<Chest>> {
        ProximityQuery::new(location).run(self.chests())
    }

    /// Every linked chest sharing contents with `chest`, itself included.
    ///
    /// Chests share contents when they link into the same chest; an unlinked
    /// chest is the root of its own group. Returns nothing for other types.
    #[must_use]
    pub fn all_linked_chests(&self, chest: &Chest) -> Vec<Arc<Chest>> {
        let Some(root) = link_root(chest) else {
            return Vec::new();
        };

        self.chests()
            .into_iter()
            .filter(|other| link_root(other).is_some_and(|other_root| other_root == root))
            .collect()
    }

    /// Returns the number of registered chests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    /// Returns true if no chests are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }

    /// Returns the number of chunk buckets currently held.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.by_chunk.len()
    }

    /// Drops every chest.
    pub fn clear(&self) {
        self.by_location.clear_sync();
        self.by_chunk.clear_sync();
        self.live.clear_sync();
    }

    fn is_still_placed(&self, chest: &Chest) -> bool {
        let location = chest.location();
        if !self
            .world
            .is_chunk_active(&location.world, location.pos.chunk())
        {
            return true;
        }

        self.world
            .block_type_at(location)
            .is_some_and(|block| block == self.container_block)
    }

    /// Removes `chest` if it is still the one registered at its location.
    fn evict(&self, chest: &Chest) {
        if let Entry::Occupied(entry) = self.by_location.entry_sync(chest.location().clone())
            && entry.get().id() == chest.id()
        {
            self.unlink(chest);
            let _ = entry.remove_entry();
            log::warn!(
                "Chest {} at {} no longer has its block, removed it",
                chest.id(),
                chest.location()
            );
        }
    }

    fn link(&self, chest: &Arc<Chest>) {
        let location = chest.location();
        self.by_chunk
            .entry_sync(location.chunk_key())
            .or_default()
            .get_mut()
            .insert(location.pos, chest.clone());
        let _ = self.live.insert_sync(chest.id(), chest.clone());
    }

    fn unlink(&self, chest: &Chest) {
        let location = chest.location();
        let chunk = location.chunk_key();

        let should_remove = self
            .by_chunk
            .update_sync(&chunk, |_, bucket| {
                if bucket
                    .get(&location.pos)
                    .is_some_and(|indexed| indexed.id() == chest.id())
                {
                    bucket.remove(&location.pos);
                }
                bucket.is_empty()
            })
            .unwrap_or(false);

        if should_remove {
            let _ = self
                .by_chunk
                .remove_if_sync(&chunk, |bucket| bucket.is_empty());
        }

        let _ = self.live.remove_sync(&chest.id());
    }
}

fn link_root(chest: &Chest) -> Option<ChestLocation> {
    chest
        .as_linked()
        .map(|linked| linked.linked_to().unwrap_or_else(|| chest.location().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestWorld, loc, template};

    const ALL_TYPES: [ChestType; 3] = [
        ChestType::Chest,
        ChestType::LinkedChest,
        ChestType::StorageUnit,
    ];

    #[test]
    fn test_empty_location_has_no_chest() {
        let world = TestWorld::new();
        let location = loc(10, 64, 10);

        for chest_type in ALL_TYPES {
            assert!(world.registry.get_by_location(&location, chest_type).is_none());
        }
    }

    #[test]
    fn test_insert_and_get_filters_type() {
        let world = TestWorld::new();
        let location = loc(10, 64, 10);
        let owner = Uuid::new_v4();

        let chest = world.registry.insert(
            location.clone(),
            ChestType::Chest,
            template("basic", ChestType::Chest),
            owner,
        );

        let found = world.registry.get_chest(&location).expect("regular chest");
        assert!(Arc::ptr_eq(&found, &chest));
        assert_eq!(found.owner(), owner);
        assert!(world.registry.get_linked_chest(&location).is_none());
        assert!(world.registry.get_storage_chest(&location).is_none());
        assert_eq!(world.bridge.bound(), 1);
    }

    #[test]
    fn test_remove_clears_every_index() {
        let world = TestWorld::new();
        let a = loc(1, 64, 1);
        let b = loc(2, 64, 2);
        let data = template("basic", ChestType::Chest);

        world.registry.insert(a.clone(), ChestType::Chest, data.clone(), Uuid::nil());
        world.registry.insert(b.clone(), ChestType::Chest, data, Uuid::nil());
        assert_eq!(world.registry.chests_in_chunk(&a.chunk_key()).len(), 2);

        let removed = world.registry.remove(&a).expect("removed");
        assert_eq!(removed.location(), &a);

        assert!(world.registry.get_chest(&a).is_none());
        assert_eq!(world.registry.chests().len(), 1);
        let bucket = world.registry.chests_in_chunk(&a.chunk_key());
        assert_eq!(bucket.len(), 1);
        assert!(bucket.iter().all(|chest| chest.location() == &b));

        assert!(world.registry.remove(&a).is_none());
    }

    #[test]
    fn test_remove_prunes_empty_buckets() {
        let world = TestWorld::new();
        let data = template("basic", ChestType::Chest);

        for i in 0..32 {
            world
                .registry
                .insert(loc(i * 16, 64, 0), ChestType::Chest, data.clone(), Uuid::nil());
        }
        assert_eq!(world.registry.chunk_count(), 32);

        for i in 0..32 {
            assert!(world.registry.remove(&loc(i * 16, 64, 0)).is_some());
        }
        assert_eq!(world.registry.chunk_count(), 0);
        assert!(world.registry.is_empty());
        assert!(world.registry.chests().is_empty());
    }

    #[test]
    fn test_chunk_buckets_only_hold_their_chunk() {
        let world = TestWorld::new();
        let data = template("basic", ChestType::Chest);
        let locations = [
            loc(0, 64, 0),
            loc(15, 10, 15),
            loc(16, 64, 0),
            loc(-1, 64, -1),
            loc(-16, 64, -16),
            loc(-17, 64, 5),
        ];

        for location in &locations {
            world
                .registry
                .insert(location.clone(), ChestType::Chest, data.clone(), Uuid::nil());
        }

        for location in &locations {
            let key = location.chunk_key();
            let bucket = world.registry.chests_in_chunk(&key);
            assert!(bucket.iter().any(|chest| chest.location() == location));
            assert!(bucket.iter().all(|chest| chest.location().chunk_key() == key));
        }
    }

    #[test]
    fn test_insert_replaces_previous_chest() {
        let world = TestWorld::new();
        let location = loc(3, 64, 3);

        let first = world.registry.insert(
            location.clone(),
            ChestType::Chest,
            template("basic", ChestType::Chest),
            Uuid::nil(),
        );
        let second = world.registry.insert(
            location.clone(),
            ChestType::StorageUnit,
            template("storage", ChestType::StorageUnit),
            Uuid::nil(),
        );

        assert_ne!(first.id(), second.id());
        assert!(world.registry.get_chest(&location).is_none());
        assert!(world.registry.get_storage_chest(&location).is_some());

        let all = world.registry.chests();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), second.id());
        assert_eq!(world.registry.chests_in_chunk(&location.chunk_key()).len(), 1);
    }

    #[test]
    fn test_missing_block_in_active_chunk_is_evicted() {
        let world = TestWorld::new();
        let location = loc(5, 64, 5);
        world.registry.insert(
            location.clone(),
            ChestType::Chest,
            template("basic", ChestType::Chest),
            Uuid::nil(),
        );

        world.oracle.activate(&location);
        world.oracle.set_block(&location, Some(ResourceLocation::vanilla_static("stone")));

        assert!(world.registry.get_chest(&location).is_none());
        assert!(world.registry.is_empty());
        assert!(world.registry.chests().is_empty());
        assert!(world.registry.chests_in_chunk(&location.chunk_key()).is_empty());
    }

    #[test]
    fn test_inactive_chunk_skips_validation() {
        let world = TestWorld::new();
        let location = loc(5, 64, 5);
        world.registry.insert(
            location.clone(),
            ChestType::Chest,
            template("basic", ChestType::Chest),
            Uuid::nil(),
        );

        world.oracle.set_block(&location, None);
        assert!(world.registry.get_chest(&location).is_some());

        world.oracle.activate(&location);
        assert!(world.registry.get_chest(&location).is_none());
    }

    #[test]
    fn test_evict_spares_chest_placed_since() {
        let world = TestWorld::new();
        let location = loc(7, 64, 7);
        let data = template("basic", ChestType::Chest);

        let stale = world.registry.insert(location.clone(), ChestType::Chest, data.clone(), Uuid::nil());
        let current = world.registry.insert(location.clone(), ChestType::Chest, data, Uuid::nil());

        world.registry.evict(&stale);

        let found = world.registry.get_chest(&location).expect("current chest");
        assert_eq!(found.id(), current.id());
        assert_eq!(world.registry.chests().len(), 1);
        let bucket = world.registry.chests_in_chunk(&location.chunk_key());
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].id(), current.id());
    }

    #[test]
    fn test_unloaded_chunk_stops_validation() {
        let world = TestWorld::new();
        let location = loc(5, 64, 5);
        world.registry.insert(
            location.clone(),
            ChestType::Chest,
            template("basic", ChestType::Chest),
            Uuid::nil(),
        );
        world.oracle.activate(&location);
        world.place_chest_block(&location);
        assert!(world.registry.get_chest(&location).is_some());

        world.oracle.deactivate(&location);
        world.oracle.set_block(&location, None);
        assert!(world.registry.get_chest(&location).is_some());
        assert_eq!(world.registry.len(), 1);
    }

    #[test]
    fn test_type_mismatch_still_validates() {
        let world = TestWorld::new();
        let location = loc(5, 64, 5);
        world.registry.insert(
            location.clone(),
            ChestType::Chest,
            template("basic", ChestType::Chest),
            Uuid::nil(),
        );
        world.oracle.activate(&location);

        world.place_chest_block(&location);
        assert!(world.registry.get_linked_chest(&location).is_none());
        assert_eq!(world.registry.len(), 1);

        world.oracle.set_block(&location, None);
        assert!(world.registry.get_linked_chest(&location).is_none());
        assert!(world.registry.is_empty());
    }

    #[test]
    fn test_linked_groups() {
        let world = TestWorld::new();
        let data = template("linked", ChestType::LinkedChest);
        let root = world.registry.insert(loc(0, 64, 0), ChestType::LinkedChest, data.clone(), Uuid::nil());
        let member = world.registry.insert(loc(40, 64, 0), ChestType::LinkedChest, data.clone(), Uuid::nil());
        let loner = world.registry.insert(loc(80, 64, 0), ChestType::LinkedChest, data, Uuid::nil());
        let regular = world.registry.insert(
            loc(120, 64, 0),
            ChestType::Chest,
            template("basic", ChestType::Chest),
            Uuid::nil(),
        );

        member
            .as_linked()
            .expect("linked")
            .link_into(Some(root.location().clone()));

        let mut group: Vec<ChestId> = world
            .registry
            .all_linked_chests(&member)
            .iter()
            .map(|chest| chest.id())
            .collect();
        group.sort();
        assert_eq!(group, vec![root.id(), member.id()]);

        assert_eq!(world.registry.all_linked_chests(&loner).len(), 1);
        assert!(world.registry.all_linked_chests(&regular).is_empty());
    }

    #[test]
    fn test_load_all_does_not_lose_chests() {
        let world = TestWorld::new();
        let data = template("basic", ChestType::Chest);

        let loaded = world.registry.load_all(
            (0..100).map(|i| (loc(i, 64, i * 3), ChestType::Chest, data.clone(), Uuid::nil())),
        );

        assert_eq!(loaded, 100);
        assert_eq!(world.registry.len(), 100);
        assert_eq!(world.registry.chests().len(), 100);
        assert_eq!(world.bridge.bound(), 100);
    }

    #[test]
    fn test_concurrent_insert_and_remove() {
        let world = TestWorld::new();
        let data = template("basic", ChestType::Chest);

        std::thread::scope(|scope| {
            for t in 0..4 {
                let registry = &world.registry;
                let data = data.clone();
                scope.spawn(move || {
                    for i in 0..250 {
                        let location = loc(t * 1000 + i, 64, i % 7);
                        registry.insert(location.clone(), ChestType::Chest, data.clone(), Uuid::nil());
                        if i % 2 == 0 {
                            registry.remove(&location);
                        }
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..50 {
                    let _ = world.registry.chests();
                }
            });
        });

        assert_eq!(world.registry.len(), 500);
        assert_eq!(world.registry.chests().len(), 500);
        let bucketed: usize = world
            .registry
            .chests()
            .iter()
            .map(|chest| chest.location().chunk_key())
            .collect::<rustc_hash::FxHashSet<_>>()
            .iter()
            .map(|key| world.registry.chests_in_chunk(key).len())
            .sum();
        assert_eq!(bucketed, 500);
    }
}
