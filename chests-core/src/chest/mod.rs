//! Placed chests and the variant-specific state they carry.

mod data;

pub use data::{ChestData, ChestType, MAX_SUCTION_RANGE, SuctionScope};

use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use arc_swap::ArcSwap;
use chests_utils::ChestLocation;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ChestCatalog;

/// Process-unique id handed out by the registry on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChestId(pub u64);

impl fmt::Display for ChestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of a linked chest.
#[derive(Debug, Default)]
pub struct LinkedChest {
    linked_to: Mutex<Option<ChestLocation>>,
}

impl LinkedChest {
    /// The chest this one shares its contents with, if linked.
    #[must_use]
    pub fn linked_to(&self) -> Option<ChestLocation> {
        self.linked_to.lock().clone()
    }

    /// Links into `target`, or unlinks with `None`.
    pub fn link_into(&self, target: Option<ChestLocation>) {
        *self.linked_to.lock() = target;
    }
}

/// State of a storage unit.
#[derive(Debug, Default)]
pub struct StorageUnit {
    amount: AtomicU64,
}

impl StorageUnit {
    #[must_use]
    pub fn amount(&self) -> u64 {
        self.amount.load(Ordering::Acquire)
    }

    pub fn set_amount(&self, amount: u64) {
        self.amount.store(amount, Ordering::Release);
    }
}

/// The variant of a chest together with its variant-only state.
#[derive(Debug)]
pub enum ChestKind {
    Regular,
    Linked(LinkedChest),
    Storage(StorageUnit),
}

impl ChestKind {
    #[must_use]
    pub fn new(chest_type: ChestType) -> Self {
        match chest_type {
            ChestType::Chest => ChestKind::Regular,
            ChestType::LinkedChest => ChestKind::Linked(LinkedChest::default()),
            ChestType::StorageUnit => ChestKind::Storage(StorageUnit::default()),
        }
    }

    #[must_use]
    pub const fn chest_type(&self) -> ChestType {
        match self {
            ChestKind::Regular => ChestType::Chest,
            ChestKind::Linked(_) => ChestType::LinkedChest,
            ChestKind::Storage(_) => ChestType::StorageUnit,
        }
    }
}

/// A chest placed in the world.
pub struct Chest {
    id: ChestId,
    location: ChestLocation,
    owner: Uuid,
    kind: ChestKind,
    /// Cached template. Swapped when the catalog reloads.
    data: ArcSwap<ChestData>,
}

impl Chest {
    pub(crate) fn new(
        id: ChestId,
        location: ChestLocation,
        chest_type: ChestType,
        data: Arc<ChestData>,
        owner: Uuid,
    ) -> Self {
        Self {
            id,
            location,
            owner,
            kind: ChestKind::new(chest_type),
            data: ArcSwap::new(data),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ChestId {
        self.id
    }

    #[must_use]
    pub const fn location(&self) -> &ChestLocation {
        &self.location
    }

    /// The player who placed this chest.
    #[must_use]
    pub const fn owner(&self) -> Uuid {
        self.owner
    }

    #[must_use]
    pub const fn kind(&self) -> &ChestKind {
        &self.kind
    }

    #[must_use]
    pub const fn chest_type(&self) -> ChestType {
        self.kind.chest_type()
    }

    /// The template this chest currently runs with.
    #[must_use]
    pub fn data(&self) -> Arc<ChestData> {
        self.data.load_full()
    }

    /// Returns the linked-chest state if this is a linked chest.
    #[must_use]
    pub const fn as_linked(&self) -> Option<&LinkedChest> {
        match &self.kind {
            ChestKind::Linked(linked) => Some(linked),
            _ => None,
        }
    }

    /// Returns the storage state if this is a storage unit.
    #[must_use]
    pub const fn as_storage(&self) -> Option<&StorageUnit> {
        match &self.kind {
            ChestKind::Storage(storage) => Some(storage),
            _ => None,
        }
    }

    /// Re-resolves the cached template by name after a catalog reload.
    ///
    /// Returns false and keeps the old template if the name is gone.
    pub fn update_data(&self, catalog: &ChestCatalog) -> bool {
        let name = self.data.load().name.clone();
        match catalog.get(&name) {
            Some(data) => {
                self.data.store(data);
                true
            }
            None => {
                log::warn!(
                    "Chest {} at {} references missing template {name}, keeping previous settings",
                    self.id,
                    self.location
                );
                false
            }
        }
    }
}

impl fmt::Debug for Chest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chest")
            .field("id", &self.id)
            .field("location", &self.location)
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("template", &self.data.load().name)
            .finish()
    }
}

/// What gets persisted about a chest, and what is read back at startup.
///
/// The chest type is kept as its raw tag so a record written by a newer or
/// broken build fails restore instead of silently turning into a plain chest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestRecord {
    pub owner: Uuid,
    pub location: ChestLocation,
    pub template: String,
    pub chest_type: String,
}

impl ChestRecord {
    #[must_use]
    pub fn of(chest: &Chest) -> Self {
        Self {
            owner: chest.owner(),
            location: chest.location().clone(),
            template: chest.data().name.clone(),
            chest_type: chest.chest_type().as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStack;
    use chests_utils::ResourceLocation;

    fn chest(chest_type: ChestType) -> Chest {
        let data = ChestData::new(
            "test",
            chest_type,
            ItemStack::of(ResourceLocation::vanilla_static("chest")),
        );
        Chest::new(
            ChestId(1),
            ChestLocation::new(ResourceLocation::vanilla_static("overworld"), 1, 2, 3),
            chest_type,
            Arc::new(data),
            Uuid::nil(),
        )
    }

    #[test]
    fn test_downcasts_match_variant() {
        let regular = chest(ChestType::Chest);
        assert!(regular.as_linked().is_none());
        assert!(regular.as_storage().is_none());

        let linked = chest(ChestType::LinkedChest);
        assert!(linked.as_linked().is_some());
        assert!(linked.as_storage().is_none());

        let storage = chest(ChestType::StorageUnit);
        assert!(storage.as_storage().is_some());
        assert!(storage.as_linked().is_none());
    }

    #[test]
    fn test_kind_matches_type() {
        for chest_type in [ChestType::Chest, ChestType::LinkedChest, ChestType::StorageUnit] {
            let chest = chest(chest_type);
            assert_eq!(chest.kind().chest_type(), chest_type);
            assert_eq!(chest.chest_type(), chest_type);
        }
        assert!(matches!(chest(ChestType::Chest).kind(), ChestKind::Regular));
    }

    #[test]
    fn test_storage_amount() {
        let storage = chest(ChestType::StorageUnit);
        let state = storage.as_storage().expect("storage unit");
        assert_eq!(state.amount(), 0);

        state.set_amount(1_000_000);
        assert_eq!(state.amount(), 1_000_000);
    }

    #[test]
    fn test_record_keeps_type_tag() {
        let record = ChestRecord::of(&chest(ChestType::StorageUnit));
        assert_eq!(record.chest_type, "STORAGE_UNIT");
        assert_eq!(record.template, "test");
        assert_eq!(record.location.pos.y(), 2);
    }

    #[test]
    fn test_linked_state() {
        let linked = chest(ChestType::LinkedChest);
        let state = linked.as_linked().expect("linked chest");
        assert_eq!(state.linked_to(), None);

        let target = ChestLocation::new(ResourceLocation::vanilla_static("overworld"), 0, 0, 0);
        state.link_into(Some(target.clone()));
        assert_eq!(state.linked_to(), Some(target));
    }
}
