//! Fixtures shared by the unit tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use chests_utils::{ChestLocation, ResourceLocation};

use crate::block_entity::TileEntityBridge;
use crate::chest::{Chest, ChestData, ChestType};
use crate::item::ItemStack;
use crate::registry::ChestRegistry;
use crate::world::RamOnlyWorld;

pub(crate) const CHEST_BLOCK: ResourceLocation = ResourceLocation::vanilla_static("chest");

pub(crate) fn overworld() -> ResourceLocation {
    ResourceLocation::vanilla_static("overworld")
}

pub(crate) fn loc(x: i32, y: i32, z: i32) -> ChestLocation {
    ChestLocation::new(overworld(), x, y, z)
}

pub(crate) fn template_data(name: &str, chest_type: ChestType) -> ChestData {
    ChestData::new(
        name,
        chest_type,
        ItemStack::of(CHEST_BLOCK).named(name),
    )
}

pub(crate) fn template(name: &str, chest_type: ChestType) -> Arc<ChestData> {
    Arc::new(template_data(name, chest_type))
}

/// Counts how many chests were bound.
#[derive(Default)]
pub(crate) struct CountingBridge {
    bound: AtomicUsize,
}

impl CountingBridge {
    pub(crate) fn bound(&self) -> usize {
        self.bound.load(Ordering::SeqCst)
    }
}

impl TileEntityBridge for CountingBridge {
    fn bind_storage(&self, _chest: &Arc<Chest>) {
        self.bound.fetch_add(1, Ordering::SeqCst);
    }
}

/// A registry over an in-memory world with nothing loaded.
pub(crate) struct TestWorld {
    pub(crate) oracle: Arc<RamOnlyWorld>,
    pub(crate) bridge: Arc<CountingBridge>,
    pub(crate) registry: ChestRegistry,
}

impl TestWorld {
    pub(crate) fn new() -> Self {
        let oracle = Arc::new(RamOnlyWorld::new());
        let bridge = Arc::new(CountingBridge::default());
        let registry = ChestRegistry::new(oracle.clone(), bridge.clone(), CHEST_BLOCK);
        Self {
            oracle,
            bridge,
            registry,
        }
    }

    pub(crate) fn place_chest_block(&self, location: &ChestLocation) {
        self.oracle.set_block(location, Some(CHEST_BLOCK));
    }
}
