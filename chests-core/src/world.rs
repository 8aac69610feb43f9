//! The world as seen by the registry: which chunks are active and what block sits where.

use chests_utils::{ChestLocation, ChunkKey, ChunkPos, ResourceLocation};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

/// Read access to live world state.
///
/// Only consulted to check that an indexed chest still has its block. The
/// registry never asks for a chunk to be loaded.
pub trait WorldOracle: Send + Sync {
    /// Returns true if the chunk is loaded and its blocks can be read cheaply.
    fn is_chunk_active(&self, world: &ResourceLocation, chunk: ChunkPos) -> bool;

    /// The block at `location`, or `None` if it can't be read.
    fn block_type_at(&self, location: &ChestLocation) -> Option<ResourceLocation>;
}

/// In-memory world.
///
/// Blocks and loaded chunks are whatever was set through it. Useful for:
/// - Tests and benchmarks
/// - Embedding the registry without a running world
pub struct RamOnlyWorld {
    active_chunks: RwLock<FxHashSet<ChunkKey>>,
    blocks: RwLock<FxHashMap<ChestLocation, ResourceLocation>>,
}

impl RamOnlyWorld {
    /// Creates a world with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_chunks: RwLock::new(FxHashSet::default()),
            blocks: RwLock::new(FxHashMap::default()),
        }
    }

    /// Marks the chunk containing `location` as loaded.
    pub fn activate(&self, location: &ChestLocation) {
        self.active_chunks.write().insert(location.chunk_key());
    }

    /// Marks the chunk containing `location` as unloaded.
    pub fn deactivate(&self, location: &ChestLocation) {
        self.active_chunks.write().remove(&location.chunk_key());
    }

    /// Sets the block at `location`. `None` clears it to air.
    pub fn set_block(&self, location: &ChestLocation, block: Option<ResourceLocation>) {
        let mut blocks = self.blocks.write();
        match block {
            Some(block) => {
                blocks.insert(location.clone(), block);
            }
            None => {
                blocks.remove(location);
            }
        }
    }
}

impl Default for RamOnlyWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldOracle for RamOnlyWorld {
    fn is_chunk_active(&self, world: &ResourceLocation, chunk: ChunkPos) -> bool {
        self.active_chunks
            .read()
            .contains(&ChunkKey::new(world.clone(), chunk))
    }

    fn block_type_at(&self, location: &ChestLocation) -> Option<ResourceLocation> {
        self.blocks.read().get(location).cloned()
    }
}
