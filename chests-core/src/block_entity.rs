//! Binding registry chests to the block entities holding their contents.

use std::sync::Arc;

use crate::chest::Chest;

/// Links a chest to the per-block storage behind it.
///
/// Called once right after a chest enters the registry, both for new
/// placements and for chests restored at startup.
pub trait TileEntityBridge: Send + Sync {
    fn bind_storage(&self, chest: &Arc<Chest>);
}

/// A bridge for hosts without block entities.
pub struct DetachedTileEntities;

impl TileEntityBridge for DetachedTileEntities {
    fn bind_storage(&self, _chest: &Arc<Chest>) {}
}
