//! The `ChestsManager` ties the template catalog, the registry and persistence together.

use std::sync::Arc;

use chests_utils::{ChestLocation, ChunkKey};
use uuid::Uuid;

use crate::catalog::ChestCatalog;
use crate::chest::{Chest, ChestData, ChestRecord, ChestType};
use crate::error::ChestError;
use crate::item::ItemStack;
use crate::persistence::ChestPersistence;
use crate::registry::ChestRegistry;

/// Outcome of a bulk restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    pub failed: usize,
}

/// Entry point for everything chest related.
///
/// Built once at startup and shared by `Arc` with whatever needs chests.
pub struct ChestsManager {
    catalog: ChestCatalog,
    registry: ChestRegistry,
    persistence: Arc<dyn ChestPersistence>,
}

impl ChestsManager {
    /// Creates a manager with an empty catalog around `registry`.
    #[must_use]
    pub fn new(registry: ChestRegistry, persistence: Arc<dyn ChestPersistence>) -> Self {
        Self {
            catalog: ChestCatalog::new(),
            registry,
            persistence,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &ChestCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn registry(&self) -> &ChestRegistry {
        &self.registry
    }

    /// Places a new chest and records it.
    pub fn add_chest(&self, owner: Uuid, location: ChestLocation, data: Arc<ChestData>) -> Arc<Chest> {
        let chest = self.load_chest(owner, location, data);
        self.persistence.record_creation(&chest);
        chest
    }

    /// Registers a chest without recording it.
    pub fn load_chest(&self, owner: Uuid, location: ChestLocation, data: Arc<ChestData>) -> Arc<Chest> {
        let chest_type = data.chest_type;
        self.registry.insert(location, chest_type, data, owner)
    }

    /// Removes `chest` from the registry. Persisting the removal is up to the caller.
    pub fn remove_chest(&self, chest: &Chest) -> Option<Arc<Chest>> {
        self.registry.remove(chest.location())
    }

    #[must_use]
    pub fn get_chest(&self, location: &ChestLocation) -> Option<Arc<Chest>> {
        self.registry.get_chest(location)
    }

    #[must_use]
    pub fn get_linked_chest(&self, location: &ChestLocation) -> Option<Arc<Chest>> {
        self.registry.get_linked_chest(location)
    }

    #[must_use]
    pub fn get_storage_chest(&self, location: &ChestLocation) -> Option<Arc<Chest>> {
        self.registry.get_storage_chest(location)
    }

    #[must_use]
    pub fn chests(&self) -> Vec<Arc<Chest>> {
        self.registry.chests()
    }

    #[must_use]
    pub fn chests_in_chunk(&self, chunk: &ChunkKey) -> Vec<Arc<Chest>> {
        self.registry.chests_in_chunk(chunk)
    }

    #[must_use]
    pub fn nearby_chests(&self, location: &ChestLocation) -> Vec<Arc<Chest>> {
        self.registry.nearby_chests(location)
    }

    #[must_use]
    pub fn all_linked_chests(&self, chest: &Chest) -> Vec<Arc<Chest>> {
        self.registry.all_linked_chests(chest)
    }

    #[must_use]
    pub fn chest_data(&self, name: &str) -> Option<Arc<ChestData>> {
        self.catalog.get(name)
    }

    #[must_use]
    pub fn chest_data_for(&self, item: &ItemStack) -> Option<Arc<ChestData>> {
        self.catalog.find_by_item(item)
    }

    #[must_use]
    pub fn all_chest_data(&self) -> Vec<Arc<ChestData>> {
        self.catalog.all()
    }

    /// Swaps in a new set of templates and re-resolves the template of every placed chest.
    ///
    /// Returns how many chests picked up a template from the new set.
    pub fn load_chests_data(&self, templates: impl IntoIterator<Item = (String, ChestData)>) -> usize {
        self.catalog.replace_all(templates);

        let chests = self.registry.chests();
        let updated = chests
            .iter()
            .filter(|chest| chest.update_data(&self.catalog))
            .count();
        log::info!(
            "Loaded {} chest templates, {updated}/{} placed chests updated",
            self.catalog.len(),
            chests.len()
        );
        updated
    }

    /// Registers chests read back from storage. Nothing is recorded.
    ///
    /// A record naming an unknown type or template is skipped and logged.
    pub fn restore(&self, records: impl IntoIterator<Item = ChestRecord>) -> RestoreSummary {
        let mut failed = 0;
        let resolved: Vec<_> = records
            .into_iter()
            .filter_map(|record| match self.resolve(&record) {
                Ok(resolved) => Some(resolved),
                Err(err) => {
                    log::warn!("Skipping chest at {}: {err}", record.location);
                    failed += 1;
                    None
                }
            })
            .collect();

        let restored = self.registry.load_all(resolved);
        log::info!("Restored {restored} chests ({failed} failed)");
        RestoreSummary { restored, failed }
    }

    fn resolve(
        &self,
        record: &ChestRecord,
    ) -> Result<(ChestLocation, ChestType, Arc<ChestData>, Uuid), ChestError> {
        let chest_type: ChestType = record.chest_type.parse()?;
        let data = self
            .catalog
            .get(&record.template)
            .ok_or_else(|| ChestError::UnknownTemplate(record.template.clone()))?;
        Ok((record.location.clone(), chest_type, data, record.owner))
    }
}
