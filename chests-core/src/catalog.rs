//! The template catalog: chest templates by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::chest::ChestData;
use crate::item::ItemStack;

type Templates = BTreeMap<String, Arc<ChestData>>;

/// Chest templates keyed by lower-cased name.
///
/// The whole table is swapped on reload, so a reader sees either the old or
/// the new catalog and never a mix of both. Iteration is in name order, which
/// makes [`ChestCatalog::find_by_item`] deterministic when two templates share
/// an item.
pub struct ChestCatalog {
    templates: ArcSwap<Templates>,
}

impl ChestCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: ArcSwap::from_pointee(Templates::new()),
        }
    }

    /// Replaces every template at once.
    ///
    /// Each template takes the name it is keyed by. Chests already placed keep
    /// their old template until told to re-resolve it.
    pub fn replace_all(&self, templates: impl IntoIterator<Item = (String, ChestData)>) {
        let mut table = Templates::new();
        for (name, mut data) in templates {
            data.name = name;
            let key = data.name.to_lowercase();
            if table.insert(key, Arc::new(data)).is_some() {
                log::warn!("Chest template names are case-insensitive, a later duplicate won");
            }
        }

        warn_shared_items(&table);
        log::debug!("Loaded {} chest templates", table.len());
        self.templates.store(Arc::new(table));
    }

    /// Gets a template by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ChestData>> {
        self.templates.load().get(&name.to_lowercase()).cloned()
    }

    /// Gets the template placed from `item`.
    ///
    /// If several templates use a similar item, the one with the lowest name wins.
    #[must_use]
    pub fn find_by_item(&self, item: &ItemStack) -> Option<Arc<ChestData>> {
        self.templates
            .load()
            .values()
            .find(|data| data.item.is_similar(item))
            .cloned()
    }

    /// Every template, in name order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<ChestData>> {
        self.templates.load().values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.load().is_empty()
    }
}

impl Default for ChestCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn warn_shared_items(table: &Templates) {
    let templates: Vec<&Arc<ChestData>> = table.values().collect();
    for (i, first) in templates.iter().enumerate() {
        for second in &templates[i + 1..] {
            if first.item.is_similar(&second.item) {
                log::warn!(
                    "Chest templates {} and {} use the same item, {} will be picked when placing it",
                    first.name,
                    second.name,
                    first.name
                );
            }
        }
    }
}
