//! Item stacks as far as chest templates care about them.

use chests_utils::ResourceLocation;
use serde::{Deserialize, Serialize};

const fn one() -> u32 {
    1
}

/// An item and its display metadata.
///
/// Templates are recognised by the item a chest is placed from, so only the
/// parts that identify an item are modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item id, e.g. `minecraft:chest`.
    pub item: ResourceLocation,
    /// Stack size. Ignored by [`ItemStack::is_similar`].
    #[serde(default = "one")]
    pub count: u32,
    /// Custom display name, if any.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Lore lines.
    #[serde(default)]
    pub lore: Vec<String>,
}

impl ItemStack {
    /// Creates a plain stack of one item without metadata.
    #[must_use]
    pub fn of(item: ResourceLocation) -> Self {
        Self {
            item,
            count: 1,
            display_name: None,
            lore: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Returns a copy with a different stack size.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Returns true if both stacks describe the same item, whatever their sizes.
    #[must_use]
    pub fn is_similar(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.display_name == other.display_name && self.lore == other.lore
    }
}
