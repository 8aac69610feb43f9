//! Chest templates: the named configuration a placed chest is built from.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ChestError;
use crate::item::ItemStack;

/// Largest auto-suction range a template may configure.
pub const MAX_SUCTION_RANGE: u32 = 256;

const fn default_size() -> u8 {
    3
}

const fn default_suction_range() -> u32 {
    1
}

fn default_title() -> String {
    "Chest".to_string()
}

/// The kind of chest a template places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChestType {
    /// A plain chest.
    #[default]
    Chest,
    /// A chest sharing its contents with the other chests it is linked to.
    LinkedChest,
    /// A chest storing a large amount of a single item.
    StorageUnit,
}

impl ChestType {
    /// The persisted tag of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ChestType::Chest => "CHEST",
            ChestType::LinkedChest => "LINKED_CHEST",
            ChestType::StorageUnit => "STORAGE_UNIT",
        }
    }
}

impl fmt::Display for ChestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChestType {
    type Err = ChestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CHEST" => Ok(ChestType::Chest),
            "LINKED_CHEST" => Ok(ChestType::LinkedChest),
            "STORAGE_UNIT" => Ok(ChestType::StorageUnit),
            _ => Err(ChestError::UnknownVariant(s.to_string())),
        }
    }
}

/// How far a chest reaches when pulling in items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuctionScope {
    /// Items in the chest's own chunk column, at most `range` blocks above or below.
    Chunk {
        /// Vertical reach in blocks.
        range: u32,
    },
    /// Items within a sphere of `range` blocks.
    Radius {
        /// Radius in blocks.
        range: u32,
    },
}

/// A named chest template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestData {
    /// Catalog name. Filled in from the template table key.
    #[serde(skip)]
    pub name: String,
    /// The chest variant placed from this template.
    #[serde(default)]
    pub chest_type: ChestType,
    /// The item players place this chest from.
    pub item: ItemStack,
    /// Inventory title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Rows of nine slots per page.
    #[serde(default = "default_size")]
    pub size: u8,
    /// Pulls in items within [`ChestData::auto_suction_range`] blocks.
    #[serde(default)]
    pub auto_suction: bool,
    /// Restricts suction to the chest's own chunk column.
    #[serde(default)]
    pub auto_suction_chunk: bool,
    #[serde(default = "default_suction_range")]
    pub auto_suction_range: u32,
    /// Capacity of a storage unit. `None` means unbounded.
    #[serde(default)]
    pub max_amount: Option<u64>,
}

impl ChestData {
    /// Creates a template with default settings for the given item.
    #[must_use]
    pub fn new(name: impl Into<String>, chest_type: ChestType, item: ItemStack) -> Self {
        Self {
            name: name.into(),
            chest_type,
            item,
            title: default_title(),
            size: default_size(),
            auto_suction: false,
            auto_suction_chunk: false,
            auto_suction_range: default_suction_range(),
            max_amount: None,
        }
    }

    /// Enables radius suction.
    #[must_use]
    pub fn with_auto_suction(mut self, range: u32) -> Self {
        self.auto_suction = true;
        self.auto_suction_range = range;
        self
    }

    /// Enables chunk-column suction.
    #[must_use]
    pub fn with_chunk_suction(mut self, range: u32) -> Self {
        self.auto_suction_chunk = true;
        self.auto_suction_range = range;
        self
    }

    /// The suction behaviour of this template, if it has any.
    ///
    /// Chunk scoping wins over plain suction, so a chunk-scoped template
    /// suctions even with `auto_suction` unset.
    #[must_use]
    pub fn suction_scope(&self) -> Option<SuctionScope> {
        let range = self.auto_suction_range;
        if self.auto_suction_chunk {
            Some(SuctionScope::Chunk { range })
        } else if self.auto_suction {
            Some(SuctionScope::Radius { range })
        } else {
            None
        }
    }

    /// Checks the configured values are in range.
    pub fn validate(&self) -> Result<(), ChestError> {
        let fail = |reason| {
            Err(ChestError::InvalidTemplate {
                name: self.name.clone(),
                reason,
            })
        };

        if self.name.trim().is_empty() {
            return fail("name must not be empty");
        }
        if !(1..=6).contains(&self.size) {
            return fail("size must be in range 1..=6");
        }
        if self.auto_suction_range > MAX_SUCTION_RANGE {
            return fail("auto_suction_range must not exceed 256");
        }
        if self.max_amount.is_some() && self.chest_type != ChestType::StorageUnit {
            return fail("max_amount only applies to storage units");
        }
        Ok(())
    }
}
