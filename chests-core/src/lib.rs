//! # Chests Core
//!
//! The in-memory core of the chests plugin: templates, the registry of placed
//! chests and the auto-suction search over it.
//!
//! Nothing here touches the disk or forces chunk loads. The world, the block
//! entities and persistence are reached through the traits in [`world`],
//! [`block_entity`] and [`persistence`].
#![allow(missing_docs)]

pub mod block_entity;
pub mod catalog;
pub mod chest;
pub mod error;
pub mod item;
pub mod manager;
pub mod persistence;
pub mod proximity;
pub mod registry;
pub mod world;

#[cfg(test)]
mod test_support;

pub use catalog::ChestCatalog;
pub use chest::{Chest, ChestData, ChestId, ChestKind, ChestRecord, ChestType};
pub use error::ChestError;
pub use item::ItemStack;
pub use manager::{ChestsManager, RestoreSummary};
pub use registry::ChestRegistry;
