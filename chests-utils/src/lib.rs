//! # Chests Utils
//!
//! Value types shared by the chest crates: positions, resource locations and
//! the world-qualified location and chunk keys the registry indexes by.
#![allow(missing_docs)]

pub mod math;
pub mod types;

pub use types::{BlockPos, ChestLocation, ChunkKey, ChunkPos, ResourceLocation};
