//! The persistence hook fired for newly placed chests.

use std::sync::Arc;

use crate::chest::Chest;

/// Records newly placed chests.
///
/// `record_creation` must not block: implementations hand the chest off and
/// return. Removals are never reported here; callers persist them explicitly.
pub trait ChestPersistence: Send + Sync {
    fn record_creation(&self, chest: &Arc<Chest>);
}

/// Persistence that forgets everything, for tests and throwaway worlds.
pub struct NoPersistence;

impl ChestPersistence for NoPersistence {
    fn record_creation(&self, _chest: &Arc<Chest>) {}
}
