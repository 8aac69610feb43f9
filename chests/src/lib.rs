//! # Chests
//!
//! Wires the chest core to the outside: configuration, the creation journal
//! and the plugin lifecycle.
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    missing_docs,
    clippy::unwrap_used
)]
#![allow(
    clippy::single_call_fn,
    clippy::multiple_inherent_impl,
    clippy::shadow_unrelated,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::needless_pass_by_value,
    clippy::cargo_common_metadata
)]

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use chests_core::{
    Chest, ChestError, ChestRegistry, ChestsManager, block_entity::TileEntityBridge,
    world::WorldOracle,
};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::config::ChestsConfig;
use crate::journal::ChestJournal;

/// The config file.
pub mod config;
/// The creation journal.
pub mod journal;
/// Logger setup for the binary.
pub mod logger;

/// Errors raised while starting, reloading or stopping the plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Reading or writing the config or journal failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid JSON5 or doesn't match the expected shape.
    #[error("config error: {0}")]
    Config(#[from] serde_json5::Error),
    /// A journal entry could not be encoded.
    #[error("journal error: {0}")]
    Journal(#[from] serde_json::Error),
    /// A chest template was rejected.
    #[error(transparent)]
    Chest(#[from] ChestError),
    /// The journal writer task panicked.
    #[error("journal task failed: {0}")]
    Task(#[from] JoinError),
}

/// The running chests plugin.
pub struct ChestsPlugin {
    manager: Arc<ChestsManager>,
    journal: Arc<ChestJournal>,
    journal_task: JoinHandle<Result<(), PluginError>>,
    cancel_token: CancellationToken,
    config_path: PathBuf,
}

impl ChestsPlugin {
    /// Loads the config at `config_path` and starts the plugin.
    pub async fn init(
        config_path: &Path,
        world: Arc<dyn WorldOracle>,
        tile_entities: Arc<dyn TileEntityBridge>,
    ) -> Result<Self, PluginError> {
        let config = ChestsConfig::load_or_create(config_path)?;
        Self::init_with_config(config, config_path.to_path_buf(), world, tile_entities).await
    }

    /// Starts the plugin from an already loaded config.
    ///
    /// Chests standing in the journal are restored before this returns, and
    /// the journal is compacted down to them.
    pub async fn init_with_config(
        config: ChestsConfig,
        config_path: PathBuf,
        world: Arc<dyn WorldOracle>,
        tile_entities: Arc<dyn TileEntityBridge>,
    ) -> Result<Self, PluginError> {
        let records = journal::replay(&config.journal_path).await?;
        journal::compact(&config.journal_path, &records).await?;

        let cancel_token = CancellationToken::new();
        let (journal, journal_task) =
            ChestJournal::spawn(config.journal_path.clone(), cancel_token.child_token());
        let journal = Arc::new(journal);

        let registry = ChestRegistry::new(world, tile_entities, config.container_block);
        let manager = Arc::new(ChestsManager::new(registry, journal.clone()));
        manager.load_chests_data(config.templates);
        manager.restore(records);

        Ok(Self {
            manager,
            journal,
            journal_task,
            cancel_token,
            config_path,
        })
    }

    /// The chest manager, for handing to whatever needs chests.
    #[must_use]
    pub fn manager(&self) -> &Arc<ChestsManager> {
        &self.manager
    }

    /// Removes `chest` and journals the removal.
    pub fn remove_chest(&self, chest: &Chest) -> Option<Arc<Chest>> {
        let removed = self.manager.remove_chest(chest)?;
        self.journal.record_removal(removed.location());
        Some(removed)
    }

    /// Re-reads the templates from the config file.
    ///
    /// Only templates are reloaded; the container block and journal path stay
    /// as they were at startup.
    pub fn reload(&self) -> Result<usize, PluginError> {
        let config = ChestsConfig::load_or_create(&self.config_path)?;
        Ok(self.manager.load_chests_data(config.templates))
    }

    /// Stops the journal writer, waits for it to flush and drops every chest.
    pub async fn teardown(self) -> Result<(), PluginError> {
        self.cancel_token.cancel();
        let written = self.journal_task.await?;
        self.manager.registry().clear();
        log::info!("Chests stopped");
        written
    }
}
