use std::{env, path::PathBuf, sync::Arc};

use chests::ChestsPlugin;
use chests_core::{block_entity::DetachedTileEntities, world::RamOnlyWorld};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chests::logger::init();

    let config_path = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("chests_config.json5"), PathBuf::from);

    let plugin = ChestsPlugin::init(
        &config_path,
        Arc::new(RamOnlyWorld::new()),
        Arc::new(DetachedTileEntities),
    )
    .await?;

    log::info!(
        "Chests ready: {} templates, {} chests",
        plugin.manager().catalog().len(),
        plugin.manager().registry().len()
    );

    tokio::signal::ctrl_c().await?;
    log::info!("Stopping");
    plugin.teardown().await?;
    Ok(())
}
