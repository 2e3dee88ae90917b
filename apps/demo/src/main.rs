//! Console demonstrations of the shared-instance cache.

mod geocode;
mod inventory;

use tracing_subscriber::EnvFilter;

fn main() -> flycache::CacheResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,flycache=debug")),
        )
        .init();

    tracing::info!("Starting shared-instance cache demo");

    inventory::run()?;
    geocode::run()?;

    Ok(())
}
