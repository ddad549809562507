// [apps/catalog-core/src/main.rs]
/*!
 * Thin smoke-test entry point: connects, prints the catalog's summary
 * statistics, exits. Not a product surface — the command front-end links
 * the library directly instead of shelling out to this binary.
 */

use anyhow::Result;
use prospector_catalog_core::CatalogCore;

#[tokio::main]
async fn main() -> Result<()> {
    prospector_telemetry::init_tracing("catalog-core");

    let core = CatalogCore::connect_from_env().await?;
    let stats = core.statistics().await?;
    println!("{stats:#?}");
    Ok(())
}
