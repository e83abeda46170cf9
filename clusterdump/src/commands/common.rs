use clusterdump_clap_blocks::connection::ConnectionConfig;
use clusterdump_store::MongoStore;
use tracing::info;

/// Connect and ping the cluster. Nothing is written anywhere before this succeeds.
pub(crate) async fn connect(config: &ConnectionConfig) -> clusterdump_store::Result<MongoStore> {
    let store = MongoStore::connect(config.uri()).await?;
    info!("connected to cluster");
    Ok(store)
}
