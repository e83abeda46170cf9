use super::common::connect;
use clusterdump_archive::JsonFormat;
use clusterdump_clap_blocks::{archive::ArchiveConfig, connection::ConnectionConfig};
use clusterdump_engine::Backup;
use clusterdump_time::SystemProvider;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Store(#[from] clusterdump_store::Error),

    #[error(transparent)]
    Engine(#[from] clusterdump_engine::Error),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    connection: ConnectionConfig,

    #[clap(flatten)]
    archive: ArchiveConfig,

    /// Extended JSON flavour of the collection files: `canonical` keeps every numeric type
    /// exactly, `relaxed` is easier to read but restores small int64 values as int32
    #[clap(
        long = "json-format",
        env = "CLUSTERDUMP_JSON_FORMAT",
        default_value_t = JsonFormat::default(),
        action
    )]
    json_format: JsonFormat,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let store = connect(&config.connection).await?;

    let summary = Backup::new(
        config.archive.root(),
        config.connection.uri(),
        Arc::new(SystemProvider::new()),
    )
    .with_format(config.json_format)
    .run(&store)
    .await?;

    println!(
        "Backed up {} documents from {} collections in {} databases to {}",
        summary.documents,
        summary.collections,
        summary.databases,
        summary.instance.display()
    );
    Ok(())
}
