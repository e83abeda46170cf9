use super::common::connect;
use clusterdump_clap_blocks::{archive::ArchiveConfig, connection::ConnectionConfig};
use clusterdump_engine::{
    ConflictMode, PresetSelector, Restore, SelectError, Selector, TerminalSelector,
    choose_instance,
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Store(#[from] clusterdump_store::Error),

    #[error(transparent)]
    Engine(#[from] clusterdump_engine::Error),

    #[error(transparent)]
    Select(#[from] SelectError),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    connection: ConnectionConfig,

    #[clap(flatten)]
    archive: ArchiveConfig,

    /// Name of the backup folder to restore. Prompts with the available folders when omitted.
    #[clap(long = "instance", action)]
    instance: Option<String>,

    /// What to do with collections that already exist: `append` inserts on top of them,
    /// `overwrite` drops them first. Prompts when omitted.
    #[clap(long = "mode", action)]
    mode: Option<ConflictMode>,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let mut selector =
        PresetSelector::new(config.instance, config.mode, TerminalSelector::stdio());

    // both choices are made before any connection is attempted
    let instance = choose_instance(&config.archive.root(), &mut selector).await?;
    let mode = selector.select_mode()?;

    let store = connect(&config.connection).await?;
    let summary = Restore::new(instance, mode).run(&store).await?;

    println!(
        "Restored {} documents into {} collections in {} databases",
        summary.documents, summary.collections, summary.databases
    );
    for namespace in &summary.empty_collections {
        println!("Skipped empty collection {namespace}");
    }
    Ok(())
}
