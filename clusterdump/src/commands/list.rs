use clusterdump_clap_blocks::archive::ArchiveConfig;
use clusterdump_engine::listing::list_instances;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Engine(#[from] clusterdump_engine::Error),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    archive: ArchiveConfig,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let root = config.archive.root();
    let listings = list_instances(&root).await?;

    if listings.is_empty() {
        println!("No backups found in {}", root.display());
        return Ok(());
    }

    for (i, listing) in listings.iter().enumerate() {
        println!(
            "{}: {} ({} databases, {} collections)",
            i + 1,
            listing.name,
            listing.databases,
            listing.collections
        );
    }
    Ok(())
}
