use clap::Args;

use kanri_store::KanriStore;

use crate::config::{write_config, CliConfig, CONFIG_FILE};

#[derive(Args)]
pub struct InitArgs {}

pub fn run(_args: InitArgs) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    if root.join(CONFIG_FILE).exists() {
        anyhow::bail!("already a kanri project: {CONFIG_FILE} exists");
    }

    let config = CliConfig::default();
    write_config(&root, &config)?;
    KanriStore::open(&root.join(&config.database))?;

    println!("Initialized kanri project in {}", root.display());
    println!("  Config:   {CONFIG_FILE}");
    println!("  Database: {}", config.database.display());
    Ok(())
}
