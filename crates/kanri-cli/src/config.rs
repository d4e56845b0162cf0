use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use kanri_core::id::UserId;
use kanri_core::types::User;
use kanri_engine::{ChangeEngine, EngineConfig, LocalFileStorage};
use kanri_notify::LogMailSender;
use kanri_store::KanriStore;

pub const CONFIG_FILE: &str = "kanri.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(flatten)]
    pub engine: EngineConfig,
}

fn default_database() -> PathBuf {
    PathBuf::from("kanri.redb")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            engine: EngineConfig::default(),
        }
    }
}

/// Find the project root by walking up from the current directory.
pub fn find_project_root() -> anyhow::Result<PathBuf> {
    let mut dir = std::env::current_dir()?;
    loop {
        if dir.join(CONFIG_FILE).is_file() {
            return Ok(dir);
        }
        if !dir.pop() {
            anyhow::bail!("not in a kanri project (no {CONFIG_FILE} found); run 'kanri init'");
        }
    }
}

pub fn read_config(root: &Path) -> anyhow::Result<CliConfig> {
    let content = std::fs::read_to_string(root.join(CONFIG_FILE))?;
    Ok(toml::from_str(&content)?)
}

pub fn write_config(root: &Path, config: &CliConfig) -> anyhow::Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(root.join(CONFIG_FILE), toml_str)?;
    Ok(())
}

pub fn open_store() -> anyhow::Result<(CliConfig, PathBuf, Arc<KanriStore>)> {
    let root = find_project_root()?;
    let config = read_config(&root)?;
    tracing::debug!("opening store at {}", root.join(&config.database).display());
    let store = Arc::new(KanriStore::open(&root.join(&config.database))?);
    Ok((config, root, store))
}

pub fn open_engine() -> anyhow::Result<(Arc<KanriStore>, ChangeEngine)> {
    let (config, root, store) = open_store()?;
    let files = Arc::new(LocalFileStorage::new(root.join(&config.engine.upload_dir)));
    let engine = ChangeEngine::new(
        store.clone(),
        Arc::new(LogMailSender),
        files,
        config.engine,
    );
    Ok((store, engine))
}

/// Resolve the acting user from the `--as` flag.
pub fn resolve_actor(store: &KanriStore, id: &str) -> anyhow::Result<User> {
    let id = UserId::from_hex(id)?;
    store
        .get_user(&id)?
        .ok_or_else(|| anyhow::anyhow!("no such user: {id}"))
}
