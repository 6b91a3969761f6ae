use std::path::{Path, PathBuf};

use tracing::{debug, info};

use statuslite_core::config::{CONFIG_ENV, ConfigError, StatusConfig};
use statuslite_core::store::{FileKv, ServiceStore, StoreError};

/// Resolved configuration plus where things live on disk
pub struct Context {
    pub config: StatusConfig,
    /// File the config came from, if any
    pub config_path: Option<PathBuf>,
    pub data_dir: PathBuf,
}

impl Context {
    /// Explicit path wins; otherwise search from the working directory.
    ///
    /// No config file at all is fine and means bundled defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (config_path, config) = match explicit {
            Some(path) => (Some(path.to_path_buf()), StatusConfig::load(path)?),
            None => {
                let cwd = std::env::current_dir()?;
                let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
                match StatusConfig::discover(&cwd, env_path.as_deref()) {
                    Ok((path, config)) => (Some(path), config),
                    Err(ConfigError::NotFound { .. }) => (None, StatusConfig::default()),
                    Err(e) => return Err(e),
                }
            }
        };

        let data_dir = resolve_data_dir(&config, config_path.as_deref());
        Ok(Self {
            config,
            config_path,
            data_dir,
        })
    }

    /// Open the file-backed store, seeding it on first run
    pub fn open_store(&self) -> Result<ServiceStore, StoreError> {
        let kv = FileKv::new(&self.data_dir);
        debug!(path = %kv.path_for(&self.config.storage_key).display(), "opening store");

        let store = ServiceStore::load(
            Box::new(kv),
            self.config.storage_key.clone(),
            self.config.seed_records(),
        )?
        .with_policy(self.config.metrics_policy);

        info!(
            services = store.len(),
            key = store.key(),
            policy = ?store.policy(),
            "store ready"
        );
        Ok(store)
    }
}

/// `data_dir` from the config (relative to the config file), else the platform data dir
fn resolve_data_dir(config: &StatusConfig, config_path: Option<&Path>) -> PathBuf {
    match &config.data_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => config_path
            .and_then(Path::parent)
            .map(|base| base.join(dir))
            .unwrap_or_else(|| dir.clone()),
        None => dirs::data_dir()
            .map(|d| d.join("statuslite"))
            .unwrap_or_else(|| PathBuf::from(".statuslite")),
    }
}
