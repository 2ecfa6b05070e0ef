use color_eyre::Result;
use popcorn_config::{resolve_omdb_api_key, Config, CredentialStore, PathManager};
use popcorn_core::{JsonFileStorage, WatchedStore};
use popcorn_sources::{MovieLookup, OmdbClient, OmdbSettings};
use std::sync::Arc;

/// Everything a command needs: resolved paths, validated config and credentials
pub struct AppContext {
    pub path_manager: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let path_manager = PathManager::default();

        let config_file = path_manager.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        let credentials_file = path_manager.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials.load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        tracing::debug!(config = %config_file.display(), "Loaded configuration");

        Ok(Self {
            path_manager,
            config,
            credentials,
        })
    }

    /// OMDb client built from the stored key, or `OMDB_API_KEY` when set
    pub fn lookup(&self) -> Result<Arc<dyn MovieLookup>> {
        let api_key = resolve_omdb_api_key(&self.credentials).ok_or_else(|| {
            color_eyre::eyre::eyre!("No OMDb API key configured. Run 'popcorn config omdb' or set OMDB_API_KEY")
        })?;

        let settings = OmdbSettings::from_config(&self.config.omdb, api_key);
        let client = OmdbClient::new(settings);
        tracing::debug!(source = client.source_name(), base_url = %self.config.omdb.base_url, "Lookup client ready");
        Ok(Arc::new(client))
    }

    pub fn watched_store(&self) -> WatchedStore {
        WatchedStore::load(JsonFileStorage::new(self.path_manager.watched_file()))
    }
}
