use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the stored OMDb API key
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

const OMDB_API_KEY: &str = "omdb_api_key";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Secrets kept apart from `config.toml`, as flat `key = "value"` pairs
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    /// Read the file if it exists; a missing file leaves the store empty
    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;

        let temp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&temp_path, content)?;
        restrict_to_owner(&temp_path)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn get_omdb_api_key(&self) -> Option<&String> {
        self.credentials.get(OMDB_API_KEY).filter(|key| !key.is_empty())
    }

    pub fn set_omdb_api_key(&mut self, key: String) {
        self.credentials.insert(OMDB_API_KEY.to_string(), key);
    }

    pub fn remove_omdb_api_key(&mut self) -> Option<String> {
        self.credentials.remove(OMDB_API_KEY)
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}

/// Resolve the OMDb API key, preferring the environment over the credentials file
pub fn resolve_omdb_api_key(store: &CredentialStore) -> Option<String> {
    std::env::var(OMDB_API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .or_else(|| store.get_omdb_api_key().cloned())
}
