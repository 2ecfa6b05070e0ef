pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, OmdbConfig, SearchConfig, DEFAULT_OMDB_BASE_URL};
pub use credentials::{resolve_omdb_api_key, CredentialStore, OMDB_API_KEY_ENV};
pub use paths::{container_base_path, PathManager};
