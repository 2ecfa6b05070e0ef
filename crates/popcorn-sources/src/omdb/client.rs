use async_trait::async_trait;
use popcorn_config::OmdbConfig;
use popcorn_models::{MovieDetail, MovieSummary};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::LookupError;
use crate::omdb::api;
use crate::traits::MovieLookup;

/// Connection settings for OMDb, injected at construction
#[derive(Debug, Clone)]
pub struct OmdbSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OmdbSettings {
    pub fn from_config(config: &OmdbConfig, api_key: String) -> Self {
        Self {
            api_key,
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub fn create_omdb_client() -> Client {
    Client::builder()
        .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    settings: OmdbSettings,
}

impl OmdbClient {
    pub fn new(settings: OmdbSettings) -> Self {
        Self {
            client: Arc::new(create_omdb_client()),
            settings,
        }
    }
}

/// Race `request` against `cancel`, giving up as soon as the token fires
async fn until_cancelled<T, F>(cancel: &CancellationToken, request: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LookupError::Cancelled),
        result = request => result,
    }
}

#[async_trait]
impl MovieLookup for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search_by_title(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<MovieSummary>, LookupError> {
        debug!(query, "Searching OMDb");
        let result = until_cancelled(cancel, api::search(&self.client, &self.settings, query)).await;
        match &result {
            Ok(movies) => info!(query, count = movies.len(), "OMDb search complete"),
            Err(LookupError::Cancelled) => debug!(query, "OMDb search cancelled"),
            Err(e) => debug!(query, error = %e, "OMDb search failed"),
        }
        result
    }

    async fn fetch_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, LookupError> {
        debug!(id, "Fetching OMDb title");
        let result = until_cancelled(cancel, api::get_by_id(&self.client, &self.settings, id)).await;
        if let Err(e) = &result {
            debug!(id, error = %e, "OMDb title fetch did not complete");
        }
        result
    }
}
