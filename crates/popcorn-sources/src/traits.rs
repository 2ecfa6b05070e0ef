use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};
use tokio_util::sync::CancellationToken;

use crate::error::LookupError;

/// A remote movie database
///
/// Implementations make a single request per call with no retry and no
/// caching. When `cancel` fires they stop waiting and return
/// [`LookupError::Cancelled`], which callers treat as a no-op.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    fn source_name(&self) -> &str;

    /// Search titles matching free text
    async fn search_by_title(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<MovieSummary>, LookupError>;

    /// Fetch the full record for an exact external id
    async fn fetch_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, LookupError>;
}
