use thiserror::Error;

/// Shown for transport, status and decoding failures
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong while fetching movies";
/// Shown when the provider answers but has nothing for the query or id
pub const NO_DATA_MESSAGE: &str = "There is no data for this film";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no results for '{query}'")]
    EmptyResult { query: String },

    #[error("no movie with id '{id}': {message}")]
    NotFound { id: String, message: String },

    /// The caller gave up on the request; not a failure
    #[error("request cancelled")]
    Cancelled,
}

impl LookupError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LookupError::Cancelled)
    }

    /// Message suitable for showing in place of the result list
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::EmptyResult { .. } | LookupError::NotFound { .. } => NO_DATA_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let empty = LookupError::EmptyResult { query: "zzz".to_string() };
        assert_eq!(empty.user_message(), NO_DATA_MESSAGE);
        assert_eq!(LookupError::Status { status: 503 }.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(LookupError::Cancelled.is_cancelled());
        assert!(!empty.is_cancelled());
    }
}
