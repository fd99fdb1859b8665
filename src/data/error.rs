use thiserror::Error;

/// Coarse classification of a [`LoadError`], used by the retry policy and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    Network,
    Staging,
    Query,
    EmptyResult,
    InvalidRequest,
    Exhausted,
}

/// Error type for archive acquisition, staging and querying.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("network failure fetching '{url}': {reason}")]
    Network { url: String, reason: String },
    #[error("staging failure for '{url}': {reason}")]
    Staging { url: String, reason: String },
    #[error("query failure for `{query}`: {reason}")]
    Query { query: String, reason: String },
    #[error("{what} returned no rows")]
    EmptyResult { what: String },
    #[error("invalid load request: {0}")]
    InvalidRequest(String),
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LoadError> },
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::Network { .. } => LoadErrorKind::Network,
            LoadError::Staging { .. } => LoadErrorKind::Staging,
            LoadError::Query { .. } => LoadErrorKind::Query,
            LoadError::EmptyResult { .. } => LoadErrorKind::EmptyResult,
            LoadError::InvalidRequest(_) => LoadErrorKind::InvalidRequest,
            LoadError::Exhausted { .. } => LoadErrorKind::Exhausted,
        }
    }

    /// Whether another attempt can reasonably succeed.
    ///
    /// Malformed queries and bad requests fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            LoadErrorKind::Network | LoadErrorKind::Staging | LoadErrorKind::EmptyResult
        )
    }

    /// The innermost cause, looking through `Exhausted`.
    pub fn root(&self) -> &LoadError {
        match self {
            LoadError::Exhausted { last, .. } => last.root(),
            other => other,
        }
    }

    /// Short message for the status line.
    pub fn user_message(&self) -> String {
        let headline = match self.root().kind() {
            LoadErrorKind::Network => "Could not download the dataset",
            LoadErrorKind::Staging => "Downloaded dataset could not be opened",
            LoadErrorKind::Query => "Query failed",
            LoadErrorKind::EmptyResult => "Dataset came back empty",
            LoadErrorKind::InvalidRequest | LoadErrorKind::Exhausted => "Loading failed",
        };
        format!("{headline}: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_drives_retry() {
        let net = LoadError::Network {
            url: "https://x".into(),
            reason: "timeout".into(),
        };
        let query = LoadError::Query {
            query: "SELEC".into(),
            reason: "syntax error".into(),
        };
        assert!(net.is_retryable());
        assert!(!query.is_retryable());
        assert!(!LoadError::InvalidRequest("x".into()).is_retryable());

        let exhausted = LoadError::Exhausted {
            attempts: 3,
            last: Box::new(net),
        };
        assert!(!exhausted.is_retryable());
        assert_eq!(exhausted.root().kind(), LoadErrorKind::Network);
        assert!(exhausted.user_message().starts_with("Could not download"));
        assert!(exhausted.to_string().contains("timeout"));
    }
}
