//! Error types shared by the aggregators, the data source and the CLI layer.

use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of a failed remote call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteFailure {
    RateLimited,
    NotFound,
    Unauthorized,
    Other,
}

impl RemoteFailure {
    /// Classifies a provider error by its message text.
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        if message.contains("rate limit") {
            Self::RateLimited
        } else if message.contains("not found") {
            Self::NotFound
        } else if message.contains("bad credentials") || message.contains("requires authentication")
        {
            Self::Unauthorized
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limit exceeded"),
            Self::NotFound => write!(f, "not found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Other => write!(f, "request failed"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no GitHub token found; set GITHUB_TOKEN or GITHUB_API_TOKEN")]
    MissingCredential,

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("{operation} failed ({kind}): {source}")]
    RemoteFetch {
        operation: &'static str,
        kind: RemoteFailure,
        #[source]
        source: BoxError,
    },

    #[error("commit {sha} has no parent to diff against")]
    MalformedCommit { sha: String },
}

impl ReportError {
    /// Wraps any data source failure, classifying it from its message.
    pub fn remote<E>(operation: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        let source = source.into();
        let kind = RemoteFailure::classify(&source.to_string());
        Self::RemoteFetch {
            operation,
            kind,
            source,
        }
    }

    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
