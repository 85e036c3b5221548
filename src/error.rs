use ::scraper::error::SelectorErrorKind;
use serde::Serialize;

/// All errors that can occur during MTASZ scraping and archive building.
#[derive(thiserror::Error, Debug)]
pub enum MtaszError {
    /// A required identifier (competition id, participant id, ...) was blank.
    #[error("{name} is required")]
    MissingIdentifier { name: &'static str },

    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Writing CSV content failed.
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    /// Packing the archive failed.
    #[error("failed to build archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<'a> From<SelectorErrorKind<'a>> for MtaszError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        MtaszError::Selector(err.to_string())
    }
}

/// Coarse classification used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    MissingIdentifier,
    FetchFailure,
    Internal,
}

/// JSON error payload returned instead of a record or archive.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl MtaszError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MtaszError::MissingIdentifier { .. } => ErrorKind::MissingIdentifier,
            MtaszError::Http { .. }
            | MtaszError::UnexpectedStatus { .. }
            | MtaszError::ResponseBody { .. } => ErrorKind::FetchFailure,
            _ => ErrorKind::Internal,
        }
    }

    /// Upstream status code, when the failure was a non-2xx response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            MtaszError::UnexpectedStatus { status, .. } => Some(status.as_u16()),
            MtaszError::Http { source, .. } | MtaszError::ResponseBody { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    /// HTTP status a route handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::MissingIdentifier => 400,
            ErrorKind::FetchFailure | ErrorKind::Internal => 500,
        }
    }

    /// Build the error payload; `context` names the failed operation,
    /// e.g. `"competition results"`.
    pub fn to_body(&self, context: &str) -> ErrorBody {
        match self {
            MtaszError::MissingIdentifier { .. } => ErrorBody {
                error: self.to_string(),
                message: format!("cannot fetch {context} without an identifier"),
            },
            _ => ErrorBody {
                error: format!("Failed to fetch {context}"),
                message: self.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, MtaszError>;
