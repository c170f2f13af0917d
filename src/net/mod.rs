pub mod favicon;
pub mod fetch;
pub mod proxy;

#[cfg(test)]
pub(crate) mod mock;

use crate::dom::parser::ParseError;

/// Why a single retrieval did not produce a usable document.
///
/// Every variant is recoverable: the cascade advances to the next proxy
/// and the favicon probe reports "no icon".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    InvalidUrl { url: String, message: String },
    Client { message: String },
    Status { url: String, status: u16 },
    Transport { url: String, message: String },
    Parse { url: String, reason: ParseError },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidUrl { url, message } => {
                write!(f, "invalid URL {:?}: {}", url, message)
            }
            FetchError::Client { message } => write!(f, "client error: {}", message),
            FetchError::Status { url, status } => write!(f, "HTTP {} from {}", status, url),
            FetchError::Transport { url, message } => {
                write!(f, "request to {} failed: {}", url, message)
            }
            FetchError::Parse { url, reason } => write!(f, "unusable markup from {}: {}", url, reason),
        }
    }
}

impl std::error::Error for FetchError {}

/// Network capability used by the resolver.
///
/// `get` returns the body of a successful response and maps non-success
/// statuses to [`FetchError::Status`]. `probe` is an existence check that
/// transfers no body.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<String, FetchError>;
    fn probe(&self, url: &str) -> Result<u16, FetchError>;
}
