/// Errors a data fetch can surface to a session.
///
/// `Cancelled` marks a superseded request and is never shown to the user;
/// the other two reach the session as a retryable error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// A newer request replaced this one; discard silently.
    Cancelled,
    /// Transport failure or non-success response from the backend.
    Network(String),
    /// The payload arrived but is missing expected content.
    Data(String),
}

impl FetchError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// Message shown in the error banner. Cancellations have none.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            FetchError::Cancelled => None,
            FetchError::Network(msg) | FetchError::Data(msg) => Some(msg),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Cancelled => write!(f, "request cancelled"),
            FetchError::Network(msg) => write!(f, "network error: {}", msg),
            FetchError::Data(msg) => write!(f, "data error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

pub type FetchResult<T> = Result<T, FetchError>;
