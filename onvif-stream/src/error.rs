//! Error types for the onvif-stream crate.

use onvif_api::ApiError;

/// Errors reported by a device session.
///
/// Carries rendered messages rather than source errors so signals holding
/// one can be cloned and sent across tasks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The device could not be reached or refused the handshake
    #[error("Connect failed: {0}")]
    Connect(String),

    /// A request on an established session failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Creating, renewing or pulling from an event subscription failed
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// The session is no longer usable
    #[error("Session closed")]
    Closed,
}

impl SessionError {
    pub fn connect(error: ApiError) -> Self {
        SessionError::Connect(error.to_string())
    }

    pub fn request(error: ApiError) -> Self {
        SessionError::Request(error.to_string())
    }

    pub fn subscription(error: ApiError) -> Self {
        SessionError::Subscription(error.to_string())
    }
}

/// Type alias for results that can return a SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
