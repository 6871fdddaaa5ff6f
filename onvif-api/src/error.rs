use soap_client::SoapError;
use thiserror::Error;

/// High-level API errors for ONVIF operations
///
/// Abstracts the underlying SOAP transport into failures a caller can act on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, timeouts, DNS failures, or an unreachable device.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The device answered, but the content did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault {code}: {reason}")]
    SoapFault { code: String, reason: String },

    /// The device refused the configured credentials
    #[error("Not authorized")]
    NotAuthorized,

    /// The device does not advertise a service we need
    #[error("Device does not expose the {0} service")]
    MissingService(&'static str),
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        if error.is_auth_failure() {
            return ApiError::NotAuthorized;
        }
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault { code, reason } => ApiError::SoapFault { code, reason },
            SoapError::Unauthorized(_) => ApiError::NotAuthorized,
        }
    }
}
