//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault {code}: {reason}")]
    Fault {
        /// Fault subcode when present (e.g. `ter:NotAuthorized`), otherwise the code
        code: String,
        /// Human readable reason text
        reason: String,
    },

    /// The device rejected our credentials at the HTTP layer
    #[error("Unauthorized (HTTP {0})")]
    Unauthorized(u16),
}

impl SoapError {
    /// Whether this error means the device refused our credentials
    pub fn is_auth_failure(&self) -> bool {
        match self {
            SoapError::Unauthorized(_) => true,
            SoapError::Fault { code, .. } => code.ends_with("NotAuthorized"),
            _ => false,
        }
    }
}
