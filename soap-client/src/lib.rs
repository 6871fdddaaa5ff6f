//! Private SOAP client for ONVIF device communication
//!
//! This crate provides a minimal SOAP 1.2 client specifically designed for
//! talking to ONVIF cameras. Requests can be signed with a WS-Security
//! UsernameToken digest, and SOAP faults are surfaced as typed errors.

mod error;
pub mod security;

pub use error::SoapError;
pub use security::Credentials;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use xmltree::Element;

const SOAP_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";

/// A minimal SOAP client for ONVIF device communication
///
/// Clones share the agent and the device clock offset.
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
    /// Device clock minus local clock, in milliseconds
    time_shift_ms: Arc<AtomicI64>,
}

impl SoapClient {
    /// Create a new SOAP client with default timeouts
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a SOAP client whose reads give up after `timeout`
    ///
    /// Long-polling operations such as `PullMessages` need a read timeout
    /// longer than the server-side wait they request.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(5))
                .timeout_read(timeout)
                .build(),
            time_shift_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Offset applied to WS-Security timestamps, device clock minus local clock
    pub fn time_shift(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.time_shift_ms.load(Ordering::Relaxed))
    }

    pub fn set_time_shift(&self, shift: chrono::Duration) {
        self.time_shift_ms
            .store(shift.num_milliseconds(), Ordering::Relaxed);
    }

    /// Send a SOAP request and return the parsed `{action}Response` element
    ///
    /// # Arguments
    /// * `url` - Full service address (XAddr), e.g. `http://10.0.0.5/onvif/device_service`
    /// * `namespace` - WSDL namespace of the service owning `action`
    /// * `action` - Operation name, e.g. `GetDeviceInformation`
    /// * `payload` - Inner XML of the operation element
    /// * `credentials` - Adds a WS-Security header when present
    pub fn call(
        &self,
        url: &str,
        namespace: &str,
        action: &str,
        payload: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Element, SoapError> {
        let body = build_envelope(url, namespace, action, payload, credentials, self.time_shift());
        let content_type = format!(
            "application/soap+xml; charset=utf-8; action=\"{}/{}\"",
            namespace, action
        );

        let response = self
            .agent
            .post(url)
            .set("Content-Type", &content_type)
            .send_string(&body);

        let xml_text = match response {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            Err(ureq::Error::Status(401, _)) => return Err(SoapError::Unauthorized(401)),
            Err(ureq::Error::Status(code, response)) => {
                // Devices report faults with HTTP 400/500 and a fault body
                let text = response.into_string().unwrap_or_default();
                return match Element::parse(text.as_bytes()) {
                    Ok(xml) => match extract_response(&xml, action) {
                        Err(fault @ SoapError::Fault { .. }) => Err(fault),
                        _ => Err(SoapError::Network(format!("HTTP {}", code))),
                    },
                    Err(_) => Err(SoapError::Network(format!("HTTP {}", code))),
                };
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        extract_response(&xml, action)
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a SOAP 1.2 envelope with WS-Addressing and optional WS-Security headers
pub fn build_envelope(
    url: &str,
    namespace: &str,
    action: &str,
    payload: &str,
    credentials: Option<&Credentials>,
    time_shift: chrono::Duration,
) -> String {
    let security = credentials
        .map(|c| c.security_header(time_shift))
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><s:Envelope xmlns:s="{env}" xmlns:a="{wsa}"><s:Header><a:Action>{namespace}/{action}</a:Action><a:To>{to}</a:To>{security}</s:Header><s:Body><{action} xmlns="{namespace}">{payload}</{action}></s:Body></s:Envelope>"#,
        env = SOAP_ENV_NS,
        wsa = WSA_NS,
        namespace = namespace,
        action = action,
        to = security::escape(url),
        security = security,
        payload = payload,
    )
}

/// Extract the `{action}Response` element from a response envelope, or its fault
pub fn extract_response(xml: &Element, action: &str) -> Result<Element, SoapError> {
    let body = xml
        .get_child("Body")
        .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

    if let Some(fault) = body.get_child("Fault") {
        return Err(parse_fault(fault));
    }

    let response_name = format!("{}Response", action);
    body.get_child(response_name.as_str())
        .cloned()
        .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
}

fn parse_fault(fault: &Element) -> SoapError {
    let value_of = |element: &Element| {
        element
            .get_child("Value")
            .and_then(|v| v.get_text())
            .map(|t| t.trim().to_string())
    };

    let code_element = fault.get_child("Code");
    let code = code_element
        .and_then(|c| c.get_child("Subcode"))
        .and_then(value_of)
        .or_else(|| code_element.and_then(value_of))
        .unwrap_or_else(|| "unknown".to_string());

    let reason = fault
        .get_child("Reason")
        .and_then(|r| r.get_child("Text"))
        .and_then(|t| t.get_text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    SoapError::Fault { code, reason }
}
