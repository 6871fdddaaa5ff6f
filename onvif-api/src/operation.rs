use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Base trait for all ONVIF operations
///
/// Associated types keep each request/response pair strongly typed while the
/// client stays generic over which operation it sends.
pub trait OnvifOperation {
    /// The request data for this operation
    type Request;

    /// The parsed response for this operation
    type Response;

    /// The ONVIF service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Whether the device requires a WS-Security header for this operation
    ///
    /// `GetSystemDateAndTime` is the only call devices must answer anonymously.
    const AUTHENTICATED: bool = true;

    /// Namespace qualifying the operation element
    fn namespace() -> &'static str {
        Self::SERVICE.namespace()
    }

    /// Build the inner XML of the operation element (without SOAP envelope)
    fn build_payload(request: &Self::Request) -> String;

    /// Parse the `{ACTION}Response` element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;
}

/// Text content of a direct child element, trimmed
pub(crate) fn child_text(xml: &Element, name: &str) -> Option<String> {
    xml.get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
}

/// Text content of a direct child element, or a parse error naming it
pub(crate) fn required_text(xml: &Element, name: &str) -> Result<String, ApiError> {
    child_text(xml, name).ok_or_else(|| ApiError::ParseError(format!("Missing {} element", name)))
}
