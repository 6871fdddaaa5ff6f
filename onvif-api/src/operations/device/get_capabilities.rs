//! GetCapabilities operation for the Device service
//!
//! Only used to find the event service address; other capability categories
//! are not parsed.

use xmltree::Element;

use crate::operation::child_text;
use crate::{ApiError, OnvifOperation, Service};

/// GetCapabilities operation
pub struct GetCapabilitiesOperation;

/// Capability categories that can be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityCategory {
    All,
    Events,
}

/// Request for GetCapabilities operation
#[derive(Debug, Clone)]
pub struct GetCapabilitiesRequest {
    pub category: CapabilityCategory,
}

/// Response for GetCapabilities operation
#[derive(Debug, Clone, PartialEq)]
pub struct GetCapabilitiesResponse {
    /// Event service address, absent when the device has no event service
    pub events_xaddr: Option<String>,

    /// Whether the event service supports pull point subscriptions
    pub pull_point_support: bool,
}

impl OnvifOperation for GetCapabilitiesOperation {
    type Request = GetCapabilitiesRequest;
    type Response = GetCapabilitiesResponse;

    const SERVICE: Service = Service::Device;
    const ACTION: &'static str = "GetCapabilities";

    fn build_payload(request: &Self::Request) -> String {
        let category = match request.category {
            CapabilityCategory::All => "All",
            CapabilityCategory::Events => "Events",
        };
        format!("<Category>{}</Category>", category)
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let capabilities = xml
            .get_child("Capabilities")
            .ok_or_else(|| ApiError::ParseError("Missing Capabilities element".to_string()))?;

        let events = capabilities.get_child("Events");
        let events_xaddr = events.and_then(|e| child_text(e, "XAddr")).filter(|x| !x.is_empty());
        let pull_point_support = events
            .and_then(|e| child_text(e, "WSPullPointSupport"))
            .map(|v| v == "true")
            .unwrap_or(false);

        Ok(GetCapabilitiesResponse {
            events_xaddr,
            pull_point_support,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_construction() {
        let request = GetCapabilitiesRequest {
            category: CapabilityCategory::Events,
        };
        assert_eq!(
            GetCapabilitiesOperation::build_payload(&request),
            "<Category>Events</Category>"
        );
    }

    #[test]
    fn test_response_parsing() {
        let xml_str = r#"
            <tds:GetCapabilitiesResponse xmlns:tds="http://www.onvif.org/ver10/device/wsdl"
                                         xmlns:tt="http://www.onvif.org/ver10/schema">
                <tds:Capabilities>
                    <tt:Events>
                        <tt:XAddr>http://10.0.0.5/onvif/Events</tt:XAddr>
                        <tt:WSSubscriptionPolicySupport>true</tt:WSSubscriptionPolicySupport>
                        <tt:WSPullPointSupport>true</tt:WSPullPointSupport>
                    </tt:Events>
                </tds:Capabilities>
            </tds:GetCapabilitiesResponse>
        "#;
        let xml = Element::parse(xml_str.as_bytes()).unwrap();

        let result = GetCapabilitiesOperation::parse_response(&xml).unwrap();
        assert_eq!(
            result.events_xaddr.as_deref(),
            Some("http://10.0.0.5/onvif/Events")
        );
        assert!(result.pull_point_support);
    }

    #[test]
    fn test_response_without_events() {
        let xml_str = r#"
            <GetCapabilitiesResponse><Capabilities><Device/></Capabilities></GetCapabilitiesResponse>
        "#;
        let xml = Element::parse(xml_str.as_bytes()).unwrap();

        let result = GetCapabilitiesOperation::parse_response(&xml).unwrap();
        assert_eq!(result.events_xaddr, None);
        assert!(!result.pull_point_support);
    }
}
