//! PullMessages operation for a pull point subscription

use std::time::Duration;

use chrono::{DateTime, Utc};
use xmltree::{Element, XMLNode};

use super::parse_time;
use crate::notification::Notification;
use crate::operation::child_text;
use crate::{ApiError, OnvifOperation, Service};

/// PullMessages operation
pub struct PullMessagesOperation;

/// Request for PullMessages operation
#[derive(Debug, Clone)]
pub struct PullMessagesRequest {
    /// How long the device may hold the request open waiting for messages
    pub timeout: Duration,
    /// Upper bound on messages returned in one response
    pub message_limit: u32,
}

/// Response for PullMessages operation
#[derive(Debug, Clone, PartialEq)]
pub struct PullMessagesResponse {
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
    /// Notifications in device delivery order
    pub messages: Vec<Notification>,
}

impl OnvifOperation for PullMessagesOperation {
    type Request = PullMessagesRequest;
    type Response = PullMessagesResponse;

    const SERVICE: Service = Service::PullPoint;
    const ACTION: &'static str = "PullMessages";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<Timeout>PT{}S</Timeout><MessageLimit>{}</MessageLimit>",
            request.timeout.as_secs(),
            request.message_limit
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let messages = xml
            .children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(e) if e.name == "NotificationMessage" => Some(Notification::from_element(e)),
                _ => None,
            })
            .collect();

        Ok(PullMessagesResponse {
            current_time: parse_time(child_text(xml, "CurrentTime")),
            termination_time: parse_time(child_text(xml, "TerminationTime")),
            messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_construction() {
        let request = PullMessagesRequest {
            timeout: Duration::from_secs(5),
            message_limit: 10,
        };
        assert_eq!(
            PullMessagesOperation::build_payload(&request),
            "<Timeout>PT5S</Timeout><MessageLimit>10</MessageLimit>"
        );
    }

    #[test]
    fn test_response_keeps_delivery_order() {
        let xml_str = r#"
            <tev:PullMessagesResponse xmlns:tev="http://www.onvif.org/ver10/events/wsdl"
                                      xmlns:wsnt="http://docs.oasis-open.org/wsn/b-2"
                                      xmlns:tt="http://www.onvif.org/ver10/schema">
                <tev:CurrentTime>2024-05-01T10:00:00Z</tev:CurrentTime>
                <tev:TerminationTime>2024-05-01T10:01:00Z</tev:TerminationTime>
                <wsnt:NotificationMessage>
                    <wsnt:Topic Dialect="x">tns1:RuleEngine/CellMotionDetector/Motion</wsnt:Topic>
                    <wsnt:Message><tt:Message><tt:Data><tt:SimpleItem Name="IsMotion" Value="true"/></tt:Data></tt:Message></wsnt:Message>
                </wsnt:NotificationMessage>
                <wsnt:NotificationMessage>
                    <wsnt:Topic Dialect="x">tns1:RuleEngine/CellMotionDetector/Motion</wsnt:Topic>
                    <wsnt:Message><tt:Message><tt:Data><tt:SimpleItem Name="IsMotion" Value="false"/></tt:Data></tt:Message></wsnt:Message>
                </wsnt:NotificationMessage>
            </tev:PullMessagesResponse>
        "#;
        let xml = Element::parse(xml_str.as_bytes()).unwrap();

        let result = PullMessagesOperation::parse_response(&xml).unwrap();
        assert_eq!(result.messages.len(), 2);
        let values: Vec<_> = result
            .messages
            .iter()
            .map(|m| m.payload["message"]["message"]["data"]["simpleItem"]["$"]["Value"].clone())
            .collect();
        assert_eq!(values, vec![json!(true), json!(false)]);
        assert!(result.termination_time.is_some());
    }

    #[test]
    fn test_empty_response() {
        let xml = Element::parse(r#"<PullMessagesResponse/>"#.as_bytes()).unwrap();
        let result = PullMessagesOperation::parse_response(&xml).unwrap();
        assert!(result.messages.is_empty());
        assert_eq!(result.current_time, None);
    }
}
