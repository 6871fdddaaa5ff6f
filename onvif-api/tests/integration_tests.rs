//! Parsing of recorded device responses through the public operation API

use onvif_api::operations::{
    GetCapabilitiesOperation, PullMessagesOperation, PullMessagesRequest,
};
use onvif_api::{device_url, ApiError, OnvifClient, OnvifOperation, DEFAULT_DEVICE_PATH};
use serde_json::json;
use std::time::Duration;
use xmltree::Element;

const PULL_RESPONSE: &str = r#"
    <tev:PullMessagesResponse xmlns:tev="http://www.onvif.org/ver10/events/wsdl"
                              xmlns:wsnt="http://docs.oasis-open.org/wsn/b-2"
                              xmlns:tt="http://www.onvif.org/ver10/schema">
        <tev:CurrentTime>2024-05-01T10:00:05Z</tev:CurrentTime>
        <tev:TerminationTime>2024-05-01T10:01:05Z</tev:TerminationTime>
        <wsnt:NotificationMessage>
            <wsnt:Topic Dialect="http://www.onvif.org/ver10/tev/topicExpression/ConcreteSet">tns1:RuleEngine/CellMotionDetector/Motion</wsnt:Topic>
            <wsnt:Message>
                <tt:Message UtcTime="2024-05-01T10:00:04Z" PropertyOperation="Changed">
                    <tt:Data><tt:SimpleItem Name="IsMotion" Value="true"/></tt:Data>
                </tt:Message>
            </wsnt:Message>
        </wsnt:NotificationMessage>
        <wsnt:NotificationMessage>
            <wsnt:Topic Dialect="http://www.onvif.org/ver10/tev/topicExpression/ConcreteSet">tns1:Device/Trigger/DigitalInput</wsnt:Topic>
            <wsnt:Message>
                <tt:Message UtcTime="2024-05-01T10:00:04Z" PropertyOperation="Changed">
                    <tt:Data><tt:SimpleItem Name="LogicalState" Value="false"/></tt:Data>
                </tt:Message>
            </wsnt:Message>
        </wsnt:NotificationMessage>
    </tev:PullMessagesResponse>
"#;

#[test]
fn test_pull_response_keeps_delivery_order() {
    let xml = Element::parse(PULL_RESPONSE.as_bytes()).unwrap();
    let response = PullMessagesOperation::parse_response(&xml).unwrap();

    let topics: Vec<_> = response
        .messages
        .iter()
        .map(|m| m.topic.clone().unwrap_or_default())
        .collect();
    assert_eq!(
        topics,
        vec![
            "tns1:RuleEngine/CellMotionDetector/Motion",
            "tns1:Device/Trigger/DigitalInput",
        ]
    );

    let states: Vec<_> = response
        .messages
        .iter()
        .map(|m| m.payload["message"]["message"]["data"]["simpleItem"]["$"]["Value"].clone())
        .collect();
    assert_eq!(states, vec![json!(true), json!(false)]);
    assert!(response.termination_time > response.current_time);
}

#[test]
fn test_empty_pull_response() {
    let xml = Element::parse(
        r#"<PullMessagesResponse><CurrentTime>2024-05-01T10:00:05Z</CurrentTime></PullMessagesResponse>"#
            .as_bytes(),
    )
    .unwrap();
    let response = PullMessagesOperation::parse_response(&xml).unwrap();
    assert!(response.messages.is_empty());
    assert_eq!(response.termination_time, None);
}

#[test]
fn test_capabilities_without_body_is_a_parse_error() {
    let xml = Element::parse(r#"<GetCapabilitiesResponse/>"#.as_bytes()).unwrap();
    assert!(matches!(
        GetCapabilitiesOperation::parse_response(&xml),
        Err(ApiError::ParseError(_))
    ));
}

#[test]
fn test_pull_request_uses_iso_durations() {
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
fn test_refused_connection_surfaces_as_network_error() {
    let client = OnvifClient::with_timeout(Duration::from_secs(1), None);
    let url = device_url("127.0.0.1", 9, DEFAULT_DEVICE_PATH);

    match client.execute::<onvif_api::operations::GetSystemDateAndTimeOperation>(&url, &()) {
        Err(ApiError::NetworkError(_)) => {}
        other => panic!("Expected NetworkError, got {:?}", other),
    }
}
