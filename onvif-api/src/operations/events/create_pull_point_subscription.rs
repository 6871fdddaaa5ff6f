//! CreatePullPointSubscription operation for the Event service

use std::time::Duration;

use chrono::{DateTime, Utc};
use xmltree::Element;

use super::parse_time;
use crate::operation::child_text;
use crate::{ApiError, OnvifOperation, Service};

/// CreatePullPointSubscription operation
pub struct CreatePullPointSubscriptionOperation;

/// Request for CreatePullPointSubscription operation
#[derive(Debug, Clone)]
pub struct CreatePullPointSubscriptionRequest {
    /// Lifetime requested for the subscription before it must be renewed
    pub initial_termination_time: Duration,
}

/// A freshly created pull point
#[derive(Debug, Clone, PartialEq)]
pub struct PullPointSubscription {
    /// Address to send PullMessages/Renew/Unsubscribe to
    pub address: String,
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
}

impl OnvifOperation for CreatePullPointSubscriptionOperation {
    type Request = CreatePullPointSubscriptionRequest;
    type Response = PullPointSubscription;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "CreatePullPointSubscription";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<InitialTerminationTime>PT{}S</InitialTerminationTime>",
            request.initial_termination_time.as_secs()
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let address = xml
            .get_child("SubscriptionReference")
            .and_then(|r| child_text(r, "Address"))
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::ParseError("Missing SubscriptionReference address".to_string()))?;

        Ok(PullPointSubscription {
            address,
            current_time: parse_time(child_text(xml, "CurrentTime")),
            termination_time: parse_time(child_text(xml, "TerminationTime")),
        })
    }
}
