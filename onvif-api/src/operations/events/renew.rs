//! Renew operation for a pull point subscription

use std::time::Duration;

use chrono::{DateTime, Utc};
use xmltree::Element;

use super::{parse_time, WSN_NAMESPACE};
use crate::operation::child_text;
use crate::{ApiError, OnvifOperation, Service};

/// Renew operation
pub struct RenewOperation;

/// Request for Renew operation
#[derive(Debug, Clone)]
pub struct RenewRequest {
    pub termination_time: Duration,
}

/// Response for Renew operation
#[derive(Debug, Clone, PartialEq)]
pub struct RenewResponse {
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
}

impl OnvifOperation for RenewOperation {
    type Request = RenewRequest;
    type Response = RenewResponse;

    const SERVICE: Service = Service::PullPoint;
    const ACTION: &'static str = "Renew";

    fn namespace() -> &'static str {
        WSN_NAMESPACE
    }

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<TerminationTime>PT{}S</TerminationTime>",
            request.termination_time.as_secs()
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(RenewResponse {
            current_time: parse_time(child_text(xml, "CurrentTime")),
            termination_time: parse_time(child_text(xml, "TerminationTime")),
        })
    }
}
