//! Unsubscribe operation for a pull point subscription

use xmltree::Element;

use super::WSN_NAMESPACE;
use crate::{ApiError, OnvifOperation, Service};

/// Unsubscribe operation
pub struct UnsubscribeOperation;

impl OnvifOperation for UnsubscribeOperation {
    type Request = ();
    type Response = ();

    const SERVICE: Service = Service::PullPoint;
    const ACTION: &'static str = "Unsubscribe";

    fn namespace() -> &'static str {
        WSN_NAMESPACE
    }

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}
