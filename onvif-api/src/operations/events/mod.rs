//! Event service and pull point operations

mod create_pull_point_subscription;
mod pull_messages;
mod renew;
mod unsubscribe;

pub use create_pull_point_subscription::{
    CreatePullPointSubscriptionOperation, CreatePullPointSubscriptionRequest, PullPointSubscription,
};
pub use pull_messages::{PullMessagesOperation, PullMessagesRequest, PullMessagesResponse};
pub use renew::{RenewOperation, RenewRequest, RenewResponse};
pub use unsubscribe::UnsubscribeOperation;

/// WS-BaseNotification namespace used by subscription management operations
pub(crate) const WSN_NAMESPACE: &str = "http://docs.oasis-open.org/wsn/b-2";

/// Parse an `xs:dateTime` element value, tolerating a missing one
pub(crate) fn parse_time(text: Option<String>) -> Option<chrono::DateTime<chrono::Utc>> {
    text.and_then(|t| chrono::DateTime::parse_from_rfc3339(&t).ok())
        .map(|t| t.with_timezone(&chrono::Utc))
}
