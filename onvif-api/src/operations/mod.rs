//! ONVIF operations organized by service
//!
//! Each operation lives in its own file and implements `OnvifOperation`.

pub mod device;
pub mod events;

pub use device::{
    CapabilityCategory, GetCapabilitiesOperation, GetCapabilitiesRequest, GetDeviceInformationOperation,
    GetSystemDateAndTimeOperation,
};
pub use events::{
    CreatePullPointSubscriptionOperation, CreatePullPointSubscriptionRequest, PullMessagesOperation,
    PullMessagesRequest, RenewOperation, RenewRequest, UnsubscribeOperation,
};
