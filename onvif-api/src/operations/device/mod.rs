//! Device management service operations

mod get_capabilities;
mod get_device_information;
mod get_system_date_and_time;

pub use get_capabilities::{
    CapabilityCategory, GetCapabilitiesOperation, GetCapabilitiesRequest, GetCapabilitiesResponse,
};
pub use get_device_information::{DeviceInformation, GetDeviceInformationOperation};
pub use get_system_date_and_time::{GetSystemDateAndTimeOperation, SystemDateAndTime};
