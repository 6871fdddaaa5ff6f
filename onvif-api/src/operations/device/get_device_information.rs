//! GetDeviceInformation operation for the Device service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::{child_text, required_text};
use crate::{ApiError, OnvifOperation, Service};

/// GetDeviceInformation operation
pub struct GetDeviceInformationOperation;

/// Static identity of a device
///
/// Serialized in camelCase (`firmwareVersion`, `serialNumber`, ...), which is
/// the shape published on the bridge's `info` topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInformation {
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
    pub hardware_id: String,
}

impl OnvifOperation for GetDeviceInformationOperation {
    type Request = ();
    type Response = DeviceInformation;

    const SERVICE: Service = Service::Device;
    const ACTION: &'static str = "GetDeviceInformation";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(DeviceInformation {
            manufacturer: required_text(xml, "Manufacturer")?,
            model: required_text(xml, "Model")?,
            firmware_version: child_text(xml, "FirmwareVersion").unwrap_or_default(),
            serial_number: child_text(xml, "SerialNumber").unwrap_or_default(),
            hardware_id: child_text(xml, "HardwareId").unwrap_or_default(),
        })
    }
}
