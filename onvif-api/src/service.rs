/// ONVIF services this crate talks to
///
/// Each service is reached at its own XAddr and owns a WSDL namespace used
/// to qualify operation elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Device management - identity, time, capabilities
    Device,

    /// Event service - creating pull point subscriptions
    Events,

    /// A pull point subscription endpoint - pulling, renewing, unsubscribing
    PullPoint,
}

impl Service {
    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::Device => "Device",
            Service::Events => "Events",
            Service::PullPoint => "PullPoint",
        }
    }

    /// WSDL namespace qualifying this service's operations
    pub fn namespace(&self) -> &'static str {
        match self {
            Service::Device => "http://www.onvif.org/ver10/device/wsdl",
            Service::Events | Service::PullPoint => "http://www.onvif.org/ver10/events/wsdl",
        }
    }
}
