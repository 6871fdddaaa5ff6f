use std::time::Duration;

use chrono::{DateTime, Utc};
use soap_client::{Credentials, SoapClient};

use crate::{OnvifOperation, Result};

/// Path of the device management service on virtually every ONVIF device
pub const DEFAULT_DEVICE_PATH: &str = "/onvif/device_service";

/// A client for executing ONVIF operations against a single device
///
/// The client is stateless apart from the credentials it signs requests
/// with; every call names the service address (XAddr) it goes to, since
/// event and pull point services live at addresses the device hands out.
#[derive(Debug, Clone)]
pub struct OnvifClient {
    soap_client: SoapClient,
    credentials: Option<Credentials>,
}

impl OnvifClient {
    /// Create a client that sends unauthenticated requests
    pub fn new() -> Self {
        Self::with_soap_client(SoapClient::new(), None)
    }

    /// Create a client with a custom SOAP client and optional credentials
    pub fn with_soap_client(soap_client: SoapClient, credentials: Option<Credentials>) -> Self {
        Self {
            soap_client,
            credentials,
        }
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration, credentials: Option<Credentials>) -> Self {
        Self::with_soap_client(SoapClient::with_timeout(timeout), credentials)
    }

    /// Create a client that signs authenticated operations with `credentials`
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self::with_soap_client(SoapClient::new(), Some(credentials))
    }

    /// Align WS-Security timestamps with a device clock read just now
    pub fn sync_clock(&self, device_utc: DateTime<Utc>) {
        self.soap_client.set_time_shift(device_utc - Utc::now());
    }

    /// Device clock minus local clock, as last synced
    pub fn time_shift(&self) -> chrono::Duration {
        self.soap_client.time_shift()
    }

    /// Execute an ONVIF operation against a service address
    ///
    /// # Example
    /// ```rust,ignore
    /// use onvif_api::{OnvifClient, device_url};
    /// use onvif_api::operations::GetDeviceInformationOperation;
    ///
    /// let client = OnvifClient::new();
    /// let url = device_url("192.168.1.20", 80, "/onvif/device_service");
    /// let info = client.execute::<GetDeviceInformationOperation>(&url, &())?;
    /// ```
    pub fn execute<Op: OnvifOperation>(&self, url: &str, request: &Op::Request) -> Result<Op::Response> {
        let payload = Op::build_payload(request);
        let credentials = if Op::AUTHENTICATED {
            self.credentials.as_ref()
        } else {
            None
        };

        let xml = self
            .soap_client
            .call(url, Op::namespace(), Op::ACTION, &payload, credentials)?;

        Op::parse_response(&xml)
    }
}

impl Default for OnvifClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the device service address from its parts
pub fn device_url(hostname: &str, port: u16, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if port == 80 {
        format!("http://{}{}", hostname, path)
    } else {
        format!("http://{}:{}{}", hostname, port, path)
    }
}
