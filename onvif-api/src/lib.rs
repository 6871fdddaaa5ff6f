//! Type-safe ONVIF API for camera devices
//!
//! This crate provides a trait-based API for the handful of ONVIF device and
//! event operations a camera bridge needs. It uses the private `soap-client`
//! crate for SOAP transport and WS-Security signing.
//!
//! ```rust,ignore
//! use onvif_api::{device_url, Credentials, OnvifClient};
//! use onvif_api::operations::{GetCapabilitiesOperation, GetCapabilitiesRequest, CapabilityCategory};
//!
//! let client = OnvifClient::with_credentials(Credentials::new("admin", "secret"));
//! let url = device_url("192.168.1.20", 80, onvif_api::DEFAULT_DEVICE_PATH);
//! let caps = client.execute::<GetCapabilitiesOperation>(
//!     &url,
//!     &GetCapabilitiesRequest { category: CapabilityCategory::Events },
//! )?;
//! ```

pub mod client;
pub mod error;
pub mod notification;
pub mod operation;
pub mod operations;
pub mod service;

pub use client::{device_url, OnvifClient, DEFAULT_DEVICE_PATH};
pub use error::{ApiError, Result};
pub use notification::{element_to_json, Notification};
pub use operation::OnvifOperation;
pub use operations::device::DeviceInformation;
pub use service::Service;
pub use soap_client::Credentials;
