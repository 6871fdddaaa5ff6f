//! GetSystemDateAndTime operation for the Device service
//!
//! The one call a device must answer without authentication, which makes it
//! the handshake and the liveness probe.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use xmltree::Element;

use crate::operation::child_text;
use crate::{ApiError, OnvifOperation, Service};

/// GetSystemDateAndTime operation
pub struct GetSystemDateAndTimeOperation;

/// Response for GetSystemDateAndTime operation
#[derive(Debug, Clone, PartialEq)]
pub struct SystemDateAndTime {
    /// `Manual` or `NTP`
    pub date_time_type: Option<String>,

    /// Device clock in UTC, when the device reports one
    pub utc: Option<DateTime<Utc>>,
}

impl OnvifOperation for GetSystemDateAndTimeOperation {
    type Request = ();
    type Response = SystemDateAndTime;

    const SERVICE: Service = Service::Device;
    const ACTION: &'static str = "GetSystemDateAndTime";
    const AUTHENTICATED: bool = false;

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let info = xml
            .get_child("SystemDateAndTime")
            .ok_or_else(|| ApiError::ParseError("Missing SystemDateAndTime element".to_string()))?;

        let utc = info.get_child("UTCDateTime").and_then(parse_date_time);

        Ok(SystemDateAndTime {
            date_time_type: child_text(info, "DateTimeType"),
            utc,
        })
    }
}

fn parse_date_time(xml: &Element) -> Option<DateTime<Utc>> {
    let field = |parent: &str, name: &str| -> Option<u32> {
        xml.get_child(parent)
            .and_then(|p| child_text(p, name))
            .and_then(|t| t.parse().ok())
    };

    let date = NaiveDate::from_ymd_opt(
        field("Date", "Year")? as i32,
        field("Date", "Month")?,
        field("Date", "Day")?,
    )?;
    let naive = date.and_hms_opt(
        field("Time", "Hour")?,
        field("Time", "Minute")?,
        field("Time", "Second")?,
    )?;
    Some(Utc.from_utc_datetime(&naive))
}
