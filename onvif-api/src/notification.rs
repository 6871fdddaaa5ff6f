//! Conversion of ONVIF notification XML into JSON payload trees
//!
//! Notification messages are converted with a fixed convention so that the
//! resulting tree has a stable shape downstream:
//!
//! - namespace prefixes are dropped and element names lower-camel-cased
//!   (`tt:SimpleItem` becomes `simpleItem`)
//! - attributes live under `"$"`, keeping their original names
//! - text of an element that also has attributes or children lives under `"_"`;
//!   a text-only element becomes its text directly
//! - repeated child elements become arrays
//! - scalar strings `true`/`false` and finite numbers become JSON scalars
//!
//! ```text
//! <wsnt:NotificationMessage>
//!   <wsnt:Topic Dialect="...">tns1:RuleEngine/CellMotionDetector/Motion</wsnt:Topic>
//!   <wsnt:Message>
//!     <tt:Message UtcTime="...">
//!       <tt:Data><tt:SimpleItem Name="IsMotion" Value="true"/></tt:Data>
//!     </tt:Message>
//!   </wsnt:Message>
//! </wsnt:NotificationMessage>
//! ```
//!
//! becomes
//!
//! ```text
//! {"topic": {"_": "tns1:RuleEngine/CellMotionDetector/Motion", "$": {"Dialect": "..."}},
//!  "message": {"message": {"$": {"UtcTime": "..."},
//!                          "data": {"simpleItem": {"$": {"Name": "IsMotion", "Value": true}}}}}}
//! ```

use serde_json::{Map, Number, Value};
use xmltree::{Element, XMLNode};

/// One notification pulled from a device
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Topic expression text, e.g. `tns1:RuleEngine/CellMotionDetector/Motion`
    pub topic: Option<String>,

    /// The whole `NotificationMessage` converted to a JSON tree
    pub payload: Value,
}

impl Notification {
    /// Convert a `NotificationMessage` element
    pub fn from_element(element: &Element) -> Self {
        let payload = element_to_json(element);
        let topic = match payload.get("topic") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Object(map)) => map.get("_").and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        Self { topic, payload }
    }
}

/// Convert an element (and its subtree) into a JSON value
pub fn element_to_json(element: &Element) -> Value {
    let mut map = Map::new();

    if !element.attributes.is_empty() {
        let attributes = element
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), scalar(value)))
            .collect::<Map<String, Value>>();
        map.insert("$".to_string(), Value::Object(attributes));
    }

    let mut text = String::new();
    for node in &element.children {
        match node {
            XMLNode::Element(child) => {
                let key = camel_case(&child.name);
                let value = element_to_json(child);
                match map.get_mut(&key) {
                    Some(Value::Array(items)) => items.push(value),
                    Some(existing) => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, value]);
                    }
                    None => {
                        map.insert(key, value);
                    }
                }
            }
            XMLNode::Text(t) | XMLNode::CData(t) => text.push_str(t),
            _ => {}
        }
    }

    let text = text.trim();
    if map.is_empty() {
        return scalar(text);
    }
    if !text.is_empty() {
        map.insert("_".to_string(), scalar(text));
    }
    Value::Object(map)
}

/// Lower-case the first character of an element's local name
fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Interpret scalar text the way device payloads are meant to be read
fn scalar(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        return Value::String(text.to_string());
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => Value::String(text.to_string()),
    }
}
