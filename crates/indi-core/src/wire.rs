//! INDI wire elements
//!
//! Serde models of the XML elements exchanged with a driver, plus
//! conversions between them and property vectors. Numeric and switch bodies
//! are carried as strings so that formatting stays under the control of
//! [`crate::format`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::se::to_string_with_root;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::InboundEvent;
use crate::format::{format_number, format_switch, parse_number, parse_switch};
use crate::value::{Blob, Number, Switch, Text};
use crate::vector::{BlobVector, NumberVector, Permission, SwitchRule, SwitchVector, TextVector, Vector};

/// Protocol version announced in `getProperties`
pub const PROTOCOL_VERSION: &str = "1.7";

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Failed to parse element: {0}")]
    Parse(String),
    #[error("Failed to serialize element: {0}")]
    Serialize(String),
    #[error("Unsupported element: {0}")]
    UnsupportedElement(String),
    #[error("Invalid number {value:?} for {name}")]
    InvalidNumber { name: String, value: String },
    #[error("Invalid switch state {value:?} for {name}")]
    InvalidSwitch { name: String, value: String },
    #[error("Invalid base64 payload for {0}")]
    InvalidBlob(String),
}

/// `getProperties` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProperties {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@version", default)]
    pub version: String,
}

/// `enableBLOB` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnableBlob {
    #[serde(rename = "@device")]
    pub device: String,
    #[serde(rename = "$text")]
    pub mode: String,
}

/// `oneNumber`, `oneText` and `oneSwitch` share a shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneValue {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneBlob {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@format", default)]
    pub format: String,
    #[serde(rename = "@size", default)]
    pub size: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// `newNumberVector`; also decodes the driver's `setNumberVector`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNumberVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "oneNumber", default)]
    pub items: Vec<OneValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTextVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "oneText", default)]
    pub items: Vec<OneValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSwitchVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "oneSwitch", default)]
    pub items: Vec<OneValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlobVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "oneBlob", alias = "oneBLOB", default)]
    pub items: Vec<OneBlob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefNumber {
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@format", default)]
    pub format: String,
    #[serde(rename = "@min", default)]
    pub min: String,
    #[serde(rename = "@max", default)]
    pub max: String,
    #[serde(rename = "@step", default)]
    pub step: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefNumberVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@group", default)]
    pub group: String,
    #[serde(rename = "@perm", default)]
    pub perm: String,
    #[serde(rename = "defNumber", default)]
    pub items: Vec<DefNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefText {
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefTextVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@group", default)]
    pub group: String,
    #[serde(rename = "@perm", default)]
    pub perm: String,
    #[serde(rename = "defText", default)]
    pub items: Vec<DefText>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefSwitch {
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefSwitchVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@group", default)]
    pub group: String,
    #[serde(rename = "@rule", default)]
    pub rule: String,
    #[serde(rename = "@perm", default)]
    pub perm: String,
    #[serde(rename = "defSwitch", default)]
    pub items: Vec<DefSwitch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefBlob {
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@format", default)]
    pub format: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefBlobVector {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@label", default)]
    pub label: String,
    #[serde(rename = "@group", default)]
    pub group: String,
    #[serde(rename = "@perm", default)]
    pub perm: String,
    #[serde(rename = "defBlob", alias = "defBLOB", default)]
    pub items: Vec<DefBlob>,
}

/// `delProperty` notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelProperty {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@name", default)]
    pub name: String,
}

/// `message` notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "@device", default)]
    pub device: String,
    #[serde(rename = "@timestamp", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "@message", default)]
    pub message: String,
}

/// Serialize an element with the given root tag
pub fn encode<T: Serialize>(root: &str, element: &T) -> Result<String, WireError> {
    to_string_with_root(root, element).map_err(|e| WireError::Serialize(e.to_string()))
}

fn parse<'de, T: Deserialize<'de>>(xml: &'de str) -> Result<T, WireError> {
    from_str(xml).map_err(|e| WireError::Parse(e.to_string()))
}

/// Name of the first element in `xml`
pub fn root_name(xml: &str) -> Result<String, WireError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(WireError::Parse("no element found".to_string())),
            Ok(_) => continue,
            Err(e) => return Err(WireError::Parse(e.to_string())),
        }
    }
}

/// Decode a single inbound element into an event
///
/// Handles the `def*Vector` and `set*Vector` families, `delProperty` and
/// `message`. Client-side requests (`new*Vector`) decode too, since a mirror
/// may be fed its own echo.
pub fn decode(xml: &str) -> Result<InboundEvent, WireError> {
    let root = root_name(xml)?;
    let event = match root.as_str() {
        "defNumberVector" => {
            let vector = parse::<DefNumberVector>(xml)?.into_vector()?;
            InboundEvent::NewNumber {
                device: vector.device.clone(),
                vector,
            }
        }
        "defTextVector" => {
            let vector = with_text_bodies(parse::<DefTextVector>(xml)?.into_vector(), xml, "defText")?;
            InboundEvent::NewText {
                device: vector.device.clone(),
                vector,
            }
        }
        "defSwitchVector" => {
            let vector = parse::<DefSwitchVector>(xml)?.into_vector()?;
            InboundEvent::NewSwitch {
                device: vector.device.clone(),
                vector,
            }
        }
        "defBLOBVector" | "defBlobVector" => {
            let vector = parse::<DefBlobVector>(xml)?.into_vector()?;
            InboundEvent::NewBlob {
                device: vector.device.clone(),
                vector,
            }
        }
        "setNumberVector" | "newNumberVector" => {
            let vector = parse::<NewNumberVector>(xml)?.into_vector()?;
            InboundEvent::NewNumber {
                device: vector.device.clone(),
                vector,
            }
        }
        "setTextVector" | "newTextVector" => {
            let vector = with_text_bodies(parse::<NewTextVector>(xml)?.into_vector(), xml, "oneText")?;
            InboundEvent::NewText {
                device: vector.device.clone(),
                vector,
            }
        }
        "setSwitchVector" | "newSwitchVector" => {
            let vector = parse::<NewSwitchVector>(xml)?.into_vector()?;
            InboundEvent::NewSwitch {
                device: vector.device.clone(),
                vector,
            }
        }
        "setBLOBVector" | "newBLOBVector" | "newBlobVector" => {
            let vector = parse::<NewBlobVector>(xml)?.into_vector()?;
            InboundEvent::NewBlob {
                device: vector.device.clone(),
                vector,
            }
        }
        "delProperty" => {
            let del = parse::<DelProperty>(xml)?;
            InboundEvent::DelProperty {
                device: del.device,
                name: del.name,
            }
        }
        "message" => {
            let msg = parse::<Message>(xml)?;
            InboundEvent::Message {
                device: msg.device,
                text: msg.message,
                timestamp: msg.timestamp.as_deref().and_then(parse_timestamp),
            }
        }
        other => return Err(WireError::UnsupportedElement(other.to_string())),
    };
    Ok(event)
}

/// Raw bodies of every `child` element, in document order
///
/// The serde path trims surrounding whitespace, which text values must keep.
fn text_bodies(xml: &str, child: &str) -> Result<Vec<String>, WireError> {
    let mut reader = Reader::from_str(xml);
    let mut bodies = Vec::new();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == child.as_bytes() => {
                current = Some(String::new());
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == child.as_bytes() => {
                bodies.push(String::new());
            }
            Ok(Event::Text(t)) => {
                if let Some(body) = current.as_mut() {
                    let text = t.unescape().map_err(|e| WireError::Parse(e.to_string()))?;
                    body.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(body) = current.as_mut() {
                    body.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == child.as_bytes() => {
                if let Some(body) = current.take() {
                    bodies.push(body);
                }
            }
            Ok(Event::Eof) => return Ok(bodies),
            Ok(_) => {}
            Err(e) => return Err(WireError::Parse(e.to_string())),
        }
    }
}

fn with_text_bodies(mut vector: TextVector, xml: &str, child: &str) -> Result<TextVector, WireError> {
    let bodies = text_bodies(xml, child)?;
    for (text, body) in vector.values.iter_mut().zip(bodies) {
        text.value = body;
    }
    Ok(vector)
}

/// Parse an INDI timestamp (`YYYY-MM-DDTHH:MM:SS[.f]`, UTC, optional zone)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}

fn number_field(name: &str, value: &str) -> Result<f64, WireError> {
    parse_number(value).ok_or_else(|| WireError::InvalidNumber {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Optional numeric attribute: absent means zero
fn number_attr(name: &str, value: &str) -> Result<f64, WireError> {
    if value.trim().is_empty() {
        Ok(0.0)
    } else {
        number_field(name, value)
    }
}

fn switch_field(name: &str, value: &str) -> Result<bool, WireError> {
    parse_switch(value).ok_or_else(|| WireError::InvalidSwitch {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn blob_field(name: &str, value: &str) -> Result<Vec<u8>, WireError> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|_| WireError::InvalidBlob(name.to_string()))
}

fn permission_attr(perm: &str) -> Option<Permission> {
    perm.parse().ok()
}

fn rule_attr(rule: &str) -> Option<SwitchRule> {
    rule.parse().ok()
}

impl From<&NumberVector> for DefNumberVector {
    fn from(v: &NumberVector) -> Self {
        Self {
            device: v.device.clone(),
            name: v.name.clone(),
            label: v.label.clone(),
            group: v.group.clone(),
            perm: v.permission.map(|p| p.as_str().to_string()).unwrap_or_default(),
            items: v
                .values
                .iter()
                .map(|n| DefNumber {
                    label: n.label.clone(),
                    name: n.name.clone(),
                    format: n.format.clone(),
                    min: format_number(n.min),
                    max: format_number(n.max),
                    step: format_number(n.step),
                    value: format_number(n.value),
                })
                .collect(),
        }
    }
}

impl DefNumberVector {
    pub fn into_vector(self) -> Result<NumberVector, WireError> {
        let values = self
            .items
            .into_iter()
            .map(|n| {
                Ok(Number {
                    min: number_attr(&n.name, &n.min)?,
                    max: number_attr(&n.name, &n.max)?,
                    step: number_attr(&n.name, &n.step)?,
                    value: number_field(&n.name, &n.value)?,
                    name: n.name,
                    label: n.label,
                    format: n.format,
                })
            })
            .collect::<Result<Vec<_>, WireError>>()?;
        Ok(Vector {
            device: self.device,
            name: self.name,
            label: self.label,
            group: self.group,
            permission: permission_attr(&self.perm),
            rule: None,
            values,
        })
    }
}

impl From<&TextVector> for DefTextVector {
    fn from(v: &TextVector) -> Self {
        Self {
            device: v.device.clone(),
            name: v.name.clone(),
            label: v.label.clone(),
            group: v.group.clone(),
            perm: v.permission.map(|p| p.as_str().to_string()).unwrap_or_default(),
            items: v
                .values
                .iter()
                .map(|t| DefText {
                    label: t.label.clone(),
                    name: t.name.clone(),
                    value: t.value.clone(),
                })
                .collect(),
        }
    }
}

impl DefTextVector {
    pub fn into_vector(self) -> TextVector {
        Vector {
            device: self.device,
            name: self.name,
            label: self.label,
            group: self.group,
            permission: permission_attr(&self.perm),
            rule: None,
            values: self
                .items
                .into_iter()
                .map(|t| Text::new(t.name, t.label, t.value))
                .collect(),
        }
    }
}

impl From<&SwitchVector> for DefSwitchVector {
    fn from(v: &SwitchVector) -> Self {
        Self {
            device: v.device.clone(),
            name: v.name.clone(),
            label: v.label.clone(),
            group: v.group.clone(),
            rule: v.rule.map(|r| r.as_str().to_string()).unwrap_or_default(),
            perm: v.permission.map(|p| p.as_str().to_string()).unwrap_or_default(),
            items: v
                .values
                .iter()
                .map(|s| DefSwitch {
                    label: s.label.clone(),
                    name: s.name.clone(),
                    value: format_switch(s.value).to_string(),
                })
                .collect(),
        }
    }
}

impl DefSwitchVector {
    pub fn into_vector(self) -> Result<SwitchVector, WireError> {
        let values = self
            .items
            .into_iter()
            .map(|s| Ok(Switch::new(s.name.clone(), s.label, switch_field(&s.name, &s.value)?)))
            .collect::<Result<Vec<_>, WireError>>()?;
        Ok(Vector {
            device: self.device,
            name: self.name,
            label: self.label,
            group: self.group,
            permission: permission_attr(&self.perm),
            rule: rule_attr(&self.rule),
            values,
        })
    }
}

impl From<&BlobVector> for DefBlobVector {
    fn from(v: &BlobVector) -> Self {
        Self {
            device: v.device.clone(),
            name: v.name.clone(),
            label: v.label.clone(),
            group: v.group.clone(),
            perm: v.permission.map(|p| p.as_str().to_string()).unwrap_or_default(),
            items: v
                .values
                .iter()
                .map(|b| DefBlob {
                    label: b.label.clone(),
                    name: b.name.clone(),
                    format: b.format.clone(),
                    value: BASE64.encode(&b.value),
                })
                .collect(),
        }
    }
}

impl DefBlobVector {
    pub fn into_vector(self) -> Result<BlobVector, WireError> {
        let values = self
            .items
            .into_iter()
            .map(|b| {
                let payload = blob_field(&b.name, &b.value)?;
                let size = payload.len();
                Ok(Blob::new(b.name, b.label, b.format, payload, size))
            })
            .collect::<Result<Vec<_>, WireError>>()?;
        Ok(Vector {
            device: self.device,
            name: self.name,
            label: self.label,
            group: self.group,
            permission: permission_attr(&self.perm),
            rule: None,
            values,
        })
    }
}

impl NewNumberVector {
    pub fn into_vector(self) -> Result<NumberVector, WireError> {
        let values = self
            .items
            .into_iter()
            .map(|i| {
                let value = number_field(&i.name, &i.value)?;
                Ok(Number::new(i.name, "", "", 0.0, 0.0, 0.0, value))
            })
            .collect::<Result<Vec<_>, WireError>>()?;
        Ok(Vector::new(self.device, self.name, values))
    }
}

impl NewTextVector {
    pub fn into_vector(self) -> TextVector {
        let values = self
            .items
            .into_iter()
            .map(|i| Text::new(i.name, "", i.value))
            .collect();
        Vector::new(self.device, self.name, values)
    }
}

impl NewSwitchVector {
    pub fn into_vector(self) -> Result<SwitchVector, WireError> {
        let values = self
            .items
            .into_iter()
            .map(|i| Ok(Switch::new(i.name.clone(), "", switch_field(&i.name, &i.value)?)))
            .collect::<Result<Vec<_>, WireError>>()?;
        Ok(Vector::new(self.device, self.name, values))
    }
}

impl NewBlobVector {
    pub fn into_vector(self) -> Result<BlobVector, WireError> {
        let values = self
            .items
            .into_iter()
            .map(|i| {
                let payload = blob_field(&i.name, &i.value)?;
                let size = i.size.trim().parse().unwrap_or(payload.len());
                Ok(Blob::new(i.name, "", i.format, payload, size))
            })
            .collect::<Result<Vec<_>, WireError>>()?;
        Ok(Vector::new(self.device, self.name, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_name() {
        assert_eq!(root_name("<getProperties version='1.7'/>").unwrap(), "getProperties");
        assert_eq!(
            root_name("<?xml version='1.0'?>\n<defTextVector device='D'></defTextVector>").unwrap(),
            "defTextVector"
        );
        assert!(root_name("   ").is_err());
    }

    #[test]
    fn test_decode_def_switch_vector() {
        let xml = r#"<defSwitchVector device="CCD Simulator" name="CONNECTION" label="Connection" group="Main Control" rule="OneOfMany" perm="rw">
    <defSwitch label="Connect" name="CONNECT">On</defSwitch>
    <defSwitch label="Disconnect" name="DISCONNECT">Off</defSwitch>
</defSwitchVector>"#;

        match decode(xml).unwrap() {
            InboundEvent::NewSwitch { device, vector } => {
                assert_eq!(device, "CCD Simulator");
                assert_eq!(vector.name, "CONNECTION");
                assert_eq!(vector.rule, Some(SwitchRule::OneOfMany));
                assert_eq!(vector.permission, Some(Permission::ReadWrite));
                assert_eq!(vector.values.len(), 2);
                assert!(vector.values[0].value);
                assert!(!vector.values[1].value);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_set_number_vector_sexagesimal() {
        let xml = r#"<setNumberVector device="Mount" name="EQUATORIAL_EOD_COORD" state="Ok">
    <oneNumber name="RA">5:30:00</oneNumber>
    <oneNumber name="DEC">-12.25</oneNumber>
</setNumberVector>"#;

        match decode(xml).unwrap() {
            InboundEvent::NewNumber { vector, .. } => {
                assert_eq!(vector.values[0].value, 5.5);
                assert_eq!(vector.values[1].value, -12.25);
                assert!(vector.label.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_blob_payload() {
        let xml = r#"<setBLOBVector device="CCD" name="CCD1"><oneBLOB name="IMAGE" format=".fits" size="3">AQID</oneBLOB></setBLOBVector>"#;
        match decode(xml).unwrap() {
            InboundEvent::NewBlob { vector, .. } => {
                assert_eq!(vector.values[0].value, vec![1, 2, 3]);
                assert_eq!(vector.values[0].size, 3);
                assert_eq!(vector.values[0].format, ".fits");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_message_and_delete() {
        let msg = r#"<message device="Focuser" timestamp="2024-03-01T21:15:00" message="Focuser is moving"/>"#;
        match decode(msg).unwrap() {
            InboundEvent::Message { device, text, timestamp } => {
                assert_eq!(device, "Focuser");
                assert_eq!(text, "Focuser is moving");
                assert!(timestamp.is_some());
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let del = r#"<delProperty device="Focuser" name="FOCUS_SPEED"/>"#;
        match decode(del).unwrap() {
            InboundEvent::DelProperty { device, name } => {
                assert_eq!(device, "Focuser");
                assert_eq!(name, "FOCUS_SPEED");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            decode(r#"<pingRequest uid="1"/>"#),
            Err(WireError::UnsupportedElement(_))
        ));
        assert!(matches!(
            decode(r#"<setNumberVector device="D" name="V"><oneNumber name="A">fast</oneNumber></setNumberVector>"#),
            Err(WireError::InvalidNumber { .. })
        ));
        assert!(matches!(
            decode(r#"<setSwitchVector device="D" name="V"><oneSwitch name="A">Maybe</oneSwitch></setSwitchVector>"#),
            Err(WireError::InvalidSwitch { .. })
        ));
    }

    #[test]
    fn test_decode_text_keeps_surrounding_whitespace() {
        let xml = r#"<setTextVector device="D" name="V"><oneText name="A">  padded  </oneText><oneText name="B"/><oneText name="C"> a &amp; b</oneText></setTextVector>"#;
        match decode(xml).unwrap() {
            InboundEvent::NewText { vector, .. } => {
                assert_eq!(vector.values[0].value, "  padded  ");
                assert_eq!(vector.values[1].value, "");
                assert_eq!(vector.values[2].value, " a & b");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-03-01T21:15:00.123").is_some());
        assert!(parse_timestamp("2024-03-01T21:15:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
