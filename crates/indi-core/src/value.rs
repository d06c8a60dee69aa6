//! Single named property values (switch, number, text, blob)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four property kinds of the INDI protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Text,
    Number,
    Switch,
    Blob,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 4] = [
        PropertyKind::Text,
        PropertyKind::Number,
        PropertyKind::Switch,
        PropertyKind::Blob,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Switch => "switch",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "switch" => Ok(Self::Switch),
            "blob" => Ok(Self::Blob),
            other => Err(format!("unknown property kind: {other}")),
        }
    }
}

/// Common behavior of the values held by a vector
pub trait PropertyValue: Clone + fmt::Debug + PartialEq {
    /// Kind of vector this value lives in
    const KIND: PropertyKind;

    fn name(&self) -> &str;

    fn label(&self) -> &str;
}

/// A single on/off switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: bool,
}

impl Switch {
    pub fn new(name: impl Into<String>, label: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value,
        }
    }
}

/// A numeric value with display and range metadata
///
/// `value` is not clamped to `[min, max]`; drivers are free to report
/// out-of-range readings and callers may request them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Number {
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// printf-style display hint (e.g. `%5.2f`)
    #[serde(default = "default_number_format")]
    pub format: String,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub step: f64,
    #[serde(default)]
    pub value: f64,
}

fn default_number_format() -> String {
    "%g".to_string()
}

impl Number {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        format: impl Into<String>,
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            format: format.into(),
            min,
            max,
            step,
            value,
        }
    }

    /// Whether the current value lies inside the declared range
    pub fn in_range(&self) -> bool {
        self.value >= self.min && self.value <= self.max
    }
}

/// A free-form text value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl Text {
    pub fn new(name: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A binary payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// File-extension-like tag (e.g. `.fits`)
    #[serde(default)]
    pub format: String,
    /// Declared length, tracked separately from `value.len()`
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub value: Vec<u8>,
}

impl Blob {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        format: impl Into<String>,
        value: Vec<u8>,
        size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            format: format.into(),
            size,
            value,
        }
    }
}

macro_rules! impl_property_value {
    ($ty:ty, $kind:expr) => {
        impl PropertyValue for $ty {
            const KIND: PropertyKind = $kind;

            fn name(&self) -> &str {
                &self.name
            }

            fn label(&self) -> &str {
                &self.label
            }
        }
    };
}

impl_property_value!(Switch, PropertyKind::Switch);
impl_property_value!(Number, PropertyKind::Number);
impl_property_value!(Text, PropertyKind::Text);
impl_property_value!(Blob, PropertyKind::Blob);
