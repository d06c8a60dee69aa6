//! Property vectors: named, typed, ordered collections of values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value::{Blob, Number, PropertyKind, PropertyValue, Switch, Text};

/// Access permission of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "ro")]
    ReadOnly,
    #[serde(rename = "wo")]
    WriteOnly,
    #[serde(rename = "rw")]
    ReadWrite,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "ro",
            Self::WriteOnly => "wo",
            Self::ReadWrite => "rw",
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ro" => Ok(Self::ReadOnly),
            "wo" => Ok(Self::WriteOnly),
            "rw" => Ok(Self::ReadWrite),
            other => Err(format!("unknown permission: {other}")),
        }
    }
}

/// Selection constraint of a switch vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchRule {
    /// Exactly one switch on
    OneOfMany,
    /// Zero or one switch on
    AtMostOne,
    /// Unconstrained
    AnyOfMany,
}

impl SwitchRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneOfMany => "OneOfMany",
            Self::AtMostOne => "AtMostOne",
            Self::AnyOfMany => "AnyOfMany",
        }
    }
}

impl fmt::Display for SwitchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oneofmany" => Ok(Self::OneOfMany),
            "atmostone" => Ok(Self::AtMostOne),
            "anyofmany" => Ok(Self::AnyOfMany),
            other => Err(format!("unknown switch rule: {other}")),
        }
    }
}

/// A named vector of values owned by one device
///
/// `(device, name)` identifies a vector within its kind; a number vector and
/// a switch vector may share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector<V> {
    pub device: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub permission: Option<Permission>,
    /// Only meaningful for switch vectors
    #[serde(default)]
    pub rule: Option<SwitchRule>,
    pub values: Vec<V>,
}

pub type SwitchVector = Vector<Switch>;
pub type NumberVector = Vector<Number>;
pub type TextVector = Vector<Text>;
pub type BlobVector = Vector<Blob>;

impl<V: PropertyValue> Vector<V> {
    /// Create a vector with empty label/group and no permission or rule
    pub fn new(device: impl Into<String>, name: impl Into<String>, values: Vec<V>) -> Self {
        Self {
            device: device.into(),
            name: name.into(),
            label: String::new(),
            group: String::new(),
            permission: None,
            rule: None,
            values,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    pub fn with_rule(mut self, rule: SwitchRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn kind(&self) -> PropertyKind {
        V::KIND
    }

    /// Look up a value by name
    pub fn value(&self, name: &str) -> Option<&V> {
        self.values.iter().find(|v| v.name() == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.values.iter().position(|v| v.name() == name)
    }

    /// Merge an incoming vector into this one
    ///
    /// Non-empty metadata of `other` overwrites ours; the value list is
    /// replaced wholesale.
    pub fn merge(&mut self, other: Vector<V>) {
        if !other.device.is_empty() {
            self.device = other.device;
        }
        if !other.name.is_empty() {
            self.name = other.name;
        }
        if !other.label.is_empty() {
            self.label = other.label;
        }
        if !other.group.is_empty() {
            self.group = other.group;
        }
        if other.permission.is_some() {
            self.permission = other.permission;
        }
        if other.rule.is_some() {
            self.rule = other.rule;
        }
        self.values = other.values;
    }
}

impl Vector<Switch> {
    /// Index of the first switch that is on, `None` when all are off
    pub fn selected_index(&self) -> Option<usize> {
        self.values.iter().position(|s| s.value)
    }

    pub fn selected(&self) -> Option<&Switch> {
        self.selected_index().and_then(|i| self.values.get(i))
    }

    /// Number of switches currently on
    pub fn on_count(&self) -> usize {
        self.values.iter().filter(|s| s.value).count()
    }
}

/// A vector of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyVector {
    Text(TextVector),
    Number(NumberVector),
    Switch(SwitchVector),
    Blob(BlobVector),
}

impl AnyVector {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Text(_) => PropertyKind::Text,
            Self::Number(_) => PropertyKind::Number,
            Self::Switch(_) => PropertyKind::Switch,
            Self::Blob(_) => PropertyKind::Blob,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text(v) => &v.name,
            Self::Number(v) => &v.name,
            Self::Switch(v) => &v.name,
            Self::Blob(v) => &v.name,
        }
    }

    pub fn group(&self) -> &str {
        match self {
            Self::Text(v) => &v.group,
            Self::Number(v) => &v.group,
            Self::Switch(v) => &v.group,
            Self::Blob(v) => &v.group,
        }
    }
}

impl From<TextVector> for AnyVector {
    fn from(v: TextVector) -> Self {
        Self::Text(v)
    }
}

impl From<NumberVector> for AnyVector {
    fn from(v: NumberVector) -> Self {
        Self::Number(v)
    }
}

impl From<SwitchVector> for AnyVector {
    fn from(v: SwitchVector) -> Self {
        Self::Switch(v)
    }
}

impl From<BlobVector> for AnyVector {
    fn from(v: BlobVector) -> Self {
        Self::Blob(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(inward: bool, outward: bool) -> SwitchVector {
        Vector::new(
            "Focuser",
            "FOCUS_MOTION",
            vec![
                Switch::new("FOCUS_INWARD", "Focus inward", inward),
                Switch::new("FOCUS_OUTWARD", "Focus outward", outward),
            ],
        )
        .with_label("Move focuser")
        .with_group("Motion Control")
        .with_permission(Permission::ReadWrite)
        .with_rule(SwitchRule::OneOfMany)
    }

    #[test]
    fn test_selected_index() {
        assert_eq!(motion(true, false).selected_index(), Some(0));
        assert_eq!(motion(false, true).selected_index(), Some(1));
        assert_eq!(motion(true, true).selected_index(), Some(0));
    }

    #[test]
    fn test_selected_index_none_when_all_off() {
        let v = motion(false, false);
        assert_eq!(v.selected_index(), None);
        assert!(v.selected().is_none());

        let empty: SwitchVector = Vector::new("Focuser", "EMPTY", Vec::new());
        assert_eq!(empty.selected_index(), None);
    }

    #[test]
    fn test_merge_keeps_metadata_when_incoming_is_empty() {
        let mut existing = motion(true, false);
        let incoming = Vector::new(
            "",
            "FOCUS_MOTION",
            vec![Switch::new("FOCUS_INWARD", "", false)],
        );
        existing.merge(incoming);

        assert_eq!(existing.device, "Focuser");
        assert_eq!(existing.label, "Move focuser");
        assert_eq!(existing.group, "Motion Control");
        assert_eq!(existing.permission, Some(Permission::ReadWrite));
        assert_eq!(existing.rule, Some(SwitchRule::OneOfMany));
        // Values are replaced, not merged
        assert_eq!(existing.values.len(), 1);
        assert!(!existing.values[0].value);
    }

    #[test]
    fn test_merge_overwrites_non_empty_fields() {
        let mut existing = motion(true, false);
        let incoming = motion(false, true)
            .with_label("Direction")
            .with_permission(Permission::ReadOnly);
        existing.merge(incoming);

        assert_eq!(existing.label, "Direction");
        assert_eq!(existing.permission, Some(Permission::ReadOnly));
        assert_eq!(existing.selected_index(), Some(1));
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        let mut v = motion(true, false);
        let before = v.clone();
        v.merge(before.clone());
        assert_eq!(v, before);
    }

    #[test]
    fn test_rule_and_permission_parsing() {
        assert_eq!("oneofmany".parse::<SwitchRule>().unwrap(), SwitchRule::OneOfMany);
        assert_eq!("AtMostOne".parse::<SwitchRule>().unwrap(), SwitchRule::AtMostOne);
        assert!("Main Control".parse::<SwitchRule>().is_err());
        assert_eq!("ro".parse::<Permission>().unwrap(), Permission::ReadOnly);
        assert!(!Permission::ReadOnly.is_writable());
        assert!("r".parse::<Permission>().is_err());
    }
}
