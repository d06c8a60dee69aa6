//! Events delivered by the transport and notifications raised by a device

use chrono::{DateTime, Utc};

use crate::value::PropertyKind;
use crate::vector::{BlobVector, NumberVector, SwitchVector, TextVector};

/// Change notification produced by the transport's parser
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    NewText { device: String, vector: TextVector },
    NewNumber { device: String, vector: NumberVector },
    NewSwitch { device: String, vector: SwitchVector },
    NewBlob { device: String, vector: BlobVector },
    DelProperty { device: String, name: String },
    /// Informational text from the driver
    Message {
        device: String,
        text: String,
        timestamp: Option<DateTime<Utc>>,
    },
}

impl InboundEvent {
    /// Device the event is scoped to
    pub fn device(&self) -> &str {
        match self {
            Self::NewText { device, .. }
            | Self::NewNumber { device, .. }
            | Self::NewSwitch { device, .. }
            | Self::NewBlob { device, .. }
            | Self::DelProperty { device, .. }
            | Self::Message { device, .. } => device,
        }
    }

    /// Kind of the vector carried, if any
    pub fn kind(&self) -> Option<PropertyKind> {
        match self {
            Self::NewText { .. } => Some(PropertyKind::Text),
            Self::NewNumber { .. } => Some(PropertyKind::Number),
            Self::NewSwitch { .. } => Some(PropertyKind::Switch),
            Self::NewBlob { .. } => Some(PropertyKind::Blob),
            Self::DelProperty { .. } | Self::Message { .. } => None,
        }
    }
}

/// Notification raised to subscribers of a device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceNotification {
    /// The CONNECTION vector reported a different state
    ConnectionChanged { device: String, connected: bool },
    /// A vector event for this device was routed
    PropertyUpdated {
        device: String,
        kind: PropertyKind,
        name: String,
        /// Label of the matching entry in the device's role profile
        standard: Option<String>,
    },
    PropertyDeleted { device: String, name: String },
    Message { device: String, text: String },
}
