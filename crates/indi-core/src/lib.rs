//! INDI Core - Property vectors, device state, and protocol codec
//!
//! This crate provides the client-side model of an INDI device:
//! - Typed property values and vectors with permission and switch rules
//! - A per-device property store fed by transport events
//! - Switch-rule enforcement for single-switch updates
//! - Rendering of outbound protocol elements and decoding of inbound ones
//! - Data-driven property profiles for standard device roles, with focuser,
//!   telescope and detector accessors over them

pub mod codec;
pub mod detector;
pub mod device;
pub mod event;
pub mod focuser;
pub mod format;
pub mod profile;
pub mod publish;
pub mod rules;
pub mod store;
pub mod telescope;
pub mod value;
pub mod vector;
pub mod wire;

pub use detector::{CaptureRange, DetectorExt};
pub use device::{Device, DeviceMode, PropertyError, VectorValues};
pub use event::{DeviceNotification, InboundEvent};
pub use focuser::{FocusDirection, FocuserExt};
pub use profile::{DeviceRole, Profile, ProfileError};
pub use publish::{NullPublisher, Publisher, RecordingPublisher};
pub use store::PropertyStore;
pub use telescope::{CoordSet, Direction, SlewRate, TelescopeExt, TelescopeInfo, TrackRate};
pub use value::{Blob, Number, PropertyKind, PropertyValue, Switch, Text};
pub use vector::{
    AnyVector, BlobVector, NumberVector, Permission, SwitchRule, SwitchVector, TextVector, Vector,
};
pub use wire::WireError;
