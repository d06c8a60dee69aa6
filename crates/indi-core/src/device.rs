//! A device: its property store, inbound event routing, and outbound requests
//!
//! Inbound events from the transport are filtered by device name and applied
//! to the store. Outbound operations validate against the store, update the
//! stored values, render one message and hand it to the [`Publisher`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::codec;
use crate::event::{DeviceNotification, InboundEvent};
use crate::profile::{DeviceRole, Profile, ProfileError, CONNECT, CONNECTION, DISCONNECT};
use crate::publish::Publisher;
use crate::rules::{apply_states, states_for_index, states_for_switch};
use crate::store::{PropertyStore, Stored};
use crate::value::{Blob, Number, PropertyKind, Switch, Text};
use crate::vector::Vector;
use crate::wire::WireError;

#[derive(Error, Debug)]
pub enum PropertyError {
    #[error("Unknown {kind} vector: {name}")]
    UnknownVector { kind: PropertyKind, name: String },
    #[error("Unknown value {name} in vector {vector}")]
    UnknownValue { vector: String, name: String },
    #[error("Vector {name} holds {expected} values, got {actual}")]
    ValueCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Index {index} out of range for vector {name} with {len} values")]
    IndexOutOfRange { name: String, index: usize, len: usize },
    #[error("Vector {name} is read-only")]
    ReadOnly { name: String },
    #[error("Failed to encode message: {0}")]
    Encode(#[from] WireError),
}

/// Failures while turning a routed event into a notification
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("{0} event carries a vector without a name")]
    EmptyName(PropertyKind),
    #[error("CONNECTION vector carries no values")]
    EmptyConnection,
}

/// Which side of the protocol this device instance plays
///
/// A `Client` instance re-announces a vector (`def*Vector`) after sending
/// new number, text or indexed switch values for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    #[default]
    Client,
    Driver,
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::Driver => f.write_str("driver"),
        }
    }
}

/// New values for a whole vector, by kind
#[derive(Debug, Clone, PartialEq)]
pub enum VectorValues {
    Blobs(Vec<Vec<u8>>),
    Switches(Vec<bool>),
    Texts(Vec<String>),
    Numbers(Vec<f64>),
}

/// A single named device and the local mirror of its properties
pub struct Device {
    name: String,
    mode: DeviceMode,
    role: DeviceRole,
    profile: Profile,
    store: PropertyStore,
    connected: bool,
    publisher: Box<dyn Publisher>,
    notifications: broadcast::Sender<DeviceNotification>,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("role", &self.role)
            .field("connected", &self.connected)
            .field("vectors", &self.store.len())
            .finish()
    }
}

impl Device {
    /// Create a device with an empty store
    pub fn new(name: impl Into<String>, mode: DeviceMode, publisher: impl Publisher + 'static) -> Self {
        let (notifications, _) = broadcast::channel(100);
        Self {
            name: name.into(),
            mode,
            role: DeviceRole::Generic,
            profile: Profile::builtin(DeviceRole::Generic),
            store: PropertyStore::new(),
            connected: false,
            publisher: Box::new(publisher),
            notifications,
        }
    }

    /// Set the device role and apply its profile to the store
    ///
    /// `extra` declarations are applied after the built-in table for the role.
    pub fn with_profile(mut self, role: DeviceRole, extra: Option<Profile>) -> Result<Self, ProfileError> {
        let mut profile = Profile::builtin(role);
        if let Some(extra) = extra {
            profile.extend(extra);
        }
        for vector in profile.vectors_for(&self.name)? {
            self.store.add_any(vector);
        }
        info!(
            device = %self.name,
            role = %role,
            vectors = self.store.len(),
            "Applied device profile"
        );
        self.role = role;
        self.profile = profile;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    pub fn role(&self) -> DeviceRole {
        self.role
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Last connection state reported through the CONNECTION vector
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Subscribe to device notifications
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceNotification> {
        self.notifications.subscribe()
    }

    /// Insert or merge a vector into this device's store
    pub fn add_or_merge<V: Stored>(&mut self, vector: Vector<V>) {
        self.store.add_or_merge(vector);
    }

    /// Remove a vector from this device's store
    pub fn delete(&mut self, name: &str) -> Vec<PropertyKind> {
        self.store.delete(name)
    }

    fn notify(&self, notification: DeviceNotification) {
        // No receivers is fine
        let _ = self.notifications.send(notification);
    }

    fn publish(&self, message: &str) {
        self.publisher.publish(message);
    }

    // ── Inbound ──

    /// Apply an event from the transport
    ///
    /// Events for other devices are ignored. A vector name not yet known is
    /// added on first sight; known vectors are left as they are.
    pub fn handle(&mut self, event: InboundEvent) {
        if event.device() != self.name {
            return;
        }
        debug!(device = %self.name, kind = ?event.kind(), "Routing event");
        let result = match event {
            InboundEvent::NewText { vector, .. } => self.route_vector(vector),
            InboundEvent::NewNumber { vector, .. } => self.route_vector(vector),
            InboundEvent::NewBlob { vector, .. } => self.route_vector(vector),
            InboundEvent::NewSwitch { vector, .. } => self.route_switch(vector),
            InboundEvent::DelProperty { name, .. } => {
                let removed = self.store.delete(&name);
                if removed.is_empty() {
                    debug!(device = %self.name, vector = %name, "Delete for unknown vector");
                } else {
                    self.notify(DeviceNotification::PropertyDeleted {
                        device: self.name.clone(),
                        name,
                    });
                }
                Ok(())
            }
            InboundEvent::Message { text, .. } => {
                info!(device = %self.name, "{}", text);
                self.notify(DeviceNotification::Message {
                    device: self.name.clone(),
                    text,
                });
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(device = %self.name, error = %e, "Failed to route event");
        }
    }

    fn route_vector<V: Stored>(&mut self, vector: Vector<V>) -> Result<(), RouteError> {
        if vector.name.is_empty() {
            return Err(RouteError::EmptyName(V::KIND));
        }
        let name = vector.name.clone();
        self.store.insert_if_absent(vector);
        self.notify(self.updated(V::KIND, name));
        Ok(())
    }

    fn route_switch(&mut self, vector: Vector<Switch>) -> Result<(), RouteError> {
        if vector.name.is_empty() {
            return Err(RouteError::EmptyName(PropertyKind::Switch));
        }
        let reported = if vector.name == CONNECTION {
            Some(vector.values.first().map(|s| s.value))
        } else {
            None
        };
        let name = vector.name.clone();
        self.store.insert_if_absent(vector);

        if let Some(reported) = reported {
            let reported = reported.ok_or(RouteError::EmptyConnection)?;
            if reported != self.connected {
                self.connected = reported;
                info!(device = %self.name, connected = reported, "Connection state changed");
                self.notify(DeviceNotification::ConnectionChanged {
                    device: self.name.clone(),
                    connected: reported,
                });
            }
        }

        self.notify(self.updated(PropertyKind::Switch, name));
        Ok(())
    }

    fn updated(&self, kind: PropertyKind, name: String) -> DeviceNotification {
        let standard = self.profile.lookup(kind, &name).map(|p| p.label.clone());
        DeviceNotification::PropertyUpdated {
            device: self.name.clone(),
            kind,
            name,
            standard,
        }
    }

    // ── Outbound ──

    fn require<V: Stored>(&self, name: &str) -> Result<&Vector<V>, PropertyError> {
        self.store
            .vector::<V>(name)
            .ok_or_else(|| PropertyError::UnknownVector {
                kind: V::KIND,
                name: name.to_string(),
            })
    }

    fn require_len<V: Stored>(&self, name: &str, actual: usize) -> Result<&Vector<V>, PropertyError> {
        let vector = self.require::<V>(name)?;
        if vector.values.len() != actual {
            return Err(PropertyError::ValueCountMismatch {
                name: name.to_string(),
                expected: vector.values.len(),
                actual,
            });
        }
        Ok(vector)
    }

    fn require_value<V: Stored>(&self, vector: &str, value: &str) -> Result<usize, PropertyError> {
        self.require::<V>(vector)?
            .position(value)
            .ok_or_else(|| PropertyError::UnknownValue {
                vector: vector.to_string(),
                name: value.to_string(),
            })
    }

    fn stored_mut<V: Stored>(&mut self, name: &str) -> Result<&mut Vector<V>, PropertyError> {
        self.store
            .vector_mut::<V>(name)
            .ok_or_else(|| PropertyError::UnknownVector {
                kind: V::KIND,
                name: name.to_string(),
            })
    }

    /// `getProperties` for one vector, or all when `name` is empty
    pub fn query_properties(&self, name: &str) -> Result<String, PropertyError> {
        let message = codec::get_properties(&self.name, name)?;
        self.publish(&message);
        Ok(message)
    }

    /// `enableBLOB` with `Also` or `Never`
    pub fn enable_blob(&self, enable: bool) -> Result<String, PropertyError> {
        let message = codec::enable_blob(&self.name, enable)?;
        self.publish(&message);
        Ok(message)
    }

    /// Send new values for a whole number vector
    pub fn set_number_vector(&mut self, name: &str, values: &[f64]) -> Result<String, PropertyError> {
        let mut updated = self.require_len::<Number>(name, values.len())?.values.clone();
        for (number, value) in updated.iter_mut().zip(values) {
            number.value = *value;
            if !number.in_range() {
                debug!(
                    device = %self.name,
                    vector = %name,
                    value = %number.name,
                    "Number outside declared range"
                );
            }
        }
        let message = codec::new_number_vector(&self.name, name, &updated)?;
        self.stored_mut::<Number>(name)?.values = updated;
        self.publish(&message);
        if self.mode == DeviceMode::Client {
            self.define_numbers(name)?;
        }
        Ok(message)
    }

    /// Send new values for a whole text vector
    pub fn set_text_vector<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> Result<String, PropertyError> {
        let mut updated = self.require_len::<Text>(name, values.len())?.values.clone();
        for (text, value) in updated.iter_mut().zip(values) {
            text.value = value.as_ref().to_string();
        }
        let message = codec::new_text_vector(&self.name, name, &updated)?;
        self.stored_mut::<Text>(name)?.values = updated;
        self.publish(&message);
        if self.mode == DeviceMode::Client {
            self.define_texts(name)?;
        }
        Ok(message)
    }

    /// Send new states for a whole switch vector
    ///
    /// Unlike the indexed form this never re-announces the vector.
    pub fn set_switch_vector(&mut self, name: &str, states: &[bool]) -> Result<String, PropertyError> {
        let mut updated = self.require_len::<Switch>(name, states.len())?.values.clone();
        apply_states(&mut updated, states);
        let message = codec::new_switch_vector(&self.name, name, &updated)?;
        self.stored_mut::<Switch>(name)?.values = updated;
        self.publish(&message);
        Ok(message)
    }

    /// Turn on exactly the switch at `index` and off all others, regardless of rule
    pub fn set_switch_index(&mut self, name: &str, index: usize) -> Result<String, PropertyError> {
        let len = self.require::<Switch>(name)?.values.len();
        if index >= len {
            return Err(PropertyError::IndexOutOfRange {
                name: name.to_string(),
                index,
                len,
            });
        }
        let mut updated = self.require::<Switch>(name)?.values.clone();
        apply_states(&mut updated, &states_for_index(len, index));
        let message = codec::new_switch_vector(&self.name, name, &updated)?;
        self.stored_mut::<Switch>(name)?.values = updated;
        self.publish(&message);
        if self.mode == DeviceMode::Client {
            self.define_switches(name)?;
        }
        Ok(message)
    }

    /// Send new payloads for a whole blob vector
    pub fn set_blob_vector<B: AsRef<[u8]>>(&mut self, name: &str, payloads: &[B]) -> Result<String, PropertyError> {
        let mut updated = self.require_len::<Blob>(name, payloads.len())?.values.clone();
        for (blob, payload) in updated.iter_mut().zip(payloads) {
            blob.value = payload.as_ref().to_vec();
        }
        let message = codec::new_blob_vector(&self.name, name, &updated)?;
        self.stored_mut::<Blob>(name)?.values = updated;
        self.publish(&message);
        Ok(message)
    }

    /// Set one switch, applying the vector's rule to its siblings
    pub fn set_switch(&mut self, vector: &str, value: &str, on: bool) -> Result<String, PropertyError> {
        self.require_value::<Switch>(vector, value)?;
        let states = states_for_switch(self.require::<Switch>(vector)?, value, on);
        self.set_switch_vector(vector, &states)
    }

    /// Set one number, keeping the others
    pub fn set_number(&mut self, vector: &str, value: &str, x: f64) -> Result<String, PropertyError> {
        let index = self.require_value::<Number>(vector, value)?;
        let mut values: Vec<f64> = self.require::<Number>(vector)?.values.iter().map(|n| n.value).collect();
        values[index] = x;
        self.set_number_vector(vector, &values)
    }

    /// Set one text, keeping the others
    pub fn set_text(&mut self, vector: &str, value: &str, text: &str) -> Result<String, PropertyError> {
        let index = self.require_value::<Text>(vector, value)?;
        let mut values: Vec<String> = self.require::<Text>(vector)?.values.iter().map(|t| t.value.clone()).collect();
        values[index] = text.to_string();
        self.set_text_vector(vector, &values)
    }

    /// Set one blob payload, keeping the others
    pub fn set_blob(&mut self, vector: &str, value: &str, payload: &[u8]) -> Result<String, PropertyError> {
        let index = self.require_value::<Blob>(vector, value)?;
        let mut payloads: Vec<Vec<u8>> = self.require::<Blob>(vector)?.values.iter().map(|b| b.value.clone()).collect();
        payloads[index] = payload.to_vec();
        self.set_blob_vector(vector, &payloads)
    }

    /// Dispatch to the array setter for the kind of `values`
    pub fn set_vector(&mut self, name: &str, values: VectorValues) -> Result<String, PropertyError> {
        match values {
            VectorValues::Blobs(v) => self.set_blob_vector(name, &v),
            VectorValues::Switches(v) => self.set_switch_vector(name, &v),
            VectorValues::Texts(v) => self.set_text_vector(name, &v),
            VectorValues::Numbers(v) => self.set_number_vector(name, &v),
        }
    }

    /// Ask the driver to connect
    pub fn connect(&mut self) -> Result<String, PropertyError> {
        self.set_switch(CONNECTION, CONNECT, true)
    }

    /// Ask the driver to disconnect
    pub fn disconnect(&mut self) -> Result<String, PropertyError> {
        self.set_switch(CONNECTION, DISCONNECT, true)
    }

    // ── Definitions ──

    fn render_defs<V: Stored>(
        &self,
        name: &str,
        render: fn(&Vector<V>) -> Result<String, WireError>,
    ) -> Result<String, PropertyError> {
        let mut out = String::new();
        for vector in self.store.vectors::<V>() {
            if name.is_empty() || vector.name == name {
                out.push_str(&render(vector)?);
            }
        }
        Ok(out)
    }

    fn announce(&self, message: String) -> String {
        if !message.is_empty() {
            self.publish(&message);
        }
        message
    }

    /// `defNumberVector` for each matching vector (all when `name` is empty)
    pub fn define_numbers(&self, name: &str) -> Result<String, PropertyError> {
        Ok(self.announce(self.render_defs::<Number>(name, codec::def_number_vector)?))
    }

    pub fn define_texts(&self, name: &str) -> Result<String, PropertyError> {
        Ok(self.announce(self.render_defs::<Text>(name, codec::def_text_vector)?))
    }

    pub fn define_switches(&self, name: &str) -> Result<String, PropertyError> {
        Ok(self.announce(self.render_defs::<Switch>(name, codec::def_switch_vector)?))
    }

    pub fn define_blobs(&self, name: &str) -> Result<String, PropertyError> {
        Ok(self.announce(self.render_defs::<Blob>(name, codec::def_blob_vector)?))
    }

    /// Numbers, switches, texts, then blobs, concatenated into one message
    pub fn define_properties(&self, name: &str) -> Result<String, PropertyError> {
        let mut out = self.render_defs::<Number>(name, codec::def_number_vector)?;
        out.push_str(&self.render_defs::<Switch>(name, codec::def_switch_vector)?);
        out.push_str(&self.render_defs::<Text>(name, codec::def_text_vector)?);
        out.push_str(&self.render_defs::<Blob>(name, codec::def_blob_vector)?);
        Ok(self.announce(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::{NullPublisher, RecordingPublisher};
    use crate::rules::satisfies;
    use crate::vector::{NumberVector, Permission, SwitchRule, SwitchVector};
    use crate::wire::decode;

    fn numbers() -> NumberVector {
        Vector::new(
            "D",
            "V",
            vec![
                Number::new("A", "Alpha", "%g", 0.0, 10.0, 0.5, 0.0),
                Number::new("B", "Beta", "%g", 0.0, 10.0, 0.5, 0.0),
            ],
        )
        .with_label("Values")
        .with_group("Main Control")
        .with_permission(Permission::ReadWrite)
    }

    fn slew_rate() -> SwitchVector {
        Vector::new(
            "D",
            "SLEW",
            vec![
                Switch::new("GUIDE", "Guide", false),
                Switch::new("FIND", "Find", true),
                Switch::new("MAX", "Max", false),
            ],
        )
        .with_group("Motion Control")
        .with_permission(Permission::ReadWrite)
        .with_rule(SwitchRule::OneOfMany)
    }

    fn driver(recorder: &RecordingPublisher) -> Device {
        let mut device = Device::new("D", DeviceMode::Driver, recorder.clone());
        device.add_or_merge(numbers());
        device.add_or_merge(slew_rate());
        device
    }

    fn switch_event(device: &str, name: &str, states: &[bool]) -> InboundEvent {
        InboundEvent::NewSwitch {
            device: device.to_string(),
            vector: Vector::new(
                device,
                name,
                states
                    .iter()
                    .enumerate()
                    .map(|(i, s)| Switch::new(format!("S{i}"), "", *s))
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_query_properties_default() {
        let recorder = RecordingPublisher::new();
        let device = driver(&recorder);
        let message = device.query_properties("").unwrap();
        assert_eq!(message, r#"<getProperties device="D" name="" version="1.7"/>"#);
        assert_eq!(recorder.messages(), vec![message]);
    }

    #[test]
    fn test_set_number_vector_updates_store() {
        let recorder = RecordingPublisher::new();
        let mut device = driver(&recorder);
        let message = device.set_number_vector("V", &[1.5, 2.25]).unwrap();

        assert_eq!(
            message,
            r#"<newNumberVector device="D" name="V"><oneNumber name="A">1.5</oneNumber><oneNumber name="B">2.25</oneNumber></newNumberVector>"#
        );
        let v = device.store().number_vector("V").unwrap();
        assert_eq!(v.values[0].value, 1.5);
        assert_eq!(v.values[1].value, 2.25);
        // Driver mode does not re-announce
        assert_eq!(recorder.messages().len(), 1);
    }

    #[test]
    fn test_client_mode_reannounces() {
        let recorder = RecordingPublisher::new();
        let mut device = Device::new("D", DeviceMode::Client, recorder.clone());
        device.add_or_merge(numbers());
        device.add_or_merge(slew_rate());

        device.set_number_vector("V", &[1.0, 2.0]).unwrap();
        let sent = recorder.take();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].starts_with("<newNumberVector"));
        assert!(sent[1].starts_with("<defNumberVector"));

        device.set_switch_index("SLEW", 2).unwrap();
        let sent = recorder.take();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].starts_with("<defSwitchVector"));

        // Array form never re-announces
        device.set_switch_vector("SLEW", &[true, false, false]).unwrap();
        assert_eq!(recorder.take().len(), 1);
    }

    #[test]
    fn test_setters_reject_unknown_vector_without_mutation() {
        let recorder = RecordingPublisher::new();
        let mut device = driver(&recorder);
        let before = device.store().clone();

        assert!(matches!(
            device.set_number_vector("MISSING", &[1.0]),
            Err(PropertyError::UnknownVector { kind: PropertyKind::Number, .. })
        ));
        assert!(matches!(
            device.set_text_vector("MISSING", &["x"]),
            Err(PropertyError::UnknownVector { .. })
        ));
        assert!(matches!(
            device.set_switch_vector("MISSING", &[true]),
            Err(PropertyError::UnknownVector { .. })
        ));
        assert!(matches!(
            device.set_switch_index("MISSING", 0),
            Err(PropertyError::UnknownVector { .. })
        ));
        assert!(matches!(
            device.set_blob_vector("MISSING", &[vec![1u8]]),
            Err(PropertyError::UnknownVector { .. })
        ));
        assert!(matches!(
            device.set_switch("MISSING", "GUIDE", true),
            Err(PropertyError::UnknownVector { .. })
        ));
        // Name exists, wrong kind
        assert!(matches!(
            device.set_switch_vector("V", &[true, false]),
            Err(PropertyError::UnknownVector { kind: PropertyKind::Switch, .. })
        ));

        assert_eq!(device.store(), &before);
        assert!(recorder.messages().is_empty());
    }

    #[test]
    fn test_value_count_mismatch_leaves_store() {
        let recorder = RecordingPublisher::new();
        let mut device = driver(&recorder);
        let before = device.store().clone();
        assert!(matches!(
            device.set_number_vector("V", &[1.0]),
            Err(PropertyError::ValueCountMismatch { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            device.set_switch_index("SLEW", 3),
            Err(PropertyError::IndexOutOfRange { .. })
        ));
        assert_eq!(device.store(), &before);
    }

    #[test]
    fn test_set_switch_one_of_many_leaves_exactly_one_on() {
        let mut device = driver(&RecordingPublisher::new());
        for name in ["GUIDE", "FIND", "MAX", "FIND", "GUIDE"] {
            device.set_switch("SLEW", name, true).unwrap();
            let v = device.store().switch_vector("SLEW").unwrap();
            assert_eq!(v.on_count(), 1);
            assert_eq!(v.selected().unwrap().name, name);
            let states: Vec<bool> = v.values.iter().map(|s| s.value).collect();
            assert!(satisfies(v.rule, &states));
        }
    }

    #[test]
    fn test_set_switch_off_turns_siblings_on() {
        let mut device = driver(&RecordingPublisher::new());
        let message = device.set_switch("SLEW", "FIND", false).unwrap();
        assert_eq!(
            message,
            r#"<newSwitchVector device="D" name="SLEW"><oneSwitch name="GUIDE">On</oneSwitch><oneSwitch name="FIND">Off</oneSwitch><oneSwitch name="MAX">On</oneSwitch></newSwitchVector>"#
        );
    }

    #[test]
    fn test_set_switch_unknown_value() {
        let mut device = driver(&RecordingPublisher::new());
        assert!(matches!(
            device.set_switch("SLEW", "WARP", true),
            Err(PropertyError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_set_switch_index_ignores_rule() {
        let mut device = driver(&RecordingPublisher::new());
        let mut any = slew_rate();
        any.rule = Some(SwitchRule::AnyOfMany);
        any.values.iter_mut().for_each(|s| s.value = true);
        device.add_or_merge(any);

        device.set_switch_index("SLEW", 0).unwrap();
        let v = device.store().switch_vector("SLEW").unwrap();
        assert_eq!(v.selected_index(), Some(0));
        assert_eq!(v.on_count(), 1);
    }

    #[test]
    fn test_per_value_setters() {
        let mut device = driver(&RecordingPublisher::new());
        device.set_number("V", "B", 7.5).unwrap();
        let v = device.store().number_vector("V").unwrap();
        assert_eq!(v.values[0].value, 0.0);
        assert_eq!(v.values[1].value, 7.5);

        assert!(matches!(
            device.set_number("V", "C", 1.0),
            Err(PropertyError::UnknownValue { .. })
        ));

        device.add_or_merge(Vector::new("D", "PORT", vec![Text::new("PORT", "Port", "/dev/ttyS0")]));
        let message = device.set_text("PORT", "PORT", "/dev/ttyUSB0").unwrap();
        assert!(message.contains("/dev/ttyUSB0"));
        assert_eq!(device.store().value::<Text>("PORT", "PORT").unwrap().value, "/dev/ttyUSB0");
    }

    #[test]
    fn test_set_blob_updates_payload_and_keeps_size() {
        let mut device = driver(&RecordingPublisher::new());
        device.add_or_merge(Vector::new(
            "D",
            "DETECTOR",
            vec![
                Blob::new("CONTINUUM", "", ".fits", vec![0], 1),
                Blob::new("SPECTRUM", "", ".fits", vec![0], 1),
            ],
        ));
        let message = device.set_blob("DETECTOR", "SPECTRUM", &[1, 2, 3]).unwrap();
        assert!(message.contains(r#"<oneBlob name="SPECTRUM" format=".fits" size="4">AQID</oneBlob>"#));
        let blob = device.store().value::<Blob>("DETECTOR", "SPECTRUM").unwrap();
        assert_eq!(blob.value, vec![1, 2, 3]);
        assert_eq!(blob.size, 1);
    }

    #[test]
    fn test_set_vector_dispatch() {
        let mut device = driver(&RecordingPublisher::new());
        let message = device
            .set_vector("SLEW", VectorValues::Switches(vec![false, false, true]))
            .unwrap();
        assert!(message.starts_with("<newSwitchVector"));
        let message = device.set_vector("V", VectorValues::Numbers(vec![3.0, 4.0])).unwrap();
        assert!(message.starts_with("<newNumberVector"));
    }

    #[test]
    fn test_enable_blob() {
        let device = Device::new("CCD", DeviceMode::Client, NullPublisher);
        assert_eq!(
            device.enable_blob(true).unwrap(),
            r#"<enableBLOB device="CCD">Also</enableBLOB>"#
        );
    }

    #[test]
    fn test_define_filters_by_name() {
        let recorder = RecordingPublisher::new();
        let device = driver(&recorder);

        let all = device.define_properties("").unwrap();
        assert!(all.starts_with("<defNumberVector"));
        assert!(all.contains("<defSwitchVector"));

        let one = device.define_numbers("V").unwrap();
        assert!(one.starts_with(r#"<defNumberVector device="D" name="V""#));
        assert!(device.define_numbers("SLEW").unwrap().is_empty());
        assert!(device.define_blobs("").unwrap().is_empty());

        // Empty results are not published
        assert_eq!(recorder.messages().len(), 2);
    }

    #[test]
    fn test_define_concatenates_every_vector() {
        let mut device = Device::new("D", DeviceMode::Driver, NullPublisher);
        device.add_or_merge(Vector::new("D", "B1", vec![Blob::new("X", "", ".bin", vec![1], 1)]));
        device.add_or_merge(Vector::new("D", "B2", vec![Blob::new("Y", "", ".bin", vec![2], 1)]));
        let out = device.define_blobs("").unwrap();
        assert_eq!(out.matches("<defBlobVector").count(), 2);
    }

    #[test]
    fn test_round_trip_define_into_mirror() {
        let source = driver(&RecordingPublisher::new());
        let xml = source.define_numbers("V").unwrap();

        let mut mirror = Device::new("D", DeviceMode::Client, NullPublisher);
        mirror.handle(decode(&xml).unwrap());
        assert_eq!(mirror.store().number_vector("V"), source.store().number_vector("V"));

        // Feeding it back to the source leaves it unchanged
        let mut source = source;
        let before = source.store().clone();
        source.handle(decode(&xml).unwrap());
        assert_eq!(source.store(), &before);
    }

    #[test]
    fn test_events_for_other_devices_are_ignored() {
        let mut device = Device::new("D", DeviceMode::Client, NullPublisher);
        let mut rx = device.subscribe();
        device.handle(switch_event("Other", CONNECTION, &[true, false]));
        device.handle(InboundEvent::DelProperty {
            device: "Other".to_string(),
            name: "V".to_string(),
        });
        assert!(device.store().is_empty());
        assert!(!device.is_connected());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_first_sight_inserts_but_does_not_merge() {
        let mut device = Device::new("D", DeviceMode::Client, NullPublisher);
        device.handle(InboundEvent::NewNumber {
            device: "D".to_string(),
            vector: numbers(),
        });
        let mut changed = numbers();
        changed.values[0].value = 9.0;
        device.handle(InboundEvent::NewNumber {
            device: "D".to_string(),
            vector: changed,
        });
        assert_eq!(device.store().value::<Number>("V", "A").unwrap().value, 0.0);
    }

    #[test]
    fn test_connection_state_transitions() {
        let mut device = Device::new("D", DeviceMode::Client, NullPublisher);
        let mut rx = device.subscribe();

        device.handle(switch_event("D", CONNECTION, &[true, false]));
        assert!(device.is_connected());
        assert_eq!(
            rx.try_recv().unwrap(),
            DeviceNotification::ConnectionChanged {
                device: "D".to_string(),
                connected: true
            }
        );
        assert!(matches!(rx.try_recv().unwrap(), DeviceNotification::PropertyUpdated { .. }));

        // Same state again: no transition
        device.handle(switch_event("D", CONNECTION, &[true, false]));
        assert!(matches!(rx.try_recv().unwrap(), DeviceNotification::PropertyUpdated { .. }));
        assert!(rx.try_recv().is_err());

        device.handle(switch_event("D", CONNECTION, &[false, true]));
        assert!(!device.is_connected());
        assert_eq!(
            rx.try_recv().unwrap(),
            DeviceNotification::ConnectionChanged {
                device: "D".to_string(),
                connected: false
            }
        );
    }

    #[test]
    fn test_malformed_events_do_not_stop_routing() {
        let mut device = Device::new("D", DeviceMode::Client, NullPublisher);
        device.handle(switch_event("D", CONNECTION, &[]));
        device.handle(switch_event("D", "", &[true]));
        assert!(!device.is_connected());

        device.handle(switch_event("D", CONNECTION, &[true]));
        assert!(device.is_connected());
        assert!(device.store().switch_vector(CONNECTION).is_some());
    }

    #[test]
    fn test_delete_and_message_events() {
        let mut device = driver(&RecordingPublisher::new());
        let mut rx = device.subscribe();

        device.handle(InboundEvent::DelProperty {
            device: "D".to_string(),
            name: "V".to_string(),
        });
        assert!(device.store().number_vector("V").is_none());
        assert!(device.store().switch_vector("SLEW").is_some());
        assert!(matches!(rx.try_recv().unwrap(), DeviceNotification::PropertyDeleted { .. }));

        device.handle(InboundEvent::Message {
            device: "D".to_string(),
            text: "Slewing".to_string(),
            timestamp: None,
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            DeviceNotification::Message {
                device: "D".to_string(),
                text: "Slewing".to_string()
            }
        );
        assert_eq!(device.store().len(), 1);
    }

    #[test]
    fn test_profile_applied_and_standard_labels() {
        let mut device = Device::new("Focuser", DeviceMode::Driver, NullPublisher)
            .with_profile(DeviceRole::Focuser, None)
            .unwrap();
        assert_eq!(device.role(), DeviceRole::Focuser);
        assert!(device.store().number_vector("ABS_FOCUS_POSITION").is_some());
        assert!(device.store().groups().contains("Motion Control"));

        let mut rx = device.subscribe();
        device.handle(InboundEvent::NewNumber {
            device: "Focuser".to_string(),
            vector: Vector::new("Focuser", "FOCUS_SPEED", vec![Number::new("FOCUS_SPEED_VALUE", "", "", 0.0, 0.0, 0.0, 3.0)]),
        });
        match rx.try_recv().unwrap() {
            DeviceNotification::PropertyUpdated { standard, name, .. } => {
                assert_eq!(name, "FOCUS_SPEED");
                assert_eq!(standard.as_deref(), Some("Select focus speed"));
            }
            other => panic!("unexpected notification: {:?}", other),
        }
    }

    #[test]
    fn test_profile_override_label_reaches_notifications() {
        let extra = Profile::from_toml(
            r#"
[[vector]]
kind = "number"
name = "FOCUS_SPEED"
label = "Custom speed"
numbers = [{ name = "FOCUS_SPEED_VALUE", value = 3.0 }]
"#,
        )
        .unwrap();
        let mut device = Device::new("Focuser", DeviceMode::Client, NullPublisher)
            .with_profile(DeviceRole::Focuser, Some(extra))
            .unwrap();
        assert_eq!(device.store().number_vector("FOCUS_SPEED").unwrap().label, "Custom speed");

        let mut rx = device.subscribe();
        device.handle(InboundEvent::NewNumber {
            device: "Focuser".to_string(),
            vector: Vector::new("Focuser", "FOCUS_SPEED", vec![Number::new("FOCUS_SPEED_VALUE", "", "", 0.0, 0.0, 0.0, 4.0)]),
        });
        match rx.try_recv().unwrap() {
            DeviceNotification::PropertyUpdated { standard, .. } => {
                assert_eq!(standard.as_deref(), Some("Custom speed"));
            }
            other => panic!("unexpected notification: {:?}", other),
        }
    }

    #[test]
    fn test_number_outside_range_is_sent() {
        let recorder = RecordingPublisher::new();
        let mut device = Device::new("Focuser", DeviceMode::Driver, recorder.clone())
            .with_profile(DeviceRole::Focuser, None)
            .unwrap();
        let message = device.set_number_vector("FOCUS_SPEED", &[5000.0]).unwrap();
        assert!(message.contains(">5000</oneNumber>"));
        let speed = device.store().value::<Number>("FOCUS_SPEED", "FOCUS_SPEED_VALUE").unwrap();
        assert_eq!(speed.value, 5000.0);
        assert!(!speed.in_range());
    }

    #[test]
    fn test_connect_and_disconnect() {
        let recorder = RecordingPublisher::new();
        let mut device = Device::new("Focuser", DeviceMode::Driver, recorder.clone())
            .with_profile(DeviceRole::Generic, None)
            .unwrap();
        let message = device.connect().unwrap();
        assert!(message.contains(r#"<oneSwitch name="CONNECT">On</oneSwitch>"#));
        assert!(message.contains(r#"<oneSwitch name="DISCONNECT">Off</oneSwitch>"#));
        // Requesting a connection does not change the reported state
        assert!(!device.is_connected());

        device.disconnect().unwrap();
        let v = device.store().switch_vector(CONNECTION).unwrap();
        assert_eq!(v.selected().unwrap().name, DISCONNECT);
    }
}
