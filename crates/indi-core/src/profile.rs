//! Device profiles - default property schemas per device role
//!
//! A profile is plain data: a list of vectors a driver of a given role
//! announces. Profiles are applied generically through
//! [`crate::store::PropertyStore::add_or_merge`], and extra entries can be
//! loaded from a TOML file on top of the built-in tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::value::{Blob, Number, PropertyKind, Switch, Text};
use crate::vector::{AnyVector, Permission, SwitchRule, Vector};

/// Name of the switch vector that carries connection state
pub const CONNECTION: &str = "CONNECTION";
pub const CONNECT: &str = "CONNECT";
pub const DISCONNECT: &str = "DISCONNECT";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse profile file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Profile vector {name} declares no {kind} values")]
    MissingValues { name: String, kind: PropertyKind },
}

/// Role a device plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    #[default]
    Generic,
    Focuser,
    Telescope,
    Detector,
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Generic => "generic",
            Self::Focuser => "focuser",
            Self::Telescope => "telescope",
            Self::Detector => "detector",
        };
        f.write_str(s)
    }
}

impl FromStr for DeviceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "focuser" => Ok(Self::Focuser),
            "telescope" => Ok(Self::Telescope),
            "detector" => Ok(Self::Detector),
            other => Err(format!("unknown device role: {other}")),
        }
    }
}

/// One vector declaration, independent of the device it is applied to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileVector {
    pub kind: PropertyKind,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub perm: Option<Permission>,
    #[serde(default)]
    pub rule: Option<SwitchRule>,
    #[serde(default)]
    pub texts: Vec<Text>,
    #[serde(default)]
    pub numbers: Vec<Number>,
    #[serde(default)]
    pub switches: Vec<Switch>,
    #[serde(default)]
    pub blobs: Vec<Blob>,
}

impl ProfileVector {
    fn base(kind: PropertyKind, name: &str, label: &str, group: &str, perm: Permission) -> Self {
        Self {
            kind,
            name: name.to_string(),
            label: label.to_string(),
            group: group.to_string(),
            perm: Some(perm),
            rule: None,
            texts: Vec::new(),
            numbers: Vec::new(),
            switches: Vec::new(),
            blobs: Vec::new(),
        }
    }

    pub fn numbers(name: &str, label: &str, group: &str, perm: Permission, values: Vec<Number>) -> Self {
        Self {
            numbers: values,
            ..Self::base(PropertyKind::Number, name, label, group, perm)
        }
    }

    pub fn texts(name: &str, label: &str, group: &str, perm: Permission, values: Vec<Text>) -> Self {
        Self {
            texts: values,
            ..Self::base(PropertyKind::Text, name, label, group, perm)
        }
    }

    pub fn switches(
        name: &str,
        label: &str,
        group: &str,
        perm: Permission,
        rule: SwitchRule,
        values: Vec<Switch>,
    ) -> Self {
        Self {
            rule: Some(rule),
            switches: values,
            ..Self::base(PropertyKind::Switch, name, label, group, perm)
        }
    }

    pub fn blobs(name: &str, label: &str, group: &str, perm: Permission, values: Vec<Blob>) -> Self {
        Self {
            blobs: values,
            ..Self::base(PropertyKind::Blob, name, label, group, perm)
        }
    }

    /// Instantiate the declaration for a concrete device
    pub fn to_vector(&self, device: &str) -> Result<AnyVector, ProfileError> {
        let missing = || ProfileError::MissingValues {
            name: self.name.clone(),
            kind: self.kind,
        };
        let vector = match self.kind {
            PropertyKind::Text if !self.texts.is_empty() => {
                AnyVector::Text(self.instantiate(device, self.texts.clone()))
            }
            PropertyKind::Number if !self.numbers.is_empty() => {
                AnyVector::Number(self.instantiate(device, self.numbers.clone()))
            }
            PropertyKind::Switch if !self.switches.is_empty() => {
                AnyVector::Switch(self.instantiate(device, self.switches.clone()))
            }
            PropertyKind::Blob if !self.blobs.is_empty() => {
                AnyVector::Blob(self.instantiate(device, self.blobs.clone()))
            }
            _ => return Err(missing()),
        };
        Ok(vector)
    }

    fn instantiate<V>(&self, device: &str, values: Vec<V>) -> Vector<V> {
        Vector {
            device: device.to_string(),
            name: self.name.clone(),
            label: self.label.clone(),
            group: self.group.clone(),
            permission: self.perm,
            rule: self.rule,
            values,
        }
    }
}

/// A set of vector declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, rename = "vector")]
    pub vectors: Vec<ProfileVector>,
}

impl Profile {
    /// Built-in table for a role
    pub fn builtin(role: DeviceRole) -> Self {
        let mut vectors = vec![connection()];
        match role {
            DeviceRole::Generic => {}
            DeviceRole::Focuser => vectors.extend(focuser()),
            DeviceRole::Telescope => vectors.extend(telescope()),
            DeviceRole::Detector => vectors.extend(detector()),
        }
        Self { vectors }
    }

    /// Load extra declarations from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ProfileError> {
        let profile: Profile = toml::from_str(content)?;
        Ok(profile)
    }

    /// Load extra declarations from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Append declarations, later entries win when applied
    pub fn extend(&mut self, other: Profile) {
        self.vectors.extend(other.vectors);
    }

    /// Declaration of the given kind and name; the last one wins, as when applied
    pub fn lookup(&self, kind: PropertyKind, name: &str) -> Option<&ProfileVector> {
        self.vectors.iter().rfind(|v| v.kind == kind && v.name == name)
    }

    /// Instantiate every declaration for a device
    pub fn vectors_for(&self, device: &str) -> Result<Vec<AnyVector>, ProfileError> {
        self.vectors.iter().map(|v| v.to_vector(device)).collect()
    }
}

fn connection() -> ProfileVector {
    ProfileVector::switches(
        CONNECTION,
        "Connection",
        "Main Control",
        Permission::ReadWrite,
        SwitchRule::OneOfMany,
        vec![
            Switch::new(CONNECT, "Connect", false),
            Switch::new(DISCONNECT, "Disconnect", true),
        ],
    )
}

fn focuser() -> Vec<ProfileVector> {
    use Permission::ReadWrite as Rw;
    vec![
        ProfileVector::numbers(
            "FOCUS_SPEED",
            "Select focus speed",
            "Main Control",
            Rw,
            vec![Number::new("FOCUS_SPEED_VALUE", "Set focuser speed", "%3.1f", 0.0, 1000.0, 0.1, 0.0)],
        ),
        ProfileVector::switches(
            "FOCUS_MOTION",
            "Move focuser",
            "Motion Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("FOCUS_INWARD", "Focus inward", true),
                Switch::new("FOCUS_OUTWARD", "Focus outward", false),
            ],
        ),
        ProfileVector::numbers(
            "FOCUS_TIMER",
            "Focuser speed",
            "Motion Control",
            Rw,
            vec![Number::new(
                "FOCUS_TIMER_VALUE",
                "Focus in the direction, speed and time selected",
                "%4.0f",
                0.0,
                1000.0,
                1.0,
                0.0,
            )],
        ),
        ProfileVector::numbers(
            "REL_FOCUS_POSITION",
            "Focuser Relative position",
            "Motion Control",
            Rw,
            vec![Number::new("FOCUS_RELATIVE_POSITION", "Focuser Relative position", "%5.0f", 0.0, 50000.0, 1.0, 0.0)],
        ),
        ProfileVector::numbers(
            "ABS_FOCUS_POSITION",
            "Focuser Absolute position",
            "Motion Control",
            Rw,
            vec![Number::new("FOCUS_ABSOLUTE_POSITION", "Focuser Absolute position", "%5.0f", 0.0, 50000.0, 1.0, 0.0)],
        ),
        ProfileVector::switches(
            "FOCUS_ABORT_MOTION",
            "Abort focuser motion",
            "Motion Control",
            Rw,
            SwitchRule::AtMostOne,
            vec![Switch::new("ABORT", "Abort focuser motion", false)],
        ),
    ]
}

fn telescope() -> Vec<ProfileVector> {
    use Permission::{ReadOnly as Ro, ReadWrite as Rw};
    let radec = |ra: &str, dec: &str| {
        vec![
            Number::new("RA", ra, "%2.12f", 0.0, 24.0, 0.000000000001, 0.0),
            Number::new("DEC", dec, "%2.12f", -90.0, 90.0, 0.000000000001, 0.0),
        ]
    };
    vec![
        ProfileVector::numbers(
            "EQUATORIAL_COORD",
            "Equatorial astrometric J2000 coordinate",
            "Main Control",
            Rw,
            radec("J2000 RA", "J2000 Dec"),
        ),
        ProfileVector::numbers(
            "EQUATORIAL_EOD_COORD",
            "Equatorial astrometric epoch of date coordinate",
            "Main Control",
            Rw,
            radec("JNow RA", "JNow Dec"),
        ),
        ProfileVector::numbers("TARGET_EOD_COORD", "Slew Target", "Main Control", Ro, radec("JNow RA", "JNow Dec")),
        ProfileVector::numbers(
            "HORIZONTAL_COORD",
            "topocentric coordinate",
            "Main Control",
            Ro,
            vec![
                Number::new("ALT", "Altitude", "%2.12f", 0.0, 90.0, 0.000000000001, 0.0),
                Number::new("AZ", "Azimuth", "%3.12f", 0.0, 360.0, 0.000000000001, 0.0),
            ],
        ),
        ProfileVector::switches(
            "ON_COORD_SET",
            "Track mode",
            "Main Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("SLEW", "Slew", true),
                Switch::new("TRACK", "Track", false),
                Switch::new("SYNC", "Sync", false),
            ],
        ),
        ProfileVector::switches(
            "TELESCOPE_MOTION_NS",
            "Move telescope north or south",
            "Motion Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("MOTION_NORTH", "Move North", false),
                Switch::new("MOTION_SOUTH", "Move South", false),
            ],
        ),
        ProfileVector::switches(
            "TELESCOPE_MOTION_WE",
            "Move telescope west or east",
            "Motion Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("MOTION_WEST", "Move West", false),
                Switch::new("MOTION_EAST", "Move East", false),
            ],
        ),
        ProfileVector::numbers(
            "TELESCOPE_TIMED_GUIDE_NS",
            "Timed guide telescope north or south",
            "Motion Control",
            Rw,
            vec![
                Number::new("TIMED_GUIDE_N", "Guide North", "%5.2f", 0.0, 10000.0, 0.01, 0.0),
                Number::new("TIMED_GUIDE_S", "Guide South", "%5.2f", 0.0, 10000.0, 0.01, 0.0),
            ],
        ),
        ProfileVector::numbers(
            "TELESCOPE_TIMED_GUIDE_WE",
            "Timed guide telescope west or east",
            "Motion Control",
            Rw,
            vec![
                Number::new("TIMED_GUIDE_W", "Guide West", "%5.2f", 0.0, 10000.0, 0.01, 0.0),
                Number::new("TIMED_GUIDE_E", "Guide East", "%5.2f", 0.0, 10000.0, 0.01, 0.0),
            ],
        ),
        ProfileVector::switches(
            "TELESCOPE_SLEW_RATE",
            "Slew Rate",
            "Motion Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("SLEW_GUIDE", "Guiding Rate", false),
                Switch::new("SLEW_CENTERING", "Slow speed", false),
                Switch::new("SLEW_FIND", "Medium speed", true),
                Switch::new("SLEW_MAX", "Maximum speed", false),
            ],
        ),
        ProfileVector::switches(
            "TELESCOPE_PARK",
            "Park and unpark the telescope",
            "Main Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("PARK", "Park the telescope", false),
                Switch::new("UNPARK", "Unpark the telescope", false),
            ],
        ),
        ProfileVector::numbers(
            "TELESCOPE_PARK_POSITION",
            "Home park position",
            "Main Control",
            Ro,
            radec("JNow RA", "JNow Dec")
                .into_iter()
                .map(|mut n| {
                    n.name = format!("PARK_{}", n.name);
                    n
                })
                .collect(),
        ),
        ProfileVector::switches(
            "TELESCOPE_PARK_OPTION",
            "Park Option",
            "Main Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("PARK_CURRENT", "Use current park position", false),
                Switch::new("PARK_DEFAULT", "Use driver's default park position", true),
                Switch::new("PARK_WRITE_DATA", "Write park position", false),
            ],
        ),
        ProfileVector::switches(
            "TELESCOPE_ABORT_MOTION",
            "Abort",
            "Main Control",
            Rw,
            SwitchRule::AtMostOne,
            vec![Switch::new("ABORT_MOTION", "Stop telescope", false)],
        ),
        ProfileVector::switches(
            "TELESCOPE_TRACK_RATE",
            "Track Rate",
            "Main Control",
            Rw,
            SwitchRule::AtMostOne,
            vec![
                Switch::new("TRACK_SIDEREAL", "Track at sidereal rate", true),
                Switch::new("TRACK_SOLAR", "Track at solar rate", false),
                Switch::new("TRACK_LUNAR", "Track at lunar rate", false),
                Switch::new("TRACK_CUSTOM", "Track at custom rate", false),
            ],
        ),
        ProfileVector::numbers(
            "TELESCOPE_INFO",
            "Telescope information",
            "Telescope Info",
            Ro,
            vec![
                Number::new("TELESCOPE_APERTURE", "Telescope aperture", "%5.2f", 0.0, 10000.0, 0.01, 200.0),
                Number::new("TELESCOPE_FOCAL_LENGTH", "Telescope focal length", "%5.2f", 0.0, 10000.0, 0.01, 200.0),
                Number::new("GUIDER_APERTURE", "Guide telescope aperture", "%5.2f", 0.0, 10000.0, 0.01, 200.0),
                Number::new("GUIDER_FOCAL_LENGTH", "Guide telescope focal length", "%5.2f", 0.0, 10000.0, 0.01, 200.0),
            ],
        ),
        ProfileVector::switches(
            "TELESCOPE_PIER_SIDE",
            "Pier Side",
            "Motion Control",
            Rw,
            SwitchRule::OneOfMany,
            vec![
                Switch::new("PIER_EAST", "Pointing West", false),
                Switch::new("PIER_WEST", "Pointing East", false),
            ],
        ),
    ]
}

fn detector() -> Vec<ProfileVector> {
    use Permission::{ReadOnly as Ro, ReadWrite as Rw};
    vec![
        ProfileVector::numbers(
            "DETECTOR_CAPTURE",
            "Capture",
            "Main Control",
            Rw,
            vec![Number::new("DETECTOR_CAPTURE_VALUE", "Duration (s)", "%5.2f", 0.05, 10000.0, 0.05, 1.0)],
        ),
        ProfileVector::switches(
            "DETECTOR_ABORT_CAPTURE",
            "Expose Abort",
            "Main Control",
            Rw,
            SwitchRule::AtMostOne,
            vec![Switch::new("ABORT", "Abort", false)],
        ),
        ProfileVector::numbers(
            "DETECTOR_TEMPERATURE",
            "Temperature",
            "Main Control",
            Rw,
            vec![Number::new("DETECTOR_TEMPERATURE_VALUE", "Temperature (C)", "%5.2f", -50.0, 50.0, 0.0, 20.0)],
        ),
        ProfileVector::numbers(
            "DETECTOR_INFO",
            "Detector Information",
            "Image Info",
            Ro,
            vec![
                Number::new("DETECTOR_SAMPLERATE", "Bandwidth (Hz)", "%18.2f", 0.01, 1.0e15, 0.01, 1.0e6),
                Number::new("DETECTOR_FREQUENCY", "Observed frequency (Hz)", "%18.2f", 0.01, 1.0e15, 0.01, 1.42e9),
                Number::new("DETECTOR_BITSPERSAMPLE", "Bits per sample", "%3.0f", 1.0, 64.0, 1.0, 8.0),
            ],
        ),
        ProfileVector::blobs(
            "DETECTOR",
            "Capture",
            "Data Streams",
            Ro,
            vec![
                Blob::new("CONTINUUM", "Continuum data", ".fits", vec![0], 1),
                Blob::new("SPECTRUM", "Spectrum data", ".fits", vec![0], 1),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_profiles_instantiate() {
        for role in [
            DeviceRole::Generic,
            DeviceRole::Focuser,
            DeviceRole::Telescope,
            DeviceRole::Detector,
        ] {
            let profile = Profile::builtin(role);
            let vectors = profile.vectors_for("Dev").unwrap();
            assert_eq!(vectors.len(), profile.vectors.len());
            assert!(profile.lookup(PropertyKind::Switch, CONNECTION).is_some());
        }
    }

    #[test]
    fn test_focuser_profile_contents() {
        let profile = Profile::builtin(DeviceRole::Focuser);
        let motion = profile.lookup(PropertyKind::Switch, "FOCUS_MOTION").unwrap();
        assert_eq!(motion.rule, Some(SwitchRule::OneOfMany));
        assert_eq!(motion.switches.len(), 2);
        assert!(profile.lookup(PropertyKind::Number, "FOCUS_MOTION").is_none());

        match motion.to_vector("Focuser").unwrap() {
            AnyVector::Switch(v) => {
                assert_eq!(v.device, "Focuser");
                assert_eq!(v.selected_index(), Some(0));
            }
            other => panic!("unexpected vector: {:?}", other),
        }
    }

    #[test]
    fn test_telescope_profile_contents() {
        let profile = Profile::builtin(DeviceRole::Telescope);
        let names: Vec<&str> = profile.vectors.iter().map(|v| v.name.as_str()).collect();
        for name in [
            "TELESCOPE_MOTION_NS",
            "TELESCOPE_MOTION_WE",
            "TELESCOPE_TIMED_GUIDE_NS",
            "TELESCOPE_TIMED_GUIDE_WE",
            "TELESCOPE_PARK_POSITION",
            "TELESCOPE_PARK_OPTION",
        ] {
            assert!(names.contains(&name), "missing {name}");
        }
        let park = profile.lookup(PropertyKind::Number, "TELESCOPE_PARK_POSITION").unwrap();
        assert_eq!(park.numbers[0].name, "PARK_RA");
        assert_eq!(park.numbers[1].name, "PARK_DEC");
        assert_eq!(park.perm, Some(Permission::ReadOnly));
    }

    #[test]
    fn test_profile_from_toml() {
        let toml = r#"
[[vector]]
kind = "text"
name = "DEVICE_PORT"
label = "Ports"
group = "Connection"
perm = "rw"
texts = [{ name = "PORT", label = "Port", value = "/dev/ttyUSB0" }]

[[vector]]
kind = "switch"
name = "UPLOAD_MODE"
group = "Options"
perm = "rw"
rule = "OneOfMany"
switches = [
    { name = "UPLOAD_CLIENT", label = "Client", value = true },
    { name = "UPLOAD_LOCAL", label = "Local" },
]
"#;
        let profile = Profile::from_toml(toml).unwrap();
        assert_eq!(profile.vectors.len(), 2);
        assert_eq!(profile.vectors[0].perm, Some(Permission::ReadWrite));
        assert!(!profile.vectors[1].switches[1].value);

        let vectors = profile.vectors_for("Focuser").unwrap();
        assert_eq!(vectors[0].kind(), PropertyKind::Text);
        assert_eq!(vectors[1].group(), "Options");
    }

    #[test]
    fn test_profile_missing_values() {
        let toml = r#"
[[vector]]
kind = "number"
name = "EMPTY"
"#;
        let profile = Profile::from_toml(toml).unwrap();
        assert!(matches!(
            profile.vectors_for("Dev"),
            Err(ProfileError::MissingValues { .. })
        ));
    }

    #[test]
    fn test_profile_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[[vector]]
kind = "number"
name = "FOCUS_TEMPERATURE"
numbers = [{{ name = "TEMPERATURE", format = "%6.2f", min = -50.0, max = 70.0, value = 12.5 }}]"#
        )
        .unwrap();

        let profile = Profile::from_file(file.path()).unwrap();
        let number = &profile.vectors[0].numbers[0];
        assert_eq!(number.value, 12.5);
        assert_eq!(number.step, 0.0);
        assert!(Profile::from_file(Path::new("/nonexistent/profile.toml")).is_err());
    }

    #[test]
    fn test_extended_entry_wins_lookup() {
        let mut profile = Profile::builtin(DeviceRole::Focuser);
        profile.extend(
            Profile::from_toml(
                r#"
[[vector]]
kind = "number"
name = "FOCUS_SPEED"
label = "Custom speed"
numbers = [{ name = "FOCUS_SPEED_VALUE", value = 3.0 }]
"#,
            )
            .unwrap(),
        );
        let speed = profile.lookup(PropertyKind::Number, "FOCUS_SPEED").unwrap();
        assert_eq!(speed.label, "Custom speed");
        assert_eq!(
            profile.lookup(PropertyKind::Switch, "FOCUS_MOTION").unwrap().label,
            "Move focuser"
        );
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Telescope".parse::<DeviceRole>().unwrap(), DeviceRole::Telescope);
        assert!("camera".parse::<DeviceRole>().is_err());
        assert_eq!(DeviceRole::Detector.to_string(), "detector");
    }
}
