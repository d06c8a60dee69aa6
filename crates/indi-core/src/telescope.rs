//! Telescope lookups over the standard mount vectors
//!
//! Coordinates are read from and written to the epoch-of-date vector
//! (`EQUATORIAL_EOD_COORD`) unless a J2000 accessor is used. Every goto
//! selects the `ON_COORD_SET` mode first, then sends the coordinates.

use crate::device::{Device, PropertyError};
use crate::value::{Number, PropertyKind, Switch};

const EQUATORIAL_J2000: &str = "EQUATORIAL_COORD";
const EQUATORIAL_EOD: &str = "EQUATORIAL_EOD_COORD";
const HORIZONTAL: &str = "HORIZONTAL_COORD";
const COORD_SET: &str = "ON_COORD_SET";
const SLEW_RATE: &str = "TELESCOPE_SLEW_RATE";
const TRACK_RATE: &str = "TELESCOPE_TRACK_RATE";
const TRACK_STATE: &str = "TELESCOPE_TRACK_STATE";
const PARK: (&str, &str) = ("TELESCOPE_PARK", "PARK");
const ABORT: (&str, &str) = ("TELESCOPE_ABORT_MOTION", "ABORT_MOTION");
const INFO: &str = "TELESCOPE_INFO";

macro_rules! indexed {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $index:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant = $index),+
        }

        impl $name {
            fn from_index(index: usize) -> Option<Self> {
                match index {
                    $($index => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

indexed!(
    /// Index into `ON_COORD_SET`: what the mount does on new coordinates
    CoordSet { Slew = 0, Track = 1, Sync = 2 }
);

indexed!(
    /// Index into `TELESCOPE_SLEW_RATE`
    SlewRate { Guide = 0, Centering = 1, Find = 2, Max = 3 }
);

indexed!(
    /// Index into `TELESCOPE_TRACK_RATE`
    TrackRate { Sidereal = 0, Solar = 1, Lunar = 2, Custom = 3 }
);

/// Manual motion and guiding direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Motion switch vector and switch name
    fn motion(self) -> (&'static str, &'static str) {
        match self {
            Self::North => ("TELESCOPE_MOTION_NS", "MOTION_NORTH"),
            Self::South => ("TELESCOPE_MOTION_NS", "MOTION_SOUTH"),
            Self::West => ("TELESCOPE_MOTION_WE", "MOTION_WEST"),
            Self::East => ("TELESCOPE_MOTION_WE", "MOTION_EAST"),
        }
    }

    /// Timed guide number vector and value name
    fn guide(self) -> (&'static str, &'static str) {
        match self {
            Self::North => ("TELESCOPE_TIMED_GUIDE_NS", "TIMED_GUIDE_N"),
            Self::South => ("TELESCOPE_TIMED_GUIDE_NS", "TIMED_GUIDE_S"),
            Self::West => ("TELESCOPE_TIMED_GUIDE_WE", "TIMED_GUIDE_W"),
            Self::East => ("TELESCOPE_TIMED_GUIDE_WE", "TIMED_GUIDE_E"),
        }
    }
}

/// Optical data from `TELESCOPE_INFO`, in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelescopeInfo {
    pub aperture: f64,
    pub focal_length: f64,
    pub guider_aperture: f64,
    pub guider_focal_length: f64,
}

pub trait TelescopeExt {
    /// Epoch-of-date right ascension (hours) and declination (degrees)
    fn ra_dec(&self) -> Option<(f64, f64)>;
    fn ra_dec_j2000(&self) -> Option<(f64, f64)>;
    /// Altitude and azimuth in degrees
    fn alt_az(&self) -> Option<(f64, f64)>;

    fn coord_set(&self) -> Option<CoordSet>;
    fn set_coord_set(&mut self, mode: CoordSet) -> Result<String, PropertyError>;

    fn slew_to_ra_dec(&mut self, ra: f64, dec: f64) -> Result<String, PropertyError>;
    fn track_to_ra_dec(&mut self, ra: f64, dec: f64) -> Result<String, PropertyError>;
    fn sync_to_ra_dec(&mut self, ra: f64, dec: f64) -> Result<String, PropertyError>;
    fn slew_to_alt_az(&mut self, alt: f64, az: f64) -> Result<String, PropertyError>;
    fn track_to_alt_az(&mut self, alt: f64, az: f64) -> Result<String, PropertyError>;
    fn sync_to_alt_az(&mut self, alt: f64, az: f64) -> Result<String, PropertyError>;

    /// Start manual motion towards `direction`
    fn move_telescope(&mut self, direction: Direction) -> Result<String, PropertyError>;
    /// Stop manual motion towards `direction`, leaving the opposite switch as it is
    fn stop(&mut self, direction: Direction) -> Result<String, PropertyError>;
    fn pulse_guide(&mut self, direction: Direction, milliseconds: f64) -> Result<String, PropertyError>;
    fn abort(&mut self) -> Result<String, PropertyError>;

    fn parked(&self) -> Option<bool>;
    fn set_parked(&mut self, parked: bool) -> Result<String, PropertyError>;
    fn tracking(&self) -> Option<bool>;
    fn set_tracking(&mut self, tracking: bool) -> Result<String, PropertyError>;

    fn slew_rate(&self) -> Option<SlewRate>;
    fn set_slew_rate(&mut self, rate: SlewRate) -> Result<String, PropertyError>;
    fn track_rate(&self) -> Option<TrackRate>;
    fn set_track_rate(&mut self, rate: TrackRate) -> Result<String, PropertyError>;

    fn telescope_info(&self) -> Option<TelescopeInfo>;
}

fn pair(device: &Device, vector: &str, first: &str, second: &str) -> Option<(f64, f64)> {
    let store = device.store();
    let a = store.value::<Number>(vector, first)?.value;
    let b = store.value::<Number>(vector, second)?.value;
    Some((a, b))
}

fn selected(device: &Device, vector: &str) -> Option<usize> {
    device.store().switch_vector(vector)?.selected_index()
}

fn goto(device: &mut Device, mode: CoordSet, vector: &str, a: f64, b: f64) -> Result<String, PropertyError> {
    device.set_coord_set(mode)?;
    device.set_number_vector(vector, &[a, b])
}

impl TelescopeExt for Device {
    fn ra_dec(&self) -> Option<(f64, f64)> {
        pair(self, EQUATORIAL_EOD, "RA", "DEC")
    }

    fn ra_dec_j2000(&self) -> Option<(f64, f64)> {
        pair(self, EQUATORIAL_J2000, "RA", "DEC")
    }

    fn alt_az(&self) -> Option<(f64, f64)> {
        pair(self, HORIZONTAL, "ALT", "AZ")
    }

    fn coord_set(&self) -> Option<CoordSet> {
        selected(self, COORD_SET).and_then(CoordSet::from_index)
    }

    fn set_coord_set(&mut self, mode: CoordSet) -> Result<String, PropertyError> {
        self.set_switch_index(COORD_SET, mode as usize)
    }

    fn slew_to_ra_dec(&mut self, ra: f64, dec: f64) -> Result<String, PropertyError> {
        goto(self, CoordSet::Slew, EQUATORIAL_EOD, ra, dec)
    }

    fn track_to_ra_dec(&mut self, ra: f64, dec: f64) -> Result<String, PropertyError> {
        goto(self, CoordSet::Track, EQUATORIAL_EOD, ra, dec)
    }

    fn sync_to_ra_dec(&mut self, ra: f64, dec: f64) -> Result<String, PropertyError> {
        goto(self, CoordSet::Sync, EQUATORIAL_EOD, ra, dec)
    }

    fn slew_to_alt_az(&mut self, alt: f64, az: f64) -> Result<String, PropertyError> {
        goto(self, CoordSet::Slew, HORIZONTAL, alt, az)
    }

    fn track_to_alt_az(&mut self, alt: f64, az: f64) -> Result<String, PropertyError> {
        goto(self, CoordSet::Track, HORIZONTAL, alt, az)
    }

    fn sync_to_alt_az(&mut self, alt: f64, az: f64) -> Result<String, PropertyError> {
        goto(self, CoordSet::Sync, HORIZONTAL, alt, az)
    }

    fn move_telescope(&mut self, direction: Direction) -> Result<String, PropertyError> {
        let (vector, switch) = direction.motion();
        self.set_switch(vector, switch, true)
    }

    fn stop(&mut self, direction: Direction) -> Result<String, PropertyError> {
        let (vector, switch) = direction.motion();
        // Under OneOfMany, set_switch(.., false) would start the opposite motion
        let states: Vec<bool> = self
            .store()
            .switch_vector(vector)
            .ok_or_else(|| PropertyError::UnknownVector {
                kind: PropertyKind::Switch,
                name: vector.to_string(),
            })?
            .values
            .iter()
            .map(|s| s.value && s.name != switch)
            .collect();
        self.set_switch_vector(vector, &states)
    }

    fn pulse_guide(&mut self, direction: Direction, milliseconds: f64) -> Result<String, PropertyError> {
        let (vector, value) = direction.guide();
        self.set_number(vector, value, milliseconds)
    }

    fn abort(&mut self) -> Result<String, PropertyError> {
        self.set_switch(ABORT.0, ABORT.1, true)
    }

    fn parked(&self) -> Option<bool> {
        self.store().value::<Switch>(PARK.0, PARK.1).map(|s| s.value)
    }

    fn set_parked(&mut self, parked: bool) -> Result<String, PropertyError> {
        self.set_switch_index(PARK.0, if parked { 0 } else { 1 })
    }

    fn tracking(&self) -> Option<bool> {
        self.store().value::<Switch>(TRACK_STATE, "TRACK_ON").map(|s| s.value)
    }

    fn set_tracking(&mut self, tracking: bool) -> Result<String, PropertyError> {
        self.set_switch_index(TRACK_STATE, if tracking { 0 } else { 1 })
    }

    fn slew_rate(&self) -> Option<SlewRate> {
        selected(self, SLEW_RATE).and_then(SlewRate::from_index)
    }

    fn set_slew_rate(&mut self, rate: SlewRate) -> Result<String, PropertyError> {
        self.set_switch_index(SLEW_RATE, rate as usize)
    }

    fn track_rate(&self) -> Option<TrackRate> {
        selected(self, TRACK_RATE).and_then(TrackRate::from_index)
    }

    fn set_track_rate(&mut self, rate: TrackRate) -> Result<String, PropertyError> {
        self.set_switch_index(TRACK_RATE, rate as usize)
    }

    fn telescope_info(&self) -> Option<TelescopeInfo> {
        let value = |name: &str| self.store().value::<Number>(INFO, name).map(|n| n.value);
        Some(TelescopeInfo {
            aperture: value("TELESCOPE_APERTURE")?,
            focal_length: value("TELESCOPE_FOCAL_LENGTH")?,
            guider_aperture: value("GUIDER_APERTURE")?,
            guider_focal_length: value("GUIDER_FOCAL_LENGTH")?,
        })
    }
}
