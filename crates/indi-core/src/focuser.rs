//! Focuser lookups over the standard focuser vectors

use crate::device::{Device, PropertyError};
use crate::value::Number;

const SPEED: (&str, &str) = ("FOCUS_SPEED", "FOCUS_SPEED_VALUE");
const TIMER: (&str, &str) = ("FOCUS_TIMER", "FOCUS_TIMER_VALUE");
const RELATIVE: (&str, &str) = ("REL_FOCUS_POSITION", "FOCUS_RELATIVE_POSITION");
const ABSOLUTE: (&str, &str) = ("ABS_FOCUS_POSITION", "FOCUS_ABSOLUTE_POSITION");
const MOTION: &str = "FOCUS_MOTION";
const ABORT: (&str, &str) = ("FOCUS_ABORT_MOTION", "ABORT");

/// Index into `FOCUS_MOTION`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Inward = 0,
    Outward = 1,
}

impl FocusDirection {
    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Inward),
            1 => Some(Self::Outward),
            _ => None,
        }
    }
}

pub trait FocuserExt {
    fn speed(&self) -> Option<f64>;
    fn set_speed(&mut self, speed: f64) -> Result<String, PropertyError>;
    fn relative_position(&self) -> Option<f64>;
    fn set_relative_position(&mut self, steps: f64) -> Result<String, PropertyError>;
    fn absolute_position(&self) -> Option<f64>;
    fn set_absolute_position(&mut self, position: f64) -> Result<String, PropertyError>;
    /// Selected direction; `None` when no switch is on
    fn direction(&self) -> Option<FocusDirection>;
    fn set_direction(&mut self, direction: FocusDirection) -> Result<String, PropertyError>;
    /// Select a direction, then run the motor for `milliseconds`
    fn move_focuser(&mut self, direction: FocusDirection, milliseconds: f64) -> Result<String, PropertyError>;
    fn abort(&mut self) -> Result<String, PropertyError>;
}

fn number(device: &Device, (vector, value): (&str, &str)) -> Option<f64> {
    device.store().value::<Number>(vector, value).map(|n| n.value)
}

impl FocuserExt for Device {
    fn speed(&self) -> Option<f64> {
        number(self, SPEED)
    }

    fn set_speed(&mut self, speed: f64) -> Result<String, PropertyError> {
        self.set_number(SPEED.0, SPEED.1, speed)
    }

    fn relative_position(&self) -> Option<f64> {
        number(self, RELATIVE)
    }

    fn set_relative_position(&mut self, steps: f64) -> Result<String, PropertyError> {
        self.set_number(RELATIVE.0, RELATIVE.1, steps)
    }

    fn absolute_position(&self) -> Option<f64> {
        number(self, ABSOLUTE)
    }

    fn set_absolute_position(&mut self, position: f64) -> Result<String, PropertyError> {
        self.set_number(ABSOLUTE.0, ABSOLUTE.1, position)
    }

    fn direction(&self) -> Option<FocusDirection> {
        self.store()
            .switch_vector(MOTION)?
            .selected_index()
            .and_then(FocusDirection::from_index)
    }

    fn set_direction(&mut self, direction: FocusDirection) -> Result<String, PropertyError> {
        self.set_switch_index(MOTION, direction as usize)
    }

    fn move_focuser(&mut self, direction: FocusDirection, milliseconds: f64) -> Result<String, PropertyError> {
        self.set_direction(direction)?;
        self.set_number(TIMER.0, TIMER.1, milliseconds)
    }

    fn abort(&mut self) -> Result<String, PropertyError> {
        self.set_switch(ABORT.0, ABORT.1, true)
    }
}
