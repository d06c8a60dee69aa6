//! Detector lookups over the standard detector vectors

use crate::device::{Device, PropertyError};
use crate::value::{Blob, Number, Switch};

const CAPTURE: (&str, &str) = ("DETECTOR_CAPTURE", "DETECTOR_CAPTURE_VALUE");
const ABORT: (&str, &str) = ("DETECTOR_ABORT_CAPTURE", "ABORT");
const TEMPERATURE: (&str, &str) = ("DETECTOR_TEMPERATURE", "DETECTOR_TEMPERATURE_VALUE");
const COOLER: &str = "DETECTOR_COOLER";
const COOLER_POWER: (&str, &str) = ("DETECTOR_COOLER_POWER", "DETECTOR_COOLER_VALUE");
const INFO: &str = "DETECTOR_INFO";
const STREAMS: &str = "DETECTOR";

/// Bounds of the capture duration, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

pub trait DetectorExt {
    /// Remaining or last requested capture duration, in seconds
    fn capture_time(&self) -> Option<f64>;
    fn capture_range(&self) -> Option<CaptureRange>;
    fn start_capture(&mut self, seconds: f64) -> Result<String, PropertyError>;
    fn abort(&mut self) -> Result<String, PropertyError>;

    fn temperature(&self) -> Option<f64>;
    fn can_set_temperature(&self) -> bool;
    /// Fails with `ReadOnly` when the driver declared the vector read-only
    fn set_temperature(&mut self, celsius: f64) -> Result<String, PropertyError>;

    fn cooler_on(&self) -> Option<bool>;
    fn set_cooler(&mut self, on: bool) -> Result<String, PropertyError>;
    fn cooler_power(&self) -> Option<f64>;
    fn can_set_cooler_power(&self) -> bool;
    fn set_cooler_power(&mut self, percent: f64) -> Result<String, PropertyError>;

    fn sample_rate(&self) -> Option<f64>;
    fn frequency(&self) -> Option<f64>;
    fn bits_per_sample(&self) -> Option<f64>;

    fn continuum(&self) -> Option<&Blob>;
    fn spectrum(&self) -> Option<&Blob>;
}

fn number(device: &Device, (vector, value): (&str, &str)) -> Option<f64> {
    device.store().value::<Number>(vector, value).map(|n| n.value)
}

fn writable(device: &Device, vector: &str) -> bool {
    device
        .store()
        .number_vector(vector)
        .and_then(|v| v.permission)
        .is_some_and(|p| p.is_writable())
}

fn set_writable(device: &mut Device, (vector, value): (&str, &str), x: f64) -> Result<String, PropertyError> {
    if device.store().number_vector(vector).is_some() && !writable(device, vector) {
        return Err(PropertyError::ReadOnly {
            name: vector.to_string(),
        });
    }
    device.set_number(vector, value, x)
}

impl DetectorExt for Device {
    fn capture_time(&self) -> Option<f64> {
        number(self, CAPTURE)
    }

    fn capture_range(&self) -> Option<CaptureRange> {
        let n = self.store().value::<Number>(CAPTURE.0, CAPTURE.1)?;
        Some(CaptureRange {
            min: n.min,
            max: n.max,
            step: n.step,
        })
    }

    fn start_capture(&mut self, seconds: f64) -> Result<String, PropertyError> {
        self.set_number(CAPTURE.0, CAPTURE.1, seconds)
    }

    fn abort(&mut self) -> Result<String, PropertyError> {
        self.set_switch(ABORT.0, ABORT.1, true)
    }

    fn temperature(&self) -> Option<f64> {
        number(self, TEMPERATURE)
    }

    fn can_set_temperature(&self) -> bool {
        writable(self, TEMPERATURE.0)
    }

    fn set_temperature(&mut self, celsius: f64) -> Result<String, PropertyError> {
        set_writable(self, TEMPERATURE, celsius)
    }

    fn cooler_on(&self) -> Option<bool> {
        self.store().value::<Switch>(COOLER, "COOLER_ON").map(|s| s.value)
    }

    fn set_cooler(&mut self, on: bool) -> Result<String, PropertyError> {
        self.set_switch_index(COOLER, if on { 0 } else { 1 })
    }

    fn cooler_power(&self) -> Option<f64> {
        number(self, COOLER_POWER)
    }

    fn can_set_cooler_power(&self) -> bool {
        writable(self, COOLER_POWER.0)
    }

    fn set_cooler_power(&mut self, percent: f64) -> Result<String, PropertyError> {
        set_writable(self, COOLER_POWER, percent)
    }

    fn sample_rate(&self) -> Option<f64> {
        number(self, (INFO, "DETECTOR_SAMPLERATE"))
    }

    fn frequency(&self) -> Option<f64> {
        number(self, (INFO, "DETECTOR_FREQUENCY"))
    }

    fn bits_per_sample(&self) -> Option<f64> {
        number(self, (INFO, "DETECTOR_BITSPERSAMPLE"))
    }

    fn continuum(&self) -> Option<&Blob> {
        self.store().value::<Blob>(STREAMS, "CONTINUUM")
    }

    fn spectrum(&self) -> Option<&Blob> {
        self.store().value::<Blob>(STREAMS, "SPECTRUM")
    }
}
