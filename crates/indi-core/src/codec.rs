//! Outbound message builders
//!
//! Each function renders one self-contained element. They take already
//! validated data; lookups and store updates live in [`crate::device`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::format::{format_number, format_switch};
use crate::value::{Blob, Number, Switch, Text};
use crate::vector::{BlobVector, NumberVector, SwitchVector, TextVector};
use crate::wire::{
    encode, DefBlobVector, DefNumberVector, DefSwitchVector, DefTextVector, EnableBlob,
    GetProperties, NewBlobVector, NewNumberVector, NewSwitchVector, NewTextVector, OneBlob,
    OneValue, WireError, PROTOCOL_VERSION,
};

/// `<getProperties device=".." name=".." version="1.7"/>`; an empty name asks for all
pub fn get_properties(device: &str, name: &str) -> Result<String, WireError> {
    encode(
        "getProperties",
        &GetProperties {
            device: device.to_string(),
            name: name.to_string(),
            version: PROTOCOL_VERSION.to_string(),
        },
    )
}

/// `<enableBLOB device="..">Also|Never</enableBLOB>`
pub fn enable_blob(device: &str, enable: bool) -> Result<String, WireError> {
    encode(
        "enableBLOB",
        &EnableBlob {
            device: device.to_string(),
            mode: if enable { "Also" } else { "Never" }.to_string(),
        },
    )
}

pub fn new_number_vector(device: &str, name: &str, values: &[Number]) -> Result<String, WireError> {
    encode(
        "newNumberVector",
        &NewNumberVector {
            device: device.to_string(),
            name: name.to_string(),
            items: values
                .iter()
                .map(|n| OneValue {
                    name: n.name.clone(),
                    value: format_number(n.value),
                })
                .collect(),
        },
    )
}

pub fn new_text_vector(device: &str, name: &str, values: &[Text]) -> Result<String, WireError> {
    encode(
        "newTextVector",
        &NewTextVector {
            device: device.to_string(),
            name: name.to_string(),
            items: values
                .iter()
                .map(|t| OneValue {
                    name: t.name.clone(),
                    value: t.value.clone(),
                })
                .collect(),
        },
    )
}

pub fn new_switch_vector(device: &str, name: &str, values: &[Switch]) -> Result<String, WireError> {
    encode(
        "newSwitchVector",
        &NewSwitchVector {
            device: device.to_string(),
            name: name.to_string(),
            items: values
                .iter()
                .map(|s| OneValue {
                    name: s.name.clone(),
                    value: format_switch(s.value).to_string(),
                })
                .collect(),
        },
    )
}

/// Payloads are base64 encoded; `size` carries the encoded length
pub fn new_blob_vector(device: &str, name: &str, values: &[Blob]) -> Result<String, WireError> {
    encode(
        "newBlobVector",
        &NewBlobVector {
            device: device.to_string(),
            name: name.to_string(),
            items: values
                .iter()
                .map(|b| {
                    let data = BASE64.encode(&b.value);
                    OneBlob {
                        name: b.name.clone(),
                        format: b.format.clone(),
                        size: data.len().to_string(),
                        value: data,
                    }
                })
                .collect(),
        },
    )
}

pub fn def_number_vector(vector: &NumberVector) -> Result<String, WireError> {
    encode("defNumberVector", &DefNumberVector::from(vector))
}

pub fn def_text_vector(vector: &TextVector) -> Result<String, WireError> {
    encode("defTextVector", &DefTextVector::from(vector))
}

pub fn def_switch_vector(vector: &SwitchVector) -> Result<String, WireError> {
    encode("defSwitchVector", &DefSwitchVector::from(vector))
}

pub fn def_blob_vector(vector: &BlobVector) -> Result<String, WireError> {
    encode("defBlobVector", &DefBlobVector::from(vector))
}
