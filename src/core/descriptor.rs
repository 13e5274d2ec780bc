use crate::common::{AttendanceError, Result};
use serde::{Deserialize, Serialize};

/// Face descriptor as produced by the capture client's recognition model.
pub type Descriptor = Vec<f32>;

/// A name bound to one reference descriptor. Names need not be unique; a
/// repeated name just adds another reference vector for that person.
///
/// Only constructible through [`EnrolledRecord::new`] (deserialization goes
/// through it too), so every record holds a non-empty name and a non-empty,
/// finite descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct EnrolledRecord {
    #[serde(rename = "name")]
    identity: String,
    #[serde(rename = "faceDescriptor")]
    descriptor: Descriptor,
}

#[derive(Deserialize)]
struct RecordFields {
    name: String,
    #[serde(rename = "faceDescriptor")]
    face_descriptor: Descriptor,
}

impl TryFrom<RecordFields> for EnrolledRecord {
    type Error = AttendanceError;

    fn try_from(fields: RecordFields) -> Result<Self> {
        EnrolledRecord::new(fields.name, fields.face_descriptor)
    }
}

impl EnrolledRecord {
    /// Build a record, rejecting an empty name or a malformed descriptor.
    pub fn new(identity: impl Into<String>, descriptor: Descriptor) -> Result<Self> {
        let identity = identity.into();
        validate_identity(&identity)?;
        validate_descriptor(&descriptor)?;
        Ok(Self { identity, descriptor })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn descriptor(&self) -> &[f32] {
        &self.descriptor
    }

    /// Skips validation so tests can exercise the matcher's own guards.
    #[cfg(test)]
    pub(crate) fn unchecked(identity: &str, descriptor: Descriptor) -> Self {
        Self { identity: identity.to_string(), descriptor }
    }
}

pub fn validate_identity(identity: &str) -> Result<()> {
    if identity.trim().is_empty() {
        return Err(AttendanceError::InvalidInput("name must not be empty".into()));
    }
    Ok(())
}

pub fn validate_descriptor(descriptor: &[f32]) -> Result<()> {
    if descriptor.is_empty() {
        return Err(AttendanceError::InvalidInput("descriptor must not be empty".into()));
    }
    if let Some(index) = descriptor.iter().position(|v| !v.is_finite()) {
        return Err(AttendanceError::InvalidInput(format!(
            "descriptor value at index {} is not a finite number", index
        )));
    }
    Ok(())
}
