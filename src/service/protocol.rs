use crate::common::{AttendanceError, Result};
use crate::core::descriptor::{validate_descriptor, Descriptor, EnrolledRecord};
use serde::{Deserialize, Serialize};

// Response bodies the capture page already understands
pub const ENROLL_OK: &str = "Face data saved successfully";
pub const INVALID_FACE_DATA: &str = "Invalid face data";
pub const INVALID_FACE_DESCRIPTOR: &str = "Invalid face descriptor";
pub const NO_MATCHING_FACE: &str = "No matching face found";

#[derive(Deserialize, Debug, Clone)]
pub struct EnrollRequest {
    pub name: String,
    #[serde(rename = "faceDescriptor")]
    pub face_descriptor: Descriptor,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CheckRequest {
    #[serde(rename = "faceDescriptor")]
    pub face_descriptor: Descriptor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckResponse {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub enrolled: usize,
    pub threshold: f32,
}

/// Parse an enrollment body into a validated record.
pub fn parse_enroll(body: &[u8]) -> Result<EnrolledRecord> {
    let request: EnrollRequest = serde_json::from_slice(body)
        .map_err(|e| AttendanceError::InvalidInput(format!("enroll body: {}", e)))?;
    EnrolledRecord::new(request.name, request.face_descriptor)
}

/// Parse an attendance check body into a validated query descriptor.
pub fn parse_check(body: &[u8]) -> Result<Descriptor> {
    let request: CheckRequest = serde_json::from_slice(body)
        .map_err(|e| AttendanceError::InvalidInput(format!("check body: {}", e)))?;
    validate_descriptor(&request.face_descriptor)?;
    Ok(request.face_descriptor)
}
