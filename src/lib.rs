// Core modules
pub mod core;
pub mod storage;
pub mod service;
pub mod common;

// Re-export commonly used types
pub use common::{AttendanceError, Config, Result};
pub use crate::core::{Descriptor, EnrolledRecord, euclidean_distance, LengthMismatch, find_closest, MatchResult, MismatchPolicy};
pub use storage::DescriptorStore;
pub use service::{create_router, protocol, AppState, AttendanceEvent, EventHub};

pub mod config {
    pub use crate::common::config::*;
}
pub mod error {
    pub use crate::common::error::*;
}
