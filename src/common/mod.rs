pub mod config;
pub mod error;
pub mod paths;

pub use config::Config;
pub use error::{AttendanceError, Result};
pub use paths::{local_config_file, user_config_file};
