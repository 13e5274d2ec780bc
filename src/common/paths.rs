use directories::ProjectDirs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "attendance.toml";

/// Config file next to the working directory, used during development.
pub fn local_config_file() -> PathBuf {
    PathBuf::from("configs").join(CONFIG_FILE_NAME)
}

/// Per-user config file, e.g. `~/.config/face-attendance/attendance.toml` on Linux.
pub fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "faceattendance", "face-attendance")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
