use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch for '{identity}': query has {expected} values, record has {actual}")]
    DimensionMismatch {
        identity: String,
        expected: usize,
        actual: usize,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_record() {
        let err = AttendanceError::DimensionMismatch {
            identity: "carol".into(),
            expected: 128,
            actual: 64,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch for 'carol': query has 128 values, record has 64"
        );
    }

    #[test]
    fn io_errors_convert() {
        fn open_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here.toml")?)
        }
        assert!(matches!(open_missing(), Err(AttendanceError::Io(_))));
    }
}
