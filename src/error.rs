// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid exclusion pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("{0}")]
    Walk(String),

    #[error("language catalog inconsistency: {0}")]
    Catalog(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_error_converts() {
        let err: AppError = regex::Regex::new("([").unwrap_err().into();
        assert!(matches!(err, AppError::Regex(_)));
        assert!(err.to_string().contains("invalid exclusion pattern"));
    }

    #[test]
    fn test_walk_error_message_passes_through() {
        let err = AppError::Walk("some/dir: permission denied".into());
        assert_eq!(err.to_string(), "some/dir: permission denied");
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert_eq!(err.to_string(), "gone");
    }
}
