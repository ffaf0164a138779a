use serde::Serialize;
use thiserror::Error;

/// Tag carried by every engine failure. HTTP status codes are chosen from
/// this at the transport boundary, never inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    InvariantViolation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed input, rejected before any classification or scoring.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal consistency fault. Never swallowed.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::InvariantViolation(_) => ErrorKind::InvariantViolation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            EngineError::Validation(msg) | EngineError::InvariantViolation(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_message() {
        let err = EngineError::Validation("fittingLevel must be between 1 and 5".to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "fittingLevel must be between 1 and 5");
        assert!(err.to_string().starts_with("Validation error"));
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::InvariantViolation).unwrap();
        assert_eq!(json, "\"INVARIANT_VIOLATION\"");
    }
}
