//! Error types for cursor operations.

use std::fmt;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that can occur while reading a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// Attempted to read past the end of the buffer.
    OutOfBounds {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A string read was asked for zero words.
    EmptyString,
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::EmptyString => write!(f, "string field must span at least one word"),
        }
    }
}

impl std::error::Error for CursorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_out_of_bounds() {
        let err = CursorError::OutOfBounds {
            requested: 4,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("4 bytes"), "should mention requested bytes");
        assert!(msg.contains("3 bytes"), "should mention available bytes");
        assert!(msg.contains("read"), "should mention read operation");
    }

    #[test]
    fn error_display_empty_string() {
        let msg = CursorError::EmptyString.to_string();
        assert!(msg.contains("word"));
    }

    #[test]
    fn error_equality() {
        let err1 = CursorError::OutOfBounds {
            requested: 8,
            available: 3,
        };
        let err2 = CursorError::OutOfBounds {
            requested: 8,
            available: 3,
        };
        let err3 = CursorError::OutOfBounds {
            requested: 8,
            available: 4,
        };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<CursorError>();
    }
}
