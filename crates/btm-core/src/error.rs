//! Common error types for Bluetooth transports

use thiserror::Error;

/// Result type for transport and registry operations
pub type BluetoothResult<T> = Result<T, BluetoothError>;

/// Errors that can occur while routing or resolving Bluetooth objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BluetoothError {
    /// No transport factory is registered under the protocol
    #[error("Transport [{0}] is not registered")]
    NotRegistered(String),

    /// A transport could not resolve the URL within its own namespace
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Malformed URL text, or a URL missing a component the lookup requires
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Operation not supported by this transport or configuration
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Native stack / radio failure reported by a transport
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Discriminant of [`BluetoothError`], for callers that only care about the
/// class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotRegistered,
    NotFound,
    InvalidAddress,
    NotSupported,
    Transport,
}

impl BluetoothError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BluetoothError::NotRegistered(_) => ErrorKind::NotRegistered,
            BluetoothError::NotFound(_) => ErrorKind::NotFound,
            BluetoothError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            BluetoothError::NotSupported(_) => ErrorKind::NotSupported,
            BluetoothError::Transport(_) => ErrorKind::Transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_message() {
        let err = BluetoothError::NotRegistered("tinyb".to_string());
        assert_eq!(err.to_string(), "Transport [tinyb] is not registered");
        assert_eq!(err.kind(), ErrorKind::NotRegistered);
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            BluetoothError::NotRegistered("a".into()),
            BluetoothError::NotFound("a".into()),
            BluetoothError::InvalidAddress("a".into()),
            BluetoothError::NotSupported("a".into()),
            BluetoothError::Transport("a".into()),
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }
}
