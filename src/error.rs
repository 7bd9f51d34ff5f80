//! Error types for the surfaces around the simulation.
//!
//! Gameplay failures (empty ammo, death) are modelled as state, never as errors.
//! These types cover only storage, catalog lookups and tuning documents.

use std::fmt;

/// Collection storage failure. Always recoverable: callers fall back to memory.
#[derive(Debug)]
pub enum PersistError {
    /// Backing store does not exist or refused access (e.g. LocalStorage blocked).
    Unavailable {
        /// Human-readable description of the backend that failed.
        backend: &'static str,
    },
    /// Filesystem error from the native JSON store.
    Io(std::io::Error),
    /// Stored document could not be parsed.
    Corrupt(serde_json::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Unavailable { backend } => {
                write!(f, "collection storage unavailable ({})", backend)
            }
            PersistError::Io(e) => write!(f, "collection storage i/o error: {}", e),
            PersistError::Corrupt(e) => write!(f, "collection data is corrupt: {}", e),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Unavailable { .. } => None,
            PersistError::Io(e) => Some(e),
            PersistError::Corrupt(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Corrupt(e)
    }
}

/// An item id that does not exist in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownItem(pub u32);

impl fmt::Display for UnknownItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown item id {}", self.0)
    }
}

impl std::error::Error for UnknownItem {}

/// Tuning document could not be loaded.
#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "failed to read tuning file: {}", e),
            TuningError::Parse(e) => write!(f, "failed to parse tuning: {}", e),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(e) => Some(e),
            TuningError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}
