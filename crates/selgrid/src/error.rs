#![forbid(unsafe_code)]

//! Errors returned by the selector API.

use crate::registry::EntryId;

/// Errors from selector operations.
///
/// Lookups that simply find nothing (an arrow key with no selection, a tap
/// outside every cell) are not errors and never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The handle was not issued by this selector.
    UnknownEntry(EntryId),
    /// Entry storage could not grow.
    OutOfMemory,
    /// A configuration value the selector cannot work with.
    InvalidConfig(&'static str),
}

impl std::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntry(id) => write!(f, "unknown entry: {}", id.index()),
            Self::OutOfMemory => write!(f, "out of memory adding entry"),
            Self::InvalidConfig(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for SelectorError {}

impl From<std::collections::TryReserveError> for SelectorError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}
