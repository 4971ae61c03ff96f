//! Error types for the Lumen scene core
//!
//! Structural edits are rejected as `Err` values before any mutation
//! occurs; the trees are never left half-updated. Tolerated conditions
//! (detaching an already-detached node, removing an absent child) are
//! not errors at all.

use std::fmt;

/// Result type for Lumen scene operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen scene errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Reparent target is invalid (not a container, the node itself,
    /// or a node inside the moved subtree)
    InvalidReparentTarget(String),

    /// Reparent onto the current parent; rejected without side effects
    NoOpReparent,

    /// Operation assumed a container-kind object but found a leaf,
    /// or vice versa
    KindMismatch(String),

    /// A key no longer resolves to a live object or node
    StaleKey(String),

    /// The root node cannot be reparented or removed
    RootImmutable,

    /// An internal invariant check failed (trees out of sync)
    CorruptHierarchy(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidReparentTarget(msg) => write!(f, "Invalid reparent target: {}", msg),
            Error::NoOpReparent => write!(f, "Node is already a child of the target"),
            Error::KindMismatch(msg) => write!(f, "Kind mismatch: {}", msg),
            Error::StaleKey(msg) => write!(f, "Stale key: {}", msg),
            Error::RootImmutable => write!(f, "The root node cannot be reparented or removed"),
            Error::CorruptHierarchy(msg) => write!(f, "Corrupt hierarchy: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
