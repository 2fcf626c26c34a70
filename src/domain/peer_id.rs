//! Type-safe connection identifier.
//!
//! [`PeerId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! connection handles cannot be confused with any other identifier.

use std::fmt;

/// Unique identifier for one connected WebSocket peer.
///
/// Assigned when the connection is upgraded and immutable for the
/// connection's lifetime. Used as the key in
/// [`super::ConnectionRegistry`] and as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(uuid::Uuid);

impl PeerId {
    /// Creates a new random `PeerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
