//! Per-connection handshake state
//!
//! A session starts [`SessionState::Uninitialized`], answers `initialize`
//! without changing state, and becomes [`SessionState::Ready`] once the
//! client sends `notifications/initialized`. Ready is never left.

use tracing::{debug, info};

/// Protocol version used when the client does not request one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-11-25";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
}

/// Handshake state owned by the serve loop
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    protocol_version: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Adopt the client's requested version verbatim, or keep the default
    pub fn negotiate(&mut self, requested: Option<&str>) -> &str {
        match requested.map(str::trim).filter(|v| !v.is_empty()) {
            Some(version) => {
                debug!("Client requested protocol version {}", version);
                self.protocol_version = version.to_string();
            }
            None => {
                self.protocol_version = DEFAULT_PROTOCOL_VERSION.to_string();
            }
        }
        &self.protocol_version
    }

    pub fn mark_ready(&mut self) {
        if self.state != SessionState::Ready {
            info!("Session ready (protocol {})", self.protocol_version);
            self.state = SessionState::Ready;
        }
    }
}
