//! Connection lifecycle shared by both facades.
//!
//! A connection moves `Disconnected -> Connecting -> {Connected | Failed}` and
//! never goes back. The state is written by the single task running the
//! connection attempt and read by everyone else, so it lives in an atomic.

use shared::{Error, Result};
use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Failed = 3,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnectionState::Disconnected,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Failed,
        }
    }

    /// Connected and Failed are never left.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Current state plus the error that caused a failure, if any.
#[derive(Debug)]
pub struct ConnectionStatus {
    state: AtomicU8,
    last_error: OnceLock<Error>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
            last_error: OnceLock::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.get()
    }

    /// `Error::StoreUnavailable` unless the connection is up.
    pub fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::StoreUnavailable)
        }
    }

    /// Claims the connection attempt. Only one caller ever wins.
    pub fn begin(&self) -> Result<()> {
        if self.transition(ConnectionState::Disconnected, ConnectionState::Connecting) {
            Ok(())
        } else {
            Err(Error::AlreadyInitialized)
        }
    }

    pub fn succeed(&self) -> bool {
        self.transition(ConnectionState::Connecting, ConnectionState::Connected)
    }

    /// Records `error` and moves to Failed.
    pub fn fail(&self, error: Error) -> bool {
        if self.state() != ConnectionState::Connecting {
            return false;
        }
        // Error first so that anyone observing Failed also sees the cause.
        let _ = self.last_error.set(error);
        self.transition(ConnectionState::Connecting, ConnectionState::Failed)
    }

    fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
