//! Timeout configuration.
//!
//! Holds the limits applied to the upstream generation call and the
//! client-side timers, expressed as whole seconds or milliseconds so they
//! can be read from a configuration file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for timeout behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum time allowed for one refine call, end to end.
    /// Default: 30 seconds
    pub refine_secs: u64,

    /// Maximum time allowed to establish a connection upstream.
    /// Default: 10 seconds
    pub connect_secs: u64,

    /// How long the "copied" acknowledgement stays visible.
    /// Default: 2000 milliseconds
    pub copy_ack_millis: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            refine_secs: 30,
            connect_secs: 10,
            copy_ack_millis: 2_000,
        }
    }
}

impl TimeoutConfig {
    /// Creates a new TimeoutConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit for one refine call.
    pub fn refine_timeout(&self) -> Duration {
        Duration::from_secs(self.refine_secs.max(1))
    }

    /// Limit for establishing an upstream connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_secs.max(1))
    }

    /// Display window of the copy acknowledgement.
    pub fn copy_ack(&self) -> Duration {
        Duration::from_millis(self.copy_ack_millis)
    }

    /// Sets the refine timeout, rounded down to whole seconds.
    pub fn with_refine_timeout(mut self, timeout: Duration) -> Self {
        self.refine_secs = timeout.as_secs();
        self
    }

    /// Sets the connect timeout, rounded down to whole seconds.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_secs = timeout.as_secs();
        self
    }

    /// Sets the copy acknowledgement window.
    pub fn with_copy_ack(mut self, window: Duration) -> Self {
        self.copy_ack_millis = window.as_millis() as u64;
        self
    }
}
