//! Runtime parameters of the event loop.

use crate::error::{Error, Result};

use std::time::Duration;

pub const DEFAULT_CAPACITY: usize = 5;
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 200;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REJECTION_NOTICE: &[u8] = b"bye";

/// How long a single readiness wait may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Give up after the duration and report nothing ready.
    Bounded(Duration),
    /// Block until at least one handle is ready.
    Indefinite,
}

impl WaitPolicy {
    /// Timeout to hand to the multiplexer, `None` meaning forever.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            WaitPolicy::Bounded(duration) => Some(*duration),
            WaitPolicy::Indefinite => None,
        }
    }
}

/// How many ready connections one wake-up services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Service the listener, then every ready connection once, in slot order.
    #[default]
    SweepAll,
    /// Service the listener, then only the lowest ready slot.
    ///
    /// Later ready connections wait for the next wake-up and can starve on a
    /// busy server. Kept for reproducing the classic early-exit poll loop.
    OnePerWakeup,
}

/// Event loop configuration, usually produced by [`crate::ServerBuilder`].
///
/// [`crate::Reactor::new`] refuses a configuration that fails
/// [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub capacity: usize,
    pub receive_buffer_size: usize,
    pub wait_policy: WaitPolicy,
    pub dispatch: DispatchPolicy,
    pub backlog: i32,
    pub rejection_notice: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            wait_policy: WaitPolicy::Bounded(DEFAULT_IDLE_TIMEOUT),
            dispatch: DispatchPolicy::SweepAll,
            backlog: DEFAULT_CAPACITY as i32,
            rejection_notice: DEFAULT_REJECTION_NOTICE.to_vec(),
        }
    }
}

impl Config {
    /// Checks the parameters the event loop depends on.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] when the capacity or the receive buffer is zero,
    /// or the backlog is negative.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1"));
        }
        // A zero-length buffer makes every `recv` return 0, which reads as a
        // peer shutdown.
        if self.receive_buffer_size == 0 {
            return Err(Error::InvalidConfig("receive buffer size must be at least 1"));
        }
        if self.backlog < 0 {
            return Err(Error::InvalidConfig("backlog must not be negative"));
        }

        Ok(())
    }
}
