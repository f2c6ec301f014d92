//! Fluent builder for server construction.
//!
//! Collects the event loop parameters, validates them into a [`Config`] and
//! optionally binds the listening socket in the same step.

use crate::config::{Config, DispatchPolicy, WaitPolicy};
use crate::error::Result;
use crate::net::tcp_listener::TcpListener;
use crate::reactor::core::Reactor;
use crate::reactor::poller::{Multiplexer, PollPoller};

use std::time::Duration;

/// Builder for [`Config`] and bound [`Reactor`] instances.
///
/// # Example
/// ```ignore
/// let mut reactor = ServerBuilder::new()
///     .capacity(2)
///     .idle_timeout(Duration::from_secs(5))
///     .bind("127.0.0.1:1234")?;
/// ```
pub struct ServerBuilder {
    config: Config,
    backlog: Option<i32>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            backlog: None,
        }
    }

    /// Maximum number of simultaneously admitted connections.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Upper bound on the bytes taken by a single `recv`.
    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.config.receive_buffer_size = size;
        self
    }

    pub fn wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.config.wait_policy = policy;
        self
    }

    /// Shorthand for [`WaitPolicy::Bounded`].
    pub fn idle_timeout(self, timeout: Duration) -> Self {
        self.wait_policy(WaitPolicy::Bounded(timeout))
    }

    pub fn dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    /// Kernel listen backlog. Defaults to the capacity.
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.backlog = Some(backlog);
        self
    }

    /// Payload sent to a connection refused because the table is full.
    pub fn rejection_notice(mut self, notice: impl Into<Vec<u8>>) -> Self {
        self.config.rejection_notice = notice.into();
        self
    }

    /// Validates the collected parameters.
    ///
    /// # Errors
    /// [`crate::Error::InvalidConfig`] when the capacity or the receive buffer is zero,
    /// or the backlog is negative.
    pub fn build(self) -> Result<Config> {
        let mut config = self.config;

        config.backlog = match self.backlog {
            Some(backlog) => backlog,
            None => i32::try_from(config.capacity).unwrap_or(i32::MAX),
        };
        config.validate()?;

        Ok(config)
    }

    /// Binds `address` and returns a reactor driven by `poll(2)`.
    pub fn bind(self, address: &str) -> Result<Reactor<TcpListener, PollPoller>> {
        self.bind_with(address, PollPoller::new())
    }

    /// Binds `address` and returns a reactor driven by the given multiplexer.
    ///
    /// # Arguments
    /// * `address` - IPv4 address to bind, format: "ip:port" (e.g., "0.0.0.0:1234")
    /// * `multiplexer` - Readiness primitive the event loop waits on
    pub fn bind_with<M: Multiplexer>(
        self,
        address: &str,
        multiplexer: M,
    ) -> Result<Reactor<TcpListener, M>> {
        let config = self.build()?;
        let listener = TcpListener::bind(address, config.backlog)?;

        Reactor::new(listener, multiplexer, config)
    }
}
