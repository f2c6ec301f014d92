//! Readiness multiplexers.
//!
//! - [`poll`]: `poll(2)` over a `pollfd` array, no descriptor limit
//! - [`select`]: `select(2)` over an `fd_set`, limited to `FD_SETSIZE`
//!
//! Both are level-triggered and read-only: they answer which watched
//! handles have data (or a pending connection, or an error) right now.

pub mod poll;
pub mod select;

pub use self::poll::PollPoller;
pub use self::select::SelectPoller;

use crate::error::Result;
use crate::reactor::event::{InterestSet, ReadinessReport};

use std::os::fd::RawFd;
use std::time::Duration;

/// The single suspension point of the event loop.
pub trait Multiplexer {
    /// Blocks until a handle of `interest` is read-ready or `timeout` elapses.
    ///
    /// `None` waits forever. A timeout or an interrupted wait yields an empty
    /// report; any other failure is [`crate::Error::Poll`] and fatal.
    fn wait(&mut self, interest: &InterestSet, timeout: Option<Duration>)
    -> Result<ReadinessReport>;

    /// Whether `handle` can be placed in an interest set at all.
    ///
    /// The loop rejects a new connection this answers `false` for instead of
    /// letting the next wait fail.
    fn accepts(&self, _handle: RawFd) -> bool {
        true
    }
}

impl<M: Multiplexer + ?Sized> Multiplexer for Box<M> {
    fn wait(
        &mut self,
        interest: &InterestSet,
        timeout: Option<Duration>,
    ) -> Result<ReadinessReport> {
        (**self).wait(interest, timeout)
    }

    fn accepts(&self, handle: RawFd) -> bool {
        (**self).accepts(handle)
    }
}
