use crate::error::{Error, Result};
use crate::reactor::event::{InterestSet, ReadinessReport};
use crate::reactor::poller::Multiplexer;

use libc::{POLLERR, POLLHUP, POLLIN, POLLNVAL, c_int, nfds_t, poll, pollfd};
use std::io;
use std::time::Duration;
use tracing::warn;

/// Any of these in `revents` reports the handle ready, so the next `accept`
/// or `recv` surfaces what happened to it.
const READABLE: i16 = POLLIN | POLLERR | POLLHUP | POLLNVAL;

/// `poll(2)`-backed multiplexer.
///
/// The `pollfd` array is refilled from the interest set on every wait; only
/// its allocation survives between calls.
#[derive(Debug, Default)]
pub struct PollPoller {
    fds: Vec<pollfd>,
}

impl PollPoller {
    pub fn new() -> Self {
        Self { fds: Vec::new() }
    }
}

impl Multiplexer for PollPoller {
    fn wait(
        &mut self,
        interest: &InterestSet,
        timeout: Option<Duration>,
    ) -> Result<ReadinessReport> {
        self.fds.clear();
        self.fds.extend(interest.iter().map(|fd| pollfd {
            fd,
            events: POLLIN,
            revents: 0,
        }));

        let ret = unsafe {
            poll(
                self.fds.as_mut_ptr(),
                self.fds.len() as nfds_t,
                timeout_ms(timeout),
            )
        };

        let mut report = ReadinessReport::empty();

        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(report);
            }

            return Err(Error::Poll(err));
        }

        if ret == 0 {
            return Ok(report);
        }

        for entry in self.fds.iter().filter(|entry| entry.revents & READABLE != 0) {
            if entry.revents & POLLNVAL != 0 {
                warn!(fd = entry.fd, "watched handle is not an open descriptor");
            }

            if entry.fd == interest.listener() {
                report.set_listener_ready();
            } else {
                report.set_ready(entry.fd);
            }
        }

        Ok(report)
    }
}

/// Milliseconds for `poll(2)`, rounding up so a short timeout never turns
/// into a busy loop. `-1` blocks forever.
fn timeout_ms(timeout: Option<Duration>) -> c_int {
    match timeout {
        None => -1,
        Some(duration) => {
            let mut ms = duration.as_millis();
            if duration.subsec_nanos() % 1_000_000 != 0 {
                ms += 1;
            }

            ms.min(c_int::MAX as u128) as c_int
        }
    }
}
