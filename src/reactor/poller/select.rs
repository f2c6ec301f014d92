use crate::error::{Error, Result};
use crate::reactor::event::{InterestSet, ReadinessReport};
use crate::reactor::poller::Multiplexer;

use libc::{FD_ISSET, FD_SET, FD_SETSIZE, FD_ZERO, fd_set, select, suseconds_t, time_t, timeval};
use std::io;
use std::mem;
use std::os::fd::RawFd;
use std::ptr;
use std::time::Duration;

/// `select(2)`-backed multiplexer.
///
/// The `fd_set` is rebuilt on the stack for every wait. Handles at or above
/// `FD_SETSIZE` cannot be represented: [`Multiplexer::accepts`] refuses them
/// and a wait that is handed one fails.
#[derive(Debug, Default)]
pub struct SelectPoller;

impl SelectPoller {
    pub fn new() -> Self {
        Self
    }
}

impl Multiplexer for SelectPoller {
    fn wait(
        &mut self,
        interest: &InterestSet,
        timeout: Option<Duration>,
    ) -> Result<ReadinessReport> {
        let mut readable: fd_set = unsafe { mem::zeroed() };
        unsafe { FD_ZERO(&mut readable) };

        let mut max_fd = -1;
        for fd in interest.iter() {
            if !self.accepts(fd) {
                return Err(Error::HandleOutOfRange(fd));
            }

            unsafe { FD_SET(fd, &mut readable) };
            max_fd = max_fd.max(fd);
        }

        let mut tv = timeout.map(|duration| timeval {
            tv_sec: duration.as_secs().min(time_t::MAX as u64) as time_t,
            tv_usec: duration.subsec_micros() as suseconds_t,
        });
        let tv_ptr = tv
            .as_mut()
            .map_or(ptr::null_mut(), |tv| tv as *mut timeval);

        let ret = unsafe {
            select(
                max_fd + 1,
                &mut readable,
                ptr::null_mut(),
                ptr::null_mut(),
                tv_ptr,
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

        if unsafe { FD_ISSET(interest.listener(), &readable) } {
            report.set_listener_ready();
        }

        for &fd in interest.handles() {
            if unsafe { FD_ISSET(fd, &readable) } {
                report.set_ready(fd);
            }
        }

        Ok(report)
    }

    fn accepts(&self, handle: RawFd) -> bool {
        handle >= 0 && (handle as usize) < FD_SETSIZE as usize
    }
}
