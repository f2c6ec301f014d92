use crate::reactor::io::{Connection, Source};

use libc::{c_int, close, recv, send};
use std::io;
use std::os::fd::{AsRawFd, RawFd};

#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: c_int = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: c_int = 0;

/// An accepted connection. Closing happens on drop.
#[derive(Debug)]
pub struct TcpStream {
    file_descriptor: RawFd,
}

impl TcpStream {
    pub(crate) fn from_raw(file_descriptor: RawFd) -> Self {
        Self { file_descriptor }
    }

    /// One `recv(2)` of at most `buf.len()` bytes. `Ok(0)` means the peer
    /// shut its side down.
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let res = unsafe { recv(self.file_descriptor, buf.as_mut_ptr() as *mut _, buf.len(), 0) };

        if res < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(res as usize)
    }

    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        let res = unsafe {
            send(
                self.file_descriptor,
                buf.as_ptr() as *const _,
                buf.len(),
                SEND_FLAGS,
            )
        };

        if res < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(res as usize)
    }
}

impl AsRawFd for TcpStream {
    fn as_raw_fd(&self) -> RawFd {
        self.file_descriptor
    }
}

impl Source for TcpStream {
    fn handle(&self) -> RawFd {
        self.file_descriptor
    }
}

impl Connection for TcpStream {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        TcpStream::recv(self, buf)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        TcpStream::send(self, buf)
    }
}

impl Drop for TcpStream {
    fn drop(&mut self) {
        unsafe {
            close(self.file_descriptor);
        }
    }
}
