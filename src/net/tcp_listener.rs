//! TCP listener for accepting incoming connections.
//!
//! # Usage
//!
//! ```ignore
//! use pollserve::net::tcp_listener::TcpListener;
//!
//! let listener = TcpListener::bind("127.0.0.1:0", 5)?;
//! println!("Listening on {}", listener.local_addr()?);
//! ```
use crate::error::{Error, Result};
use crate::net::tcp_stream::TcpStream;
use crate::net::utils::{parse_sockaddr, set_nonblocking, sockaddr_to_socketaddr};
use crate::reactor::io::{Listen, Source};

use libc::{
    AF_INET, SO_REUSEADDR, SOCK_STREAM, SOL_SOCKET, accept, bind, c_int, close, getsockname,
    listen, setsockopt, sockaddr, sockaddr_in, socket, socklen_t,
};
use std::io;
use std::mem;
use std::net::SocketAddr;
use std::os::fd::{AsRawFd, RawFd};

/// The passive socket of the server.
///
/// The descriptor is non-blocking: `accept` is only attempted once the
/// multiplexer reports the listener readable, and a connection that vanished
/// in between surfaces as [`io::ErrorKind::WouldBlock`] instead of a stall.
#[derive(Debug)]
pub struct TcpListener {
    file_descriptor: RawFd,
}

impl TcpListener {
    /// Binds a listener to the given address.
    ///
    /// This method performs the following:
    /// 1. Creates a new socket
    /// 2. Enables `SO_REUSEADDR` so a restarted server can rebind at once
    /// 3. Sets it to non-blocking mode
    /// 4. Binds to the specified address
    /// 5. Starts listening with the given backlog
    ///
    /// # Arguments
    /// * `address` - Address to bind to, format: "ip:port" (e.g., "127.0.0.1:1234")
    /// * `backlog` - Length of the kernel queue of completed handshakes
    ///
    /// # Errors
    /// [`Error::InvalidAddress`] when `address` is not an IPv4 socket address,
    /// [`Error::Bind`] when any of the socket calls fails.
    pub fn bind(address: &str, backlog: i32) -> Result<Self> {
        let addr = parse_sockaddr(address)?;
        let bind_error = |source: io::Error| Error::Bind {
            address: address.to_string(),
            source,
        };

        let file_descriptor = unsafe { socket(AF_INET, SOCK_STREAM, 0) };
        if file_descriptor < 0 {
            return Err(bind_error(io::Error::last_os_error()));
        }

        // Owned from here on, so every early return closes the socket.
        let listener = Self { file_descriptor };

        let yes: c_int = 1;
        let ret = unsafe {
            setsockopt(
                file_descriptor,
                SOL_SOCKET,
                SO_REUSEADDR,
                &yes as *const c_int as *const _,
                mem::size_of::<c_int>() as socklen_t,
            )
        };
        if ret < 0 {
            return Err(bind_error(io::Error::last_os_error()));
        }

        set_nonblocking(file_descriptor).map_err(bind_error)?;

        let ret = unsafe {
            bind(
                file_descriptor,
                &addr as *const sockaddr_in as *const sockaddr,
                mem::size_of::<sockaddr_in>() as socklen_t,
            )
        };
        if ret < 0 {
            return Err(bind_error(io::Error::last_os_error()));
        }

        let ret = unsafe { listen(file_descriptor, backlog) };
        if ret < 0 {
            return Err(bind_error(io::Error::last_os_error()));
        }

        Ok(listener)
    }

    /// Accepts one pending connection.
    ///
    /// The returned stream is switched to non-blocking mode so a spurious
    /// readiness report can never stall the loop inside `recv`.
    pub fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        let mut addr: sockaddr_in = unsafe { mem::zeroed() };
        let mut length = mem::size_of::<sockaddr_in>() as socklen_t;

        let client = unsafe {
            accept(
                self.file_descriptor,
                &mut addr as *mut sockaddr_in as *mut sockaddr,
                &mut length,
            )
        };
        if client < 0 {
            return Err(io::Error::last_os_error());
        }

        let stream = TcpStream::from_raw(client);
        set_nonblocking(client)?;

        Ok((stream, sockaddr_to_socketaddr(&addr)))
    }

    /// Returns the local address this listener is bound to.
    ///
    /// # Example
    /// ```text
    /// let listener = TcpListener::bind("127.0.0.1:0", 5)?;
    /// println!("Listening on {}", listener.local_addr()?);
    /// ```
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        let mut addr: sockaddr_in = unsafe { mem::zeroed() };
        let mut length = mem::size_of::<sockaddr_in>() as socklen_t;
        let result = unsafe {
            getsockname(
                self.file_descriptor,
                &mut addr as *mut sockaddr_in as *mut sockaddr,
                &mut length,
            )
        };

        if result < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(sockaddr_to_socketaddr(&addr))
    }
}

impl AsRawFd for TcpListener {
    fn as_raw_fd(&self) -> RawFd {
        self.file_descriptor
    }
}

impl Source for TcpListener {
    fn handle(&self) -> RawFd {
        self.file_descriptor
    }
}

impl Listen for TcpListener {
    type Conn = TcpStream;

    fn accept(&mut self) -> io::Result<(TcpStream, Option<SocketAddr>)> {
        TcpListener::accept(self).map(|(stream, peer)| (stream, Some(peer)))
    }
}

impl Drop for TcpListener {
    fn drop(&mut self) {
        unsafe {
            close(self.file_descriptor);
        }
    }
}
