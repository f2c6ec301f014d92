//! Connection-side abstractions the event loop is written against.
//!
//! The real implementations are [`crate::net::tcp_listener::TcpListener`] and
//! [`crate::net::tcp_stream::TcpStream`]; tests plug in scripted ones.
//! Dropping a value closes the underlying handle.

use std::io;
use std::net::SocketAddr;
use std::os::fd::RawFd;

/// Anything that can sit in the interest set.
pub trait Source {
    fn handle(&self) -> RawFd;
}

/// An admitted connection.
pub trait Connection: Source {
    /// One receive of at most `buf.len()` bytes. `Ok(0)` is an orderly
    /// shutdown by the peer.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// The listening endpoint.
pub trait Listen: Source {
    type Conn: Connection;

    fn accept(&mut self) -> io::Result<(Self::Conn, Option<SocketAddr>)>;
}

/// Occupant of a connection table slot.
#[derive(Debug)]
pub struct Connexion<C> {
    stream: C,
    peer: Option<SocketAddr>,
}

impl<C: Source> Connexion<C> {
    pub fn new(stream: C, peer: Option<SocketAddr>) -> Self {
        Self { stream, peer }
    }

    pub fn handle(&self) -> RawFd {
        self.stream.handle()
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn stream(&self) -> &C {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut C {
        &mut self.stream
    }
}
