//! TCP networking primitives.
//!
//! Blocking-free socket owners for the event loop:
//! - [`tcp_listener`]: [`TcpListener`] for accepting connections
//! - [`tcp_stream`]: [`TcpStream`] for receiving and sending data
//! - [`utils`]: Address conversion and descriptor flag helpers
//!
//! Both types close their descriptor on drop, so removing a connection from
//! the table is what closes it.
//!
//! [`TcpListener`]: tcp_listener::TcpListener
//! [`TcpStream`]: tcp_stream::TcpStream

pub mod tcp_listener;
pub mod tcp_stream;
pub(crate) mod utils;
