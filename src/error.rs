use std::io;
use std::os::fd::RawFd;

use thiserror::Error;

/// Errors raised by the server core.
///
/// Per-connection read failures never show up here: the event loop handles
/// them locally. What remains is setup failures, table misuse and the fatal
/// multiplexer failure that ends the loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid IPv4 socket address: {0}")]
    InvalidAddress(String),

    #[error("failed to set up listener on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("readiness wait failed: {0}")]
    Poll(#[source] io::Error),

    #[error("handle {0} is outside the range select(2) can watch")]
    HandleOutOfRange(RawFd),

    #[error("slot {0} is already occupied")]
    SlotOccupied(usize),

    #[error("slot {0} is outside the connection table")]
    SlotOutOfRange(usize),

    #[error("connection table is full")]
    TableFull,

    #[error("handle {0} is already registered in another slot")]
    DuplicateHandle(RawFd),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("event loop has already terminated")]
    Terminated,
}

pub type Result<T> = std::result::Result<T, Error>;
