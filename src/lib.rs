//! Single-threaded TCP server built around a readiness multiplexer.
//!
//! One control loop watches the listening socket and every admitted connection
//! through `poll(2)` or `select(2)`, admits new clients while a slot is free,
//! reads from the ones that became readable and closes those that hung up,
//! reset, or asked to leave with the `close` sentinel.
//!
//! # Architecture
//!
//! - **ServerBuilder**: Fluent configuration producing a [`Config`] or a bound [`Reactor`]
//! - **TcpListener / TcpStream**: Thin owners of the raw socket descriptors
//! - **ConnectionTable**: Fixed-capacity slot registry, iterated in slot order
//! - **Multiplexer**: `PollPoller` and `SelectPoller` behind one trait
//! - **Reactor**: The event loop, one [`Turn`] per wake-up
//! - **frame**: Recognises the `close` sentinel in received payloads

mod builder;
mod config;
mod error;
pub mod frame;
pub mod net;
pub mod reactor;
pub mod signal;
mod utils;

pub use builder::ServerBuilder;
pub use config::{
    Config, DEFAULT_CAPACITY, DEFAULT_IDLE_TIMEOUT, DEFAULT_RECEIVE_BUFFER_SIZE,
    DEFAULT_REJECTION_NOTICE, DispatchPolicy, WaitPolicy,
};
pub use error::{Error, Result};
pub use reactor::core::{CloseReason, LoopState, Reactor, Turn};
