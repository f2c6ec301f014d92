//! Readiness-driven event loop.
//!
//! This module provides the single-threaded server core:
//! - [`core`]: The event loop itself
//! - [`event`]: Interest sets and readiness reports
//! - [`io`]: Listener and connection traits, slot occupants
//! - [`poller`]: `poll(2)` and `select(2)` multiplexers
//! - [`table`]: The fixed-capacity connection table

pub mod core;
pub mod event;
pub mod io;
pub mod poller;
pub mod table;
