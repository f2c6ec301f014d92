//! `pollserve` — single-threaded multiplexing TCP server.
//!
//! Accepts up to `--capacity` clients, logs every line they send and drops a
//! client that sends `close`. Clients arriving while the table is full get
//! `bye` and are disconnected at once.
//!
//! # Usage
//!
//! ```text
//! pollserve [OPTIONS]
//!
//! Options:
//!   --bind         <IP>      Address to listen on [default: 0.0.0.0]
//!   --port         <PORT>    TCP port [default: 1234]
//!   --backlog      <N>       Kernel listen backlog [default: capacity]
//!   --capacity     <N>       Maximum simultaneous clients [default: 5]
//!   --buffer-size  <BYTES>   Bytes taken per read [default: 200]
//!   --timeout-secs <SECS>    Idle wait timeout, 0 waits forever [default: 30]
//!   --poller       <KIND>    poll | select [default: poll]
//!   --dispatch     <POLICY>  sweep-all | one-per-wakeup [default: sweep-all]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pollserve::reactor::poller::{Multiplexer, PollPoller, SelectPoller};
use pollserve::{
    DEFAULT_CAPACITY, DEFAULT_RECEIVE_BUFFER_SIZE, DispatchPolicy, ServerBuilder, WaitPolicy,
    signal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PollerKind {
    Poll,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DispatchKind {
    SweepAll,
    OnePerWakeup,
}

/// Single-threaded TCP server multiplexing a fixed set of connections.
#[derive(Debug, Parser)]
#[command(name = "pollserve", version)]
struct Cli {
    /// IPv4 address to listen on.
    #[arg(long, default_value = "0.0.0.0", env = "POLLSERVE_BIND")]
    bind: String,

    #[arg(long, default_value_t = 1234, env = "POLLSERVE_PORT")]
    port: u16,

    /// Kernel listen backlog; defaults to the capacity.
    #[arg(long, env = "POLLSERVE_BACKLOG")]
    backlog: Option<i32>,

    /// Maximum number of simultaneously connected clients.
    #[arg(long, default_value_t = DEFAULT_CAPACITY, env = "POLLSERVE_CAPACITY")]
    capacity: usize,

    /// Upper bound on the bytes taken by a single read.
    #[arg(long, default_value_t = DEFAULT_RECEIVE_BUFFER_SIZE, env = "POLLSERVE_BUFFER_SIZE")]
    buffer_size: usize,

    /// How long one wait may idle before looping; 0 blocks until something is ready.
    #[arg(long, default_value_t = 30, env = "POLLSERVE_TIMEOUT_SECS")]
    timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = PollerKind::Poll, env = "POLLSERVE_POLLER")]
    poller: PollerKind,

    #[arg(long, value_enum, default_value_t = DispatchKind::SweepAll, env = "POLLSERVE_DISPATCH")]
    dispatch: DispatchKind,
}

impl Cli {
    fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    fn builder(&self) -> ServerBuilder {
        let wait_policy = match self.timeout_secs {
            0 => WaitPolicy::Indefinite,
            secs => WaitPolicy::Bounded(Duration::from_secs(secs)),
        };
        let dispatch = match self.dispatch {
            DispatchKind::SweepAll => DispatchPolicy::SweepAll,
            DispatchKind::OnePerWakeup => DispatchPolicy::OnePerWakeup,
        };

        let builder = ServerBuilder::new()
            .capacity(self.capacity)
            .receive_buffer_size(self.buffer_size)
            .wait_policy(wait_policy)
            .dispatch(dispatch);

        match self.backlog {
            Some(backlog) => builder.backlog(backlog),
            None => builder,
        }
    }

    fn multiplexer(&self) -> Box<dyn Multiplexer> {
        match self.poller {
            PollerKind::Poll => Box::new(PollPoller::new()),
            PollerKind::Select => Box::new(SelectPoller::new()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let address = cli.address();

    let mut reactor = cli
        .builder()
        .bind_with(&address, cli.multiplexer())
        .with_context(|| format!("failed to start server on {address}"))?;

    let shutdown = signal::install().context("failed to install signal handlers")?;

    info!(
        address = %reactor.listener().local_addr().context("listener has no local address")?,
        poller = ?cli.poller,
        "server listening"
    );

    reactor.run(shutdown).context("event loop terminated")?;

    info!("server stopped");
    Ok(())
}
