use crate::config::{Config, DispatchPolicy};
use crate::error::{Error, Result};
use crate::frame::{self, Verdict};
use crate::reactor::event::InterestSet;
use crate::reactor::io::{Connection, Connexion, Listen, Source};
use crate::reactor::poller::Multiplexer;
use crate::reactor::table::ConnectionTable;

use std::io;
use std::mem;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, debug_span, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Why a connection left the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Zero-length read.
    PeerShutdown,
    /// `recv` failed with a connection reset.
    Reset,
    /// The peer sent the `close` sentinel.
    Sentinel,
    /// Swept when the loop terminated.
    Shutdown,
}

/// What one iteration of the loop did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    /// The wait returned with nothing ready.
    pub idle: bool,
    /// `(slot, handle)` of a connection admitted during this turn.
    pub admitted: Option<(usize, RawFd)>,
    /// A connection was accepted, sent the rejection notice and closed,
    /// either because the table was full or because the multiplexer cannot
    /// watch its handle.
    pub rejected: bool,
    /// Slots that got their single `recv`, ascending.
    pub serviced: Vec<usize>,
    /// Slots emptied this turn and why.
    pub closed: Vec<(usize, CloseReason)>,
}

/// The event loop.
///
/// Owns the listener, the multiplexer and the connection table. Each call to
/// [`Reactor::turn`] is one wake-up: wait, admit, then read every ready
/// connection once in slot order.
pub struct Reactor<L: Listen, M> {
    listener: L,
    multiplexer: M,
    table: ConnectionTable<L::Conn>,
    config: Config,
    buffer: Vec<u8>,
    state: LoopState,
}

impl<L: Listen, M: Multiplexer> Reactor<L, M> {
    /// # Errors
    /// [`Error::InvalidConfig`] when `config` fails [`Config::validate`].
    pub fn new(listener: L, multiplexer: M, config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            listener,
            multiplexer,
            table: ConnectionTable::new(config.capacity),
            buffer: vec![0u8; config.receive_buffer_size],
            config,
            state: LoopState::Running,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn table(&self) -> &ConnectionTable<L::Conn> {
        &self.table
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Listener plus every occupied slot, in slot order.
    pub fn interest_set(&self) -> InterestSet {
        let mut interest =
            InterestSet::with_capacity(self.listener.handle(), self.table.active_count());
        for (_, handle) in self.table.iter() {
            interest.push(handle);
        }

        interest
    }

    /// Runs until `shutdown` is raised or the multiplexer fails.
    ///
    /// The flag is checked before every wait, so with a bounded wait policy
    /// shutdown is noticed within one timeout; an indefinite wait relies on
    /// the signal interrupting it. Either way every remaining connection is
    /// closed before returning.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        info!(
            capacity = self.config.capacity,
            policy = ?self.config.wait_policy,
            dispatch = ?self.config.dispatch,
            "event loop running"
        );

        while !shutdown.load(Ordering::Relaxed) {
            self.turn()?;
        }

        info!("shutdown requested");
        self.shutdown();

        Ok(())
    }

    /// One iteration: wait, admit, dispatch.
    ///
    /// # Errors
    /// [`Error::Terminated`] once the loop has stopped, or the multiplexer
    /// failure that stopped it. In the latter case every connection has
    /// already been closed.
    pub fn turn(&mut self) -> Result<Turn> {
        if self.state == LoopState::Terminated {
            return Err(Error::Terminated);
        }

        let interest = self.interest_set();
        let report = match self
            .multiplexer
            .wait(&interest, self.config.wait_policy.timeout())
        {
            Ok(report) => report,
            Err(err) => {
                error!(error = %err, "readiness wait failed, terminating");
                self.shutdown();
                return Err(err);
            }
        };

        let mut turn = Turn::default();

        if report.is_empty() {
            debug!("wait returned with nothing ready");
            turn.idle = true;
            return Ok(turn);
        }

        // Decided before admission: a connection accepted below is first
        // read on a later turn.
        let ready: Vec<(usize, RawFd)> = self
            .table
            .iter()
            .filter(|&(_, handle)| report.is_ready(handle))
            .collect();

        if report.listener_ready() {
            self.admit(&mut turn);
        }

        let budget = match self.config.dispatch {
            DispatchPolicy::SweepAll => ready.len(),
            DispatchPolicy::OnePerWakeup => 1,
        };

        for (index, handle) in ready.into_iter().take(budget) {
            turn.serviced.push(index);

            if let Some(reason) = self.service(index, handle) {
                self.close(index, reason);
                turn.closed.push((index, reason));
            }
        }

        Ok(turn)
    }

    /// Closes every remaining connection and stops the loop.
    pub fn shutdown(&mut self) -> Vec<(usize, CloseReason)> {
        self.state = LoopState::Terminated;

        self.table
            .drain()
            .into_iter()
            .map(|(index, connexion)| {
                info!(
                    slot = index,
                    fd = connexion.handle(),
                    peer = ?connexion.peer(),
                    "closing connection on shutdown"
                );
                (index, CloseReason::Shutdown)
            })
            .collect()
    }

    fn admit(&mut self, turn: &mut Turn) {
        let (mut stream, peer) = match self.listener.accept() {
            Ok(accepted) => accepted,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                debug!("listener readable but nothing to accept");
                return;
            }
            Err(err) => {
                warn!(error = %err, "accept failed");
                return;
            }
        };

        let handle = stream.handle();

        if !self.multiplexer.accepts(handle) {
            info!(fd = handle, peer = ?peer, "handle cannot be watched, rejecting");
            self.reject(&mut stream, handle, turn);
            return;
        }

        let index = match self.table.find_free_slot() {
            Some(index) if !self.table.is_full() => index,
            _ => {
                info!(fd = handle, peer = ?peer, "connection limit reached, rejecting");
                self.reject(&mut stream, handle, turn);
                return;
            }
        };

        match self.table.insert(Connexion::new(stream, peer), index) {
            Ok(()) => {
                info!(
                    slot = index,
                    fd = handle,
                    peer = ?peer,
                    active = self.table.active_count(),
                    "accepted connection"
                );
                turn.admitted = Some((index, handle));
            }
            Err((err @ Error::DuplicateHandle(_), connexion)) => {
                warn!(fd = handle, error = %err, "could not register connection");
                // The occupied slot owns this descriptor; it must stay open.
                mem::forget(connexion);
            }
            Err((err, _)) => warn!(fd = handle, error = %err, "could not register connection"),
        }
    }

    /// Sends the rejection notice; the caller drops `stream` afterwards.
    fn reject(&self, stream: &mut L::Conn, handle: RawFd, turn: &mut Turn) {
        if let Err(err) = stream.send(&self.config.rejection_notice) {
            warn!(fd = handle, error = %err, "failed to send rejection notice");
        }
        turn.rejected = true;
    }

    /// Exactly one `recv` on slot `index`. Returns why the slot must close,
    /// if it must.
    fn service(&mut self, index: usize, handle: RawFd) -> Option<CloseReason> {
        let _span = debug_span!("connection", slot = index, fd = handle).entered();

        let connexion = self.table.get_mut(index)?;

        match connexion.stream_mut().recv(&mut self.buffer) {
            Ok(0) => Some(CloseReason::PeerShutdown),
            Ok(n) => match frame::interpret(&self.buffer[..n]) {
                Verdict::Disconnect => Some(CloseReason::Sentinel),
                Verdict::Continue => None,
            },
            Err(err) if err.kind() == io::ErrorKind::ConnectionReset => Some(CloseReason::Reset),
            Err(err) => {
                warn!(error = %err, "recv failed, keeping connection");
                None
            }
        }
    }

    fn close(&mut self, index: usize, reason: CloseReason) {
        if let Some(connexion) = self.table.remove(index) {
            info!(
                slot = index,
                fd = connexion.handle(),
                peer = ?connexion.peer(),
                ?reason,
                active = self.table.active_count(),
                "connection closed"
            );
        }
    }
}
