//! Scripted stand-ins for the listener, connections and multiplexer.
//!
//! Everything records into one shared [`Wire`] so a test can check which
//! handles were read, written and closed, and which interest sets the loop
//! waited on.
#![allow(dead_code)]

use pollserve::reactor::event::{InterestSet, ReadinessReport};
use pollserve::reactor::io::{Connection, Listen, Source};
use pollserve::reactor::poller::Multiplexer;
use pollserve::{Config, Error, Reactor, Result, Turn};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::os::fd::RawFd;
use std::rc::Rc;
use std::time::Duration;

pub const LISTENER_FD: RawFd = 3;

/// What the next `recv` on a fake connection returns.
pub enum Step {
    Data(&'static [u8]),
    Eof,
    Fail(io::ErrorKind),
}

#[derive(Default)]
pub struct Wire {
    pub backlog: VecDeque<FakeConn>,
    pub reports: VecDeque<Result<ReadinessReport>>,
    pub waits: Vec<(InterestSet, Option<Duration>)>,
    pub recv_calls: Vec<RawFd>,
    pub sent: Vec<(RawFd, Vec<u8>)>,
    pub closed: Vec<RawFd>,
    /// Handles at or above this are refused by the multiplexer.
    pub handle_limit: Option<RawFd>,
}

pub type Shared = Rc<RefCell<Wire>>;

pub fn wire() -> Shared {
    Rc::new(RefCell::new(Wire::default()))
}

/// Queues a pending connection on the fake listener.
pub fn connect(wire: &Shared, fd: RawFd, steps: Vec<Step>) {
    let conn = FakeConn {
        fd,
        steps: steps.into(),
        wire: wire.clone(),
    };
    wire.borrow_mut().backlog.push_back(conn);
}

/// Queues the outcome of the next wait.
pub fn report(wire: &Shared, report: ReadinessReport) {
    wire.borrow_mut().reports.push_back(Ok(report));
}

pub fn fail_wait(wire: &Shared, err: Error) {
    wire.borrow_mut().reports.push_back(Err(err));
}

pub fn limit_handles(wire: &Shared, limit: RawFd) {
    wire.borrow_mut().handle_limit = Some(limit);
}

pub fn closed(wire: &Shared) -> Vec<RawFd> {
    wire.borrow().closed.clone()
}

pub fn recv_calls(wire: &Shared) -> Vec<RawFd> {
    wire.borrow().recv_calls.clone()
}

pub struct FakeConn {
    fd: RawFd,
    steps: VecDeque<Step>,
    wire: Shared,
}

impl Source for FakeConn {
    fn handle(&self) -> RawFd {
        self.fd
    }
}

impl Connection for FakeConn {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.wire.borrow_mut().recv_calls.push(self.fd);

        match self.steps.pop_front() {
            Some(Step::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Step::Fail(kind)) => Err(io::Error::from(kind)),
            Some(Step::Eof) | None => Ok(0),
        }
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.wire.borrow_mut().sent.push((self.fd, buf.to_vec()));
        Ok(buf.len())
    }
}

impl Drop for FakeConn {
    fn drop(&mut self) {
        self.wire.borrow_mut().closed.push(self.fd);
    }
}

pub struct FakeListener {
    wire: Shared,
}

impl Source for FakeListener {
    fn handle(&self) -> RawFd {
        LISTENER_FD
    }
}

impl Listen for FakeListener {
    type Conn = FakeConn;

    fn accept(&mut self) -> io::Result<(FakeConn, Option<SocketAddr>)> {
        let conn = self.wire.borrow_mut().backlog.pop_front();

        match conn {
            Some(conn) => Ok((conn, None)),
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }
}

/// Replays queued reports; an exhausted script behaves like a timeout.
pub struct ScriptedMultiplexer {
    wire: Shared,
}

impl Multiplexer for ScriptedMultiplexer {
    fn wait(
        &mut self,
        interest: &InterestSet,
        timeout: Option<Duration>,
    ) -> Result<ReadinessReport> {
        let mut wire = self.wire.borrow_mut();
        wire.waits.push((interest.clone(), timeout));

        wire.reports
            .pop_front()
            .unwrap_or_else(|| Ok(ReadinessReport::empty()))
    }

    fn accepts(&self, handle: RawFd) -> bool {
        self.wire
            .borrow()
            .handle_limit
            .is_none_or(|limit| handle < limit)
    }
}

pub type FakeReactor = Reactor<FakeListener, ScriptedMultiplexer>;

pub fn try_reactor(wire: &Shared, config: Config) -> Result<FakeReactor> {
    Reactor::new(
        FakeListener { wire: wire.clone() },
        ScriptedMultiplexer { wire: wire.clone() },
        config,
    )
}

pub fn reactor(wire: &Shared, config: Config) -> FakeReactor {
    try_reactor(wire, config).expect("valid config")
}

/// Admits every queued connection, one turn each.
pub fn admit_all(reactor: &mut FakeReactor, wire: &Shared) -> Vec<Turn> {
    let mut turns = Vec::new();
    while !wire.borrow().backlog.is_empty() {
        report(wire, ReadinessReport::empty().with_listener());
        turns.push(reactor.turn().expect("turn"));
    }
    turns
}
