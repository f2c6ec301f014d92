use std::os::fd::RawFd;

/// Handles one readiness wait watches for read-readiness.
///
/// Always contains the listener; the remaining handles mirror the occupied
/// connection slots in ascending slot order. Rebuilt before every wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestSet {
    listener: RawFd,
    handles: Vec<RawFd>,
}

impl InterestSet {
    pub fn new(listener: RawFd) -> Self {
        Self {
            listener,
            handles: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(listener: RawFd, capacity: usize) -> Self {
        Self {
            listener,
            handles: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, handle: RawFd) {
        self.handles.push(handle);
    }

    pub fn listener(&self) -> RawFd {
        self.listener
    }

    /// Connection handles, without the listener.
    pub fn handles(&self) -> &[RawFd] {
        &self.handles
    }

    /// Listener first, then every connection handle.
    pub fn iter(&self) -> impl Iterator<Item = RawFd> + '_ {
        std::iter::once(self.listener).chain(self.handles.iter().copied())
    }

    pub fn contains(&self, handle: RawFd) -> bool {
        handle == self.listener || self.handles.contains(&handle)
    }

    /// Number of watched handles, listener included.
    pub fn len(&self) -> usize {
        self.handles.len() + 1
    }
}

/// Outcome of one readiness wait.
///
/// An empty report is what a bounded wait returns when it times out, and
/// what an interrupted wait collapses to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessReport {
    listener_ready: bool,
    ready: Vec<RawFd>,
}

impl ReadinessReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_listener_ready(&mut self) {
        self.listener_ready = true;
    }

    pub fn set_ready(&mut self, handle: RawFd) {
        if !self.ready.contains(&handle) {
            self.ready.push(handle);
        }
    }

    /// Builder form of [`Self::set_listener_ready`].
    pub fn with_listener(mut self) -> Self {
        self.set_listener_ready();
        self
    }

    /// Builder form of [`Self::set_ready`].
    pub fn with_ready(mut self, handle: RawFd) -> Self {
        self.set_ready(handle);
        self
    }

    pub fn listener_ready(&self) -> bool {
        self.listener_ready
    }

    pub fn is_ready(&self, handle: RawFd) -> bool {
        self.ready.contains(&handle)
    }

    pub fn ready_handles(&self) -> &[RawFd] {
        &self.ready
    }

    pub fn is_empty(&self) -> bool {
        !self.listener_ready && self.ready.is_empty()
    }
}
