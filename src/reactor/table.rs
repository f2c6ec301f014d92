//! Fixed-capacity registry of admitted connections.

use crate::error::Error;
use crate::reactor::io::{Connexion, Source};
use crate::utils::slab::Slab;

use std::os::fd::RawFd;
use std::result;

/// Slot index → connection, with a capacity fixed at construction.
///
/// Guarantees that the number of occupied slots never exceeds the capacity
/// and that a handle occupies at most one slot. Iteration is always in
/// ascending slot order, which is the order connections are serviced in.
pub struct ConnectionTable<C> {
    slots: Slab<Connexion<C>>,
}

impl<C: Source> ConnectionTable<C> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Slab::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.active_count() >= self.capacity()
    }

    /// Lowest empty slot, `None` when the table is full.
    pub fn find_free_slot(&self) -> Option<usize> {
        self.slots.first_vacant()
    }

    /// Places `connexion` in slot `index`.
    ///
    /// # Errors
    /// - [`Error::TableFull`] when every slot is occupied
    /// - [`Error::SlotOutOfRange`] when `index >= capacity`
    /// - [`Error::SlotOccupied`] when the slot already holds a connection
    /// - [`Error::DuplicateHandle`] when another slot holds the same handle
    ///
    /// A refused connection is handed back untouched alongside the error.
    /// Dropping it closes its handle, which for [`Error::DuplicateHandle`] is
    /// the descriptor the other slot still uses.
    pub fn insert(
        &mut self,
        connexion: Connexion<C>,
        index: usize,
    ) -> result::Result<(), (Error, Connexion<C>)> {
        if self.is_full() {
            return Err((Error::TableFull, connexion));
        }
        if index >= self.capacity() {
            return Err((Error::SlotOutOfRange(index), connexion));
        }
        if self.slots.get(index).is_some() {
            return Err((Error::SlotOccupied(index), connexion));
        }

        let handle = connexion.handle();
        if self.iter().any(|(_, existing)| existing == handle) {
            return Err((Error::DuplicateHandle(handle), connexion));
        }

        self.slots
            .insert_at(index, connexion)
            .map_err(|connexion| (Error::SlotOccupied(index), connexion))
    }

    /// Empties slot `index`, returning its occupant. The table keeps its size.
    pub fn remove(&mut self, index: usize) -> Option<Connexion<C>> {
        self.slots.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Connexion<C>> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Connexion<C>> {
        self.slots.get_mut(index)
    }

    /// `(slot, handle)` for every occupied slot, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, RawFd)> + '_ {
        self.slots
            .iter()
            .map(|(index, connexion)| (index, connexion.handle()))
    }

    /// Takes every connection out of the table, ascending.
    pub fn drain(&mut self) -> Vec<(usize, Connexion<C>)> {
        self.slots.drain()
    }
}
