use pollserve::Error;
use pollserve::reactor::io::{Connexion, Source};
use pollserve::reactor::table::ConnectionTable;

use std::net::SocketAddr;
use std::os::fd::RawFd;

#[derive(Debug)]
struct Handle(RawFd);

impl Source for Handle {
    fn handle(&self) -> RawFd {
        self.0
    }
}

fn conn(fd: RawFd) -> Connexion<Handle> {
    Connexion::new(Handle(fd), None)
}

#[test]
fn new_table_is_empty() {
    let table: ConnectionTable<Handle> = ConnectionTable::new(3);

    assert_eq!(table.capacity(), 3);
    assert_eq!(table.active_count(), 0);
    assert!(!table.is_full());
    assert_eq!(table.find_free_slot(), Some(0));
    assert_eq!(table.iter().count(), 0);
}

#[test]
fn free_slot_is_the_lowest_empty_index() {
    let mut table = ConnectionTable::new(3);
    table.insert(conn(10), 0).unwrap();
    table.insert(conn(12), 2).unwrap();

    assert_eq!(table.find_free_slot(), Some(1));
}

#[test]
fn removed_slot_is_reused() {
    let mut table = ConnectionTable::new(2);
    table.insert(conn(10), 0).unwrap();
    table.insert(conn(11), 1).unwrap();
    assert_eq!(table.find_free_slot(), None);

    let removed = table.remove(0).expect("slot 0 occupied");
    assert_eq!(removed.handle(), 10);
    assert_eq!(table.capacity(), 2);
    assert_eq!(table.active_count(), 1);
    assert_eq!(table.find_free_slot(), Some(0));

    table.insert(conn(12), 0).unwrap();
    assert_eq!(table.get(0).map(|c| c.handle()), Some(12));
}

#[test]
fn removing_an_empty_slot_is_a_no_op() {
    let mut table: ConnectionTable<Handle> = ConnectionTable::new(2);

    assert!(table.remove(1).is_none());
    assert!(table.remove(7).is_none());
    assert_eq!(table.active_count(), 0);
}

#[test]
fn iteration_is_in_ascending_slot_order() {
    let mut table = ConnectionTable::new(4);
    table.insert(conn(40), 3).unwrap();
    table.insert(conn(10), 0).unwrap();
    table.insert(conn(20), 1).unwrap();

    let slots: Vec<_> = table.iter().collect();
    assert_eq!(slots, vec![(0, 10), (1, 20), (3, 40)]);
}

#[test]
fn insert_into_full_table_fails() {
    let mut table = ConnectionTable::new(1);
    table.insert(conn(10), 0).unwrap();

    assert!(table.is_full());
    assert!(matches!(table.insert(conn(11), 0), Err((Error::TableFull, _))));
    assert_eq!(table.active_count(), 1);
}

#[test]
fn insert_into_occupied_slot_fails() {
    let mut table = ConnectionTable::new(2);
    table.insert(conn(10), 0).unwrap();

    assert!(matches!(
        table.insert(conn(11), 0),
        Err((Error::SlotOccupied(0), _))
    ));
    assert_eq!(table.get(0).map(|c| c.handle()), Some(10));
}

#[test]
fn insert_out_of_range_fails() {
    let mut table = ConnectionTable::new(2);

    assert!(matches!(
        table.insert(conn(10), 2),
        Err((Error::SlotOutOfRange(2), _))
    ));
}

#[test]
fn a_handle_occupies_at_most_one_slot() {
    let mut table = ConnectionTable::new(3);
    table.insert(conn(10), 0).unwrap();

    assert!(matches!(
        table.insert(conn(10), 1),
        Err((Error::DuplicateHandle(10), _))
    ));
    assert_eq!(table.active_count(), 1);
}

#[test]
fn refused_connection_is_handed_back() {
    let mut table = ConnectionTable::new(2);
    table.insert(conn(10), 0).unwrap();

    let (err, refused) = table.insert(conn(10), 1).unwrap_err();

    assert!(matches!(err, Error::DuplicateHandle(10)));
    assert_eq!(refused.handle(), 10);
    assert_eq!(table.get(0).map(|c| c.handle()), Some(10));
    assert!(table.get(1).is_none());

    let (err, refused) = table.insert(conn(11), 0).unwrap_err();

    assert!(matches!(err, Error::SlotOccupied(0)));
    assert_eq!(refused.handle(), 11);
}

#[test]
fn active_count_never_exceeds_capacity() {
    let mut table = ConnectionTable::new(3);

    for fd in 10..20 {
        if let Some(index) = table.find_free_slot() {
            table.insert(conn(fd), index).unwrap();
        }
        assert!(table.active_count() <= table.capacity());
    }

    assert_eq!(table.active_count(), 3);
}

#[test]
fn drain_empties_every_slot() {
    let mut table = ConnectionTable::new(3);
    table.insert(conn(12), 2).unwrap();
    table.insert(conn(10), 0).unwrap();

    let drained: Vec<_> = table
        .drain()
        .into_iter()
        .map(|(index, c)| (index, c.handle()))
        .collect();

    assert_eq!(drained, vec![(0, 10), (2, 12)]);
    assert_eq!(table.active_count(), 0);
    assert_eq!(table.find_free_slot(), Some(0));
}

#[test]
fn connexion_keeps_peer_address() {
    let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
    let mut table = ConnectionTable::new(1);
    table.insert(Connexion::new(Handle(10), Some(peer)), 0).unwrap();

    assert_eq!(table.get(0).and_then(|c| c.peer()), Some(peer));
}
