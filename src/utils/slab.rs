/// Fixed-capacity storage addressed by index.
///
/// Unlike a growable slab, the number of slots is set once and never
/// changes; emptied slots keep their index and are handed out again.
pub(crate) struct Slab<T> {
    items: Box<[Option<T>]>,
    len: usize,
}

impl<T> Slab<T> {
    pub(crate) fn new(size: usize) -> Self {
        let items = (0..size).map(|_| None).collect();

        Self { items, len: 0 }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Lowest empty index.
    pub(crate) fn first_vacant(&self) -> Option<usize> {
        self.items.iter().position(Option::is_none)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)?.as_mut()
    }

    /// Stores `item` at `index`, handing it back if the slot is taken or
    /// does not exist.
    pub(crate) fn insert_at(&mut self, index: usize, item: T) -> Result<(), T> {
        match self.items.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(item);
                self.len += 1;
                Ok(())
            }
            _ => Err(item),
        }
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.items.get_mut(index)?.take()?;
        self.len -= 1;

        Some(item)
    }

    /// Occupied slots in ascending index order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    /// Empties every slot, yielding the items in ascending index order.
    pub(crate) fn drain(&mut self) -> Vec<(usize, T)> {
        self.len = 0;

        self.items
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.take().map(|item| (index, item)))
            .collect()
    }
}
