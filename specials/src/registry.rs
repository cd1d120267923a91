//! Generation-tagged slot storage for active specials.
//!
//! Ticking happens in registration order, specials may remove themselves or
//! each other mid-pass, and anything registered during a pass must not run
//! until the next one. Slots are reused; the generation counter makes a
//! stale key to a reused slot miss instead of aliasing the newcomer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecialKey {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    item: Option<T>,
}

#[derive(Debug)]
pub(crate) struct Registry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    /// Live keys in registration order; the tick pass walks this.
    order: Vec<SpecialKey>,
    /// Registered since the last pass began; joins `order` next pass.
    pending: Vec<SpecialKey>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.item.is_some()).count()
    }

    pub(crate) fn add(&mut self, item: T) -> SpecialKey {
        let key = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.item = Some(item);
            SpecialKey { idx, generation: slot.generation }
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, item: Some(item) });
            SpecialKey { idx, generation: 0 }
        };
        self.pending.push(key);
        key
    }

    fn slot(&self, key: SpecialKey) -> Option<&Slot<T>> {
        self.slots
            .get(key.idx as usize)
            .filter(|s| s.generation == key.generation)
    }

    pub(crate) fn get(&self, key: SpecialKey) -> Option<&T> {
        self.slot(key).and_then(|s| s.item.as_ref())
    }

    pub(crate) fn get_mut(&mut self, key: SpecialKey) -> Option<&mut T> {
        self.slots
            .get_mut(key.idx as usize)
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.item.as_mut())
    }

    pub(crate) fn contains(&self, key: SpecialKey) -> bool {
        self.slot(key).is_some_and(|s| s.item.is_some())
    }

    /// Promote everything registered since the previous pass, then return
    /// the number of entries this pass will visit.
    pub(crate) fn begin_pass(&mut self) -> usize {
        self.order.append(&mut self.pending);
        self.order.len()
    }

    pub(crate) fn key_at(&self, i: usize) -> SpecialKey {
        self.order[i]
    }

    /// Lift an entry out for ticking. Returns `None` when the key has been
    /// invalidated by a removal earlier in the pass.
    pub(crate) fn take(&mut self, key: SpecialKey) -> Option<T> {
        self.slots
            .get_mut(key.idx as usize)
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.item.take())
    }

    pub(crate) fn put_back(&mut self, key: SpecialKey, item: T) {
        if let Some(slot) = self.slots.get_mut(key.idx as usize) {
            debug_assert!(slot.generation == key.generation && slot.item.is_none());
            slot.item = Some(item);
        }
    }

    /// Free a slot whose item was already lifted with `take`. The key is
    /// dead from here on.
    pub(crate) fn release(&mut self, key: SpecialKey) {
        if let Some(slot) = self.slots.get_mut(key.idx as usize) {
            if slot.generation == key.generation {
                debug_assert!(slot.item.is_none());
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(key.idx);
            }
        }
    }

    /// Forced removal, usable mid-pass. The stale `order` entry is dropped
    /// by the next `sweep`.
    pub(crate) fn remove(&mut self, key: SpecialKey) -> Option<T> {
        let item = self.take(key)?;
        self.release(key);
        Some(item)
    }

    /// Drop order entries whose slots have been freed or reused.
    pub(crate) fn sweep(&mut self) {
        let slots = &self.slots;
        self.order.retain(|k| {
            slots
                .get(k.idx as usize)
                .is_some_and(|s| s.generation == k.generation && s.item.is_some())
        });
    }

    /// Live entries, registration order first, then this pass's newcomers.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (SpecialKey, &T)> {
        self.order
            .iter()
            .chain(self.pending.iter())
            .filter_map(move |&k| self.get(k).map(|t| (k, t)))
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.order.clear();
        self.pending.clear();
    }
}
