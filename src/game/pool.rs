//! Fixed-Capacity Slot Pool
//!
//! Round-robin arena for short-lived entities. Slots are claimed in cursor
//! order and freed implicitly when the stored value reports itself inactive;
//! there is no free list and nothing allocates after construction.
//!
//! When every slot is busy, `allocate` hands out the oldest claim again.
//! Overwriting the oldest missile is the intended saturation behaviour.

/// A value that can live in a [`SlotPool`].
pub trait PoolSlot: Copy + Default {
    /// Whether the slot currently holds a live entity.
    fn is_active(&self) -> bool;
}

/// Fixed-size round-robin pool.
#[derive(Clone, Debug)]
pub struct SlotPool<T, const N: usize> {
    slots: [T; N],
    next: usize,
}

impl<T: PoolSlot, const N: usize> Default for SlotPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PoolSlot, const N: usize> SlotPool<T, N> {
    /// Number of slots.
    pub const CAPACITY: usize = N;

    /// Pool with every slot inactive.
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            next: 0,
        }
    }

    /// Index of the slot the next claim will use.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Take the slot under the cursor and advance it, wrapping at N.
    #[inline]
    pub fn allocate(&mut self) -> usize {
        let index = self.next;
        self.next = (self.next + 1) % N;
        index
    }

    /// Allocate a slot and store `value` in it.
    #[inline]
    pub fn claim(&mut self, value: T) -> usize {
        let index = self.allocate();
        self.slots[index] = value;
        index
    }

    /// Slot by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    /// Mutable slot by index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// All slots, active or not, in index order.
    #[inline]
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Active slots with their indices.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots.iter().enumerate().filter(|(_, s)| s.is_active())
    }

    /// Number of active slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    /// Deactivate every slot and rewind the cursor.
    pub fn clear(&mut self) {
        self.slots = [T::default(); N];
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Timer {
        id: u32,
        ticks: i32,
    }

    impl PoolSlot for Timer {
        fn is_active(&self) -> bool {
            self.ticks > 0
        }
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool: SlotPool<Timer, 4> = SlotPool::new();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.next_index(), 0);
        assert_eq!(SlotPool::<Timer, 4>::CAPACITY, 4);
    }

    #[test]
    fn test_round_robin_reuses_oldest() {
        let mut pool: SlotPool<Timer, 3> = SlotPool::new();
        for id in 0..3 {
            assert_eq!(pool.claim(Timer { id, ticks: 10 }), id as usize);
        }
        assert_eq!(pool.active_count(), 3);

        // Saturated: the fourth claim overwrites slot 0
        assert_eq!(pool.claim(Timer { id: 3, ticks: 10 }), 0);
        assert_eq!(pool.get(0).map(|t| t.id), Some(3));
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.next_index(), 1);
    }

    #[test]
    fn test_lifetime_frees_slot() {
        let mut pool: SlotPool<Timer, 2> = SlotPool::new();
        let i = pool.claim(Timer { id: 1, ticks: 1 });
        assert_eq!(pool.active_count(), 1);

        if let Some(t) = pool.get_mut(i) {
            t.ticks -= 1;
        }
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.iter_active().count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut pool: SlotPool<Timer, 2> = SlotPool::new();
        pool.claim(Timer { id: 1, ticks: 5 });
        pool.clear();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.next_index(), 0);
        assert!(pool.get(2).is_none());
    }
}
