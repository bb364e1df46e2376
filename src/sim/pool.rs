//! Fixed-capacity entity pools
//!
//! Slots are never compacted: an entity keeps its index for its whole life,
//! the first free slot is reused on acquire, and iteration is always in slot
//! order with holes skipped.

use serde::Serialize;

/// Liveness test for pooled records
///
/// Most records are live for as long as they occupy a slot. Records with a
/// built-in lifetime (explosions) report themselves dead once expired, which
/// frees the slot without an explicit release.
pub trait Slot {
    fn is_live(&self) -> bool {
        true
    }
}

/// A fixed array of optional records
#[derive(Debug, Clone, Serialize)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
}

impl<T: Slot> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Store a record in the first free slot. Returns its index, or `None`
    /// (dropping the record) when every slot is taken.
    pub fn acquire(&mut self, item: T) -> Option<usize> {
        let index = self
            .slots
            .iter()
            .position(|slot| !slot.as_ref().is_some_and(Slot::is_live))?;
        self.slots[index] = Some(item);
        Some(index)
    }

    /// Whether `acquire` would succeed
    pub fn has_free_slot(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| !slot.as_ref().is_some_and(Slot::is_live))
    }

    /// Free a slot. Releasing an empty slot is a no-op.
    pub fn release(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .filter(|item| item.is_live())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .filter(|item| item.is_live())
    }

    /// Live records with their slot index, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().filter(|item| item.is_live()).map(|item| (i, item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            slot.as_mut()
                .filter(|item| item.is_live())
                .map(|item| (i, item))
        })
    }

    pub fn live_count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Free every slot
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Token(u32);
    impl Slot for Token {}

    #[derive(Debug, Clone)]
    struct Fading {
        remaining: f32,
    }
    impl Slot for Fading {
        fn is_live(&self) -> bool {
            self.remaining > 0.0
        }
    }

    #[test]
    fn test_acquire_uses_first_free_slot() {
        let mut pool = Pool::new(4);
        assert_eq!(pool.acquire(Token(0)), Some(0));
        assert_eq!(pool.acquire(Token(1)), Some(1));
        assert_eq!(pool.acquire(Token(2)), Some(2));

        pool.release(1);
        assert_eq!(pool.acquire(Token(9)), Some(1));
        assert_eq!(pool.get(1), Some(&Token(9)));
        // Other indices are untouched
        assert_eq!(pool.get(0), Some(&Token(0)));
        assert_eq!(pool.get(2), Some(&Token(2)));
    }

    #[test]
    fn test_full_pool_drops_request() {
        let mut pool = Pool::new(2);
        pool.acquire(Token(0));
        pool.acquire(Token(1));
        assert!(!pool.has_free_slot());
        assert_eq!(pool.acquire(Token(2)), None);
        let items: Vec<_> = pool.iter().map(|(_, t)| t.0).collect();
        assert_eq!(items, vec![0, 1]);
    }

    #[test]
    fn test_iteration_skips_holes_in_slot_order() {
        let mut pool = Pool::new(5);
        for i in 0..5 {
            pool.acquire(Token(i));
        }
        pool.release(0);
        pool.release(3);
        let indices: Vec<_> = pool.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert_eq!(pool.live_count(), 3);
    }

    #[test]
    fn test_release_empty_is_noop() {
        let mut pool: Pool<Token> = Pool::new(2);
        assert_eq!(pool.release(0), None);
        assert_eq!(pool.release(17), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_expired_records_free_their_slot() {
        let mut pool = Pool::new(2);
        pool.acquire(Fading { remaining: 1.0 });
        pool.acquire(Fading { remaining: 1.0 });
        assert!(!pool.has_free_slot());

        if let Some(f) = pool.get_mut(0) {
            f.remaining = 0.0;
        }
        assert!(pool.get(0).is_none());
        assert_eq!(pool.live_count(), 1);
        assert_eq!(pool.acquire(Fading { remaining: 2.0 }), Some(0));
    }

    #[test]
    fn test_clear() {
        let mut pool = Pool::new(3);
        pool.acquire(Token(1));
        pool.acquire(Token(2));
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 3);
    }

    proptest! {
        #[test]
        fn prop_live_count_never_exceeds_capacity(
            capacity in 1usize..32,
            ops in prop::collection::vec((any::<bool>(), 0usize..40), 0..200),
        ) {
            let mut pool = Pool::new(capacity);
            for (is_acquire, index) in ops {
                let before = pool.live_count();
                if is_acquire {
                    let result = pool.acquire(Token(index as u32));
                    if before == capacity {
                        prop_assert!(result.is_none());
                        prop_assert_eq!(pool.live_count(), capacity);
                    } else {
                        prop_assert_eq!(pool.live_count(), before + 1);
                    }
                } else {
                    pool.release(index);
                }
                prop_assert!(pool.live_count() <= capacity);
            }
        }
    }
}
