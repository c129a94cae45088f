//! Price level queue - a FIFO of orders resting at a single tick.
//!
//! Implemented as a doubly-linked list threaded through the arena's
//! intrusive `prev`/`next` indices: O(1) tail insert, O(1) head removal,
//! and O(1) unlink from any interior position.

use crate::arena::{OrderArena, OrderHandle, NULL_INDEX};

/// FIFO queue of orders at one price tick.
///
/// The head is the earliest arriver and the only order the matcher ever
/// consumes from; interior unlink exists for external cancellation paths.
/// Every order linked here shares the same `tick` and `side`.
#[derive(Clone, Copy, Debug)]
pub struct PriceLevelQueue {
    /// Oldest order (first to match)
    pub head: OrderHandle,
    /// Newest order (last to match)
    pub tail: OrderHandle,
    /// Total remaining quantity across the queue
    pub total_qty: u64,
    /// Number of orders in the queue
    pub count: u32,
}

impl Default for PriceLevelQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceLevelQueue {
    /// Create an empty level
    #[inline]
    pub const fn new() -> Self {
        Self { head: NULL_INDEX, tail: NULL_INDEX, total_qty: 0, count: 0 }
    }

    /// True iff no order rests at this level
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.head == NULL_INDEX
    }

    /// Head order handle, `NULL_INDEX` when empty.
    #[inline]
    pub const fn peek_head(&self) -> OrderHandle {
        self.head
    }

    /// Append an order at the tail. O(1).
    ///
    /// The order's links are overwritten; it must not currently be linked
    /// into any queue.
    #[inline]
    pub fn push_back(&mut self, arena: &mut OrderArena, handle: OrderHandle) {
        let qty = arena.get(handle).qty;
        debug_assert!(
            self.is_empty() || arena.get(self.tail).tick == arena.get(handle).tick,
            "level must hold a single tick"
        );

        if self.tail == NULL_INDEX {
            debug_assert!(self.head == NULL_INDEX);
            self.head = handle;
            self.tail = handle;
            let o = arena.get_mut(handle);
            o.prev = NULL_INDEX;
            o.next = NULL_INDEX;
        } else {
            let old_tail = self.tail;
            arena.get_mut(old_tail).next = handle;
            let o = arena.get_mut(handle);
            o.prev = old_tail;
            o.next = NULL_INDEX;
            self.tail = handle;
        }

        self.count += 1;
        self.total_qty += qty as u64;
    }

    /// Detach and return the head order. O(1).
    ///
    /// The slot stays allocated; the caller decides its lifetime.
    #[inline]
    pub fn pop_front(&mut self, arena: &mut OrderArena) -> Option<OrderHandle> {
        if self.head == NULL_INDEX {
            return None;
        }

        let handle = self.head;
        let (next, qty) = {
            let o = arena.get(handle);
            (o.next, o.qty)
        };

        if next == NULL_INDEX {
            self.head = NULL_INDEX;
            self.tail = NULL_INDEX;
        } else {
            self.head = next;
            arena.get_mut(next).prev = NULL_INDEX;
        }

        self.count -= 1;
        self.total_qty -= qty as u64;

        let o = arena.get_mut(handle);
        o.prev = NULL_INDEX;
        o.next = NULL_INDEX;

        Some(handle)
    }

    /// Unlink an order from any position. O(1).
    ///
    /// Returns `true` when the level became empty. The slot stays
    /// allocated; the caller decides its lifetime.
    #[inline]
    pub fn unlink(&mut self, arena: &mut OrderArena, handle: OrderHandle) -> bool {
        let (prev, next, qty) = {
            let o = arena.get(handle);
            (o.prev, o.next, o.qty)
        };

        match (prev, next) {
            (NULL_INDEX, NULL_INDEX) => {
                // Only order at this level
                debug_assert!(self.head == handle && self.tail == handle);
                self.head = NULL_INDEX;
                self.tail = NULL_INDEX;
            }
            (NULL_INDEX, n) => {
                // Head of a longer queue
                debug_assert!(self.head == handle);
                self.head = n;
                arena.get_mut(n).prev = NULL_INDEX;
            }
            (p, NULL_INDEX) => {
                // Tail of a longer queue
                debug_assert!(self.tail == handle);
                self.tail = p;
                arena.get_mut(p).next = NULL_INDEX;
            }
            (p, n) => {
                arena.get_mut(p).next = n;
                arena.get_mut(n).prev = p;
            }
        }

        self.count -= 1;
        self.total_qty -= qty as u64;

        let o = arena.get_mut(handle);
        o.prev = NULL_INDEX;
        o.next = NULL_INDEX;

        self.count == 0
    }

    /// Adjust the level total after a partial fill of an order that stays
    /// in place.
    #[inline]
    pub fn subtract_qty(&mut self, qty: u32) {
        debug_assert!(self.total_qty >= qty as u64);
        self.total_qty -= qty as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Side;

    fn alloc_resting(arena: &mut OrderArena, n: u32) -> Vec<OrderHandle> {
        (0..n)
            .map(|i| arena.alloc(i as u64, 100, 10, Side::Sell).unwrap())
            .collect()
    }

    #[test]
    fn empty_level() {
        let level = PriceLevelQueue::new();
        assert!(level.is_empty());
        assert_eq!(level.count, 0);
        assert_eq!(level.total_qty, 0);
        assert_eq!(level.peek_head(), NULL_INDEX);
    }

    #[test]
    fn push_pop_single_restores_empty() {
        let mut arena = OrderArena::with_capacity(4);
        let mut level = PriceLevelQueue::new();

        let h = arena.alloc(1, 100, 10, Side::Sell).unwrap();
        level.push_back(&mut arena, h);
        assert_eq!(level.head, h);
        assert_eq!(level.tail, h);
        assert_eq!(level.total_qty, 10);

        assert_eq!(level.pop_front(&mut arena), Some(h));
        assert!(level.is_empty());
        assert_eq!(level.head, NULL_INDEX);
        assert_eq!(level.tail, NULL_INDEX);
        assert_eq!(level.total_qty, 0);
    }

    #[test]
    fn fifo_ordering_and_linkage() {
        let mut arena = OrderArena::with_capacity(8);
        let mut level = PriceLevelQueue::new();
        let hs = alloc_resting(&mut arena, 3);

        for &h in &hs {
            level.push_back(&mut arena, h);
        }

        assert_eq!(level.count, 3);
        assert_eq!(level.total_qty, 30);
        assert_eq!(level.head, hs[0]);
        assert_eq!(level.tail, hs[2]);
        assert_eq!(arena.get(hs[0]).next, hs[1]);
        assert_eq!(arena.get(hs[1]).prev, hs[0]);
        assert_eq!(arena.get(hs[2]).prev, hs[1]);

        // Orders leave in insertion order
        assert_eq!(level.pop_front(&mut arena), Some(hs[0]));
        assert_eq!(arena.get(hs[1]).prev, NULL_INDEX);
        assert_eq!(level.pop_front(&mut arena), Some(hs[1]));
        assert_eq!(level.pop_front(&mut arena), Some(hs[2]));
        assert_eq!(level.pop_front(&mut arena), None);
    }

    #[test]
    fn unlink_only_order_empties_level() {
        let mut arena = OrderArena::with_capacity(4);
        let mut level = PriceLevelQueue::new();

        let h = arena.alloc(1, 100, 10, Side::Sell).unwrap();
        level.push_back(&mut arena, h);

        assert!(level.unlink(&mut arena, h));
        assert!(level.is_empty());
        assert_eq!(level.tail, NULL_INDEX);
    }

    #[test]
    fn unlink_head_middle_tail() {
        let mut arena = OrderArena::with_capacity(8);
        let mut level = PriceLevelQueue::new();
        let hs = alloc_resting(&mut arena, 4);
        for &h in &hs {
            level.push_back(&mut arena, h);
        }

        // middle
        assert!(!level.unlink(&mut arena, hs[1]));
        assert_eq!(arena.get(hs[0]).next, hs[2]);
        assert_eq!(arena.get(hs[2]).prev, hs[0]);

        // head
        assert!(!level.unlink(&mut arena, hs[0]));
        assert_eq!(level.head, hs[2]);
        assert_eq!(arena.get(hs[2]).prev, NULL_INDEX);

        // tail
        assert!(!level.unlink(&mut arena, hs[3]));
        assert_eq!(level.tail, hs[2]);
        assert_eq!(arena.get(hs[2]).next, NULL_INDEX);

        assert_eq!(level.count, 1);
        assert_eq!(level.total_qty, 10);
    }

    #[test]
    fn subtract_qty_tracks_partial_fills() {
        let mut level = PriceLevelQueue::new();
        level.total_qty = 500;

        level.subtract_qty(120);
        assert_eq!(level.total_qty, 380);
        level.subtract_qty(380);
        assert_eq!(level.total_qty, 0);
    }
}
