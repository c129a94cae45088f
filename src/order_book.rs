//! Order book - two dense tick-indexed ladders with bitmap-backed
//! best-price discovery.
//!
//! Every tick in `[0, max_ticks)` is O(1) addressable on both sides; the
//! per-side [`BestPriceIndex`] keeps the extremum query O(1) as levels
//! fill and drain.

use crate::arena::{OrderArena, OrderHandle};
use crate::command::Side;
use crate::price_index::BestPriceIndex;
use crate::price_level::PriceLevelQueue;

/// Dense order book holding the resting side of the market.
///
/// The book owns no orders; it links arena handles into per-tick FIFOs and
/// mirrors level occupancy into the per-side index. The index invariant -
/// bit set iff the level is non-empty - holds between every public call.
pub struct OrderBook {
    bids: Box<[PriceLevelQueue]>,
    asks: Box<[PriceLevelQueue]>,
    bid_index: BestPriceIndex,
    ask_index: BestPriceIndex,
    /// Number of orders currently resting on either side
    resting: u32,
}

impl OrderBook {
    /// Create an empty book covering `max_ticks` price ticks per side.
    ///
    /// # Panics
    /// Same domain constraints as [`BestPriceIndex::new`].
    pub fn new(max_ticks: u32) -> Self {
        Self {
            bids: vec![PriceLevelQueue::new(); max_ticks as usize].into_boxed_slice(),
            asks: vec![PriceLevelQueue::new(); max_ticks as usize].into_boxed_slice(),
            bid_index: BestPriceIndex::new(max_ticks),
            ask_index: BestPriceIndex::new(max_ticks),
            resting: 0,
        }
    }

    /// Width of the tick domain.
    #[inline]
    pub fn max_ticks(&self) -> u32 {
        self.bid_index.max_ticks()
    }

    // ========================================================================
    // Best Price Access
    // ========================================================================

    /// Highest tick with resting buy interest.
    #[inline]
    pub fn best_bid(&self) -> Option<u32> {
        self.bid_index.highest()
    }

    /// Lowest tick with resting sell interest.
    #[inline]
    pub fn best_ask(&self) -> Option<u32> {
        self.ask_index.lowest()
    }

    /// Best price on the side an inbound of `side` would trade against.
    #[inline]
    pub fn best_opposite(&self, side: Side) -> Option<u32> {
        match side {
            Side::Buy => self.best_ask(),
            Side::Sell => self.best_bid(),
        }
    }

    /// Spread in ticks; `None` unless both sides are populated.
    pub fn spread(&self) -> Option<u32> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    // ========================================================================
    // Level Access
    // ========================================================================

    #[inline]
    fn ladder(&self, side: Side) -> &[PriceLevelQueue] {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    fn ladder_mut(&mut self, side: Side) -> &mut [PriceLevelQueue] {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    #[inline]
    fn index_mut(&mut self, side: Side) -> &mut BestPriceIndex {
        match side {
            Side::Buy => &mut self.bid_index,
            Side::Sell => &mut self.ask_index,
        }
    }

    /// The level at `tick` on `side`.
    #[inline]
    pub fn level(&self, side: Side, tick: u32) -> &PriceLevelQueue {
        &self.ladder(side)[tick as usize]
    }

    /// Remaining quantity and order count at a level.
    #[inline]
    pub fn depth_at(&self, side: Side, tick: u32) -> (u64, u32) {
        let level = self.level(side, tick);
        (level.total_qty, level.count)
    }

    /// True iff the occupancy bit for `tick` is set on `side`.
    #[inline]
    pub fn is_marked(&self, side: Side, tick: u32) -> bool {
        match side {
            Side::Buy => self.bid_index.is_marked(tick),
            Side::Sell => self.ask_index.is_marked(tick),
        }
    }

    // ========================================================================
    // Resting Order Management
    // ========================================================================

    /// Rest an allocated order on its side's queue at its own tick.
    ///
    /// Reads `side` and `tick` from the slot, appends at the tail and sets
    /// the occupancy bit.
    pub fn insert(&mut self, arena: &mut OrderArena, handle: OrderHandle) {
        let (side, tick) = {
            let o = arena.get(handle);
            (o.side, o.tick)
        };
        debug_assert!(tick < self.max_ticks(), "tick outside book domain");

        self.ladder_mut(side)[tick as usize].push_back(arena, handle);
        self.index_mut(side).mark(tick);
        self.resting += 1;
    }

    /// Detach the head order at a level; clears the occupancy bit when the
    /// level empties. Returns `None` on an empty level.
    ///
    /// The slot stays allocated; the caller decides its lifetime.
    pub fn pop_head(
        &mut self,
        arena: &mut OrderArena,
        side: Side,
        tick: u32,
    ) -> Option<OrderHandle> {
        let handle = self.ladder_mut(side)[tick as usize].pop_front(arena)?;
        if self.ladder(side)[tick as usize].is_empty() {
            self.index_mut(side).clear(tick);
        }
        self.resting -= 1;
        Some(handle)
    }

    /// Unlink a resting order from any queue position (cancellation path
    /// for external collaborators; matching only pops heads).
    ///
    /// The slot stays allocated; the caller decides its lifetime.
    pub fn remove(&mut self, arena: &mut OrderArena, handle: OrderHandle) {
        let (side, tick) = {
            let o = arena.get(handle);
            (o.side, o.tick)
        };

        let emptied = self.ladder_mut(side)[tick as usize].unlink(arena, handle);
        if emptied {
            self.index_mut(side).clear(tick);
        }
        self.resting -= 1;
    }

    /// Adjust a level total after a partial fill of its head.
    #[inline]
    pub fn reduce_level(&mut self, side: Side, tick: u32, qty: u32) {
        self.ladder_mut(side)[tick as usize].subtract_qty(qty);
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Number of orders resting across both sides.
    #[inline]
    pub fn resting_orders(&self) -> u32 {
        self.resting
    }

    /// True iff nothing rests on either side.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resting == 0
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("resting", &self.resting)
            .finish()
    }
}
