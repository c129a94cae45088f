//! Matching engine - crosses inbound orders against resting liquidity
//! under strict price-time priority, then rests any residual.
//!
//! The whole cycle for one order is: allocate from the arena, drain the
//! opposite ladder best-level-first, rest or recycle the remainder. No
//! heap traffic inside the loop, no yield points, no locks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::arena::{OrderArena, OrderHandle, NULL_INDEX};
use crate::command::{Fill, Side};
use crate::error::EngineError;
use crate::order_book::OrderBook;

/// Default arena capacity used by [`MatchingEngine::new`].
pub const MAX_ORDERS: u32 = 1_000_000;

/// Default tick domain used by [`MatchingEngine::new`].
pub const MAX_TICKS: u32 = 4096;

/// Outcome of processing one inbound order.
#[derive(Debug)]
pub struct Execution {
    /// Executions in the order they occurred, best level first, FIFO
    /// within a level
    pub fills: Vec<Fill>,
    /// Quantity left resting on the book at the inbound's tick; 0 when the
    /// inbound was fully consumed
    pub resting_qty: u32,
}

impl Execution {
    /// Total quantity executed against resting orders.
    pub fn filled_qty(&self) -> u64 {
        self.fills.iter().map(|f| f.qty as u64).sum()
    }

    /// True iff the inbound left a residual on the book.
    #[inline]
    pub fn rested(&self) -> bool {
        self.resting_qty > 0
    }
}

/// Single-threaded matching core.
///
/// All state - arena, ladders, indexes, trade counter - is private to the
/// instance; multiple engines are fully independent.
pub struct MatchingEngine {
    pub arena: OrderArena,
    pub book: OrderBook,
    trades_executed: u64,
}

impl MatchingEngine {
    /// Engine with the default sizing (`MAX_ORDERS`, `MAX_TICKS`).
    pub fn new() -> Self {
        Self::with_capacity(MAX_ORDERS, MAX_TICKS)
    }

    /// Engine with explicit sizing. `max_ticks` must be a non-zero
    /// multiple of 64 no larger than 4096.
    pub fn with_capacity(max_orders: u32, max_ticks: u32) -> Self {
        Self {
            arena: OrderArena::with_capacity(max_orders),
            book: OrderBook::new(max_ticks),
            trades_executed: 0,
        }
    }

    /// Process a single order end-to-end.
    ///
    /// Preconditions (caller-enforced, debug-asserted): `tick` inside the
    /// book's domain, `qty > 0`.
    ///
    /// On return every trade against resting liquidity is reflected in the
    /// book and the counter, fully consumed orders are back in the arena,
    /// and a non-zero residual rests at `tick` on the inbound's side.
    ///
    /// # Errors
    /// [`EngineError::CapacityExhausted`] when the arena has no slot for
    /// the inbound. Fills applied before the failing allocation stay
    /// committed; with allocation happening first, that set is empty.
    pub fn process_new_order(
        &mut self,
        id: u64,
        tick: u32,
        qty: u32,
        side: Side,
    ) -> Result<Execution, EngineError> {
        debug_assert!(tick < self.book.max_ticks(), "tick outside book domain");
        debug_assert!(qty > 0, "quantity must be positive");

        let inbound = self.arena.alloc(id, tick, qty, side)?;
        let mut fills = Vec::new();

        match side {
            Side::Buy => self.match_buy(inbound, &mut fills),
            Side::Sell => self.match_sell(inbound, &mut fills),
        }

        let resting_qty = self.arena.get(inbound).qty;
        if resting_qty > 0 {
            self.book.insert(&mut self.arena, inbound);
        } else {
            self.arena.free(inbound);
        }

        Ok(Execution { fills, resting_qty })
    }

    /// Drain asks from the lowest level upward while the buy still crosses.
    fn match_buy(&mut self, inbound: OrderHandle, fills: &mut Vec<Fill>) {
        loop {
            let (remaining, limit) = {
                let o = self.arena.get(inbound);
                (o.qty, o.tick)
            };
            if remaining == 0 {
                break;
            }
            let Some(best_ask) = self.book.best_ask() else { break };
            if best_ask > limit {
                break;
            }
            self.execute_against(inbound, Side::Sell, best_ask, fills);
        }
    }

    /// Mirror of `match_buy`: drain bids from the highest level downward.
    fn match_sell(&mut self, inbound: OrderHandle, fills: &mut Vec<Fill>) {
        loop {
            let (remaining, limit) = {
                let o = self.arena.get(inbound);
                (o.qty, o.tick)
            };
            if remaining == 0 {
                break;
            }
            let Some(best_bid) = self.book.best_bid() else { break };
            if best_bid < limit {
                break;
            }
            self.execute_against(inbound, Side::Buy, best_bid, fills);
        }
    }

    /// Trade the inbound against the head order of one indexed level.
    ///
    /// Executes `min(inbound.qty, head.qty)` at the resting tick, bumps the
    /// trade counter once, and recycles the head if it is consumed -
    /// clearing the occupancy bit when that empties the level.
    fn execute_against(
        &mut self,
        inbound: OrderHandle,
        book_side: Side,
        tick: u32,
        fills: &mut Vec<Fill>,
    ) {
        let resting = self.book.level(book_side, tick).peek_head();
        debug_assert_ne!(resting, NULL_INDEX, "indexed level must be non-empty");

        let (maker_id, maker_qty) = {
            let o = self.arena.get(resting);
            (o.id, o.qty)
        };
        let (taker_id, taker_qty) = {
            let o = self.arena.get(inbound);
            (o.id, o.qty)
        };

        let traded = taker_qty.min(maker_qty);
        self.arena.get_mut(inbound).qty = taker_qty - traded;
        self.trades_executed += 1;

        fills.push(Fill {
            maker_id,
            taker_id,
            tick,
            qty: traded,
            taker_side: book_side.opposite(),
        });

        if traded == maker_qty {
            // Fully consumed: detach and recycle. The pop subtracts the
            // maker's remaining qty from the level total, so the slot qty
            // is left untouched until afterwards.
            if let Some(handle) = self.book.pop_head(&mut self.arena, book_side, tick) {
                self.arena.free(handle);
            }
        } else {
            self.arena.get_mut(resting).qty = maker_qty - traded;
            self.book.reduce_level(book_side, tick, traded);
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Fills executed since construction, one per resting order touched
    /// (partial or full). Non-decreasing.
    #[inline]
    pub fn trades_executed(&self) -> u64 {
        self.trades_executed
    }

    /// Highest tick with resting buy interest.
    #[inline]
    pub fn best_bid(&self) -> Option<u32> {
        self.book.best_bid()
    }

    /// Lowest tick with resting sell interest.
    #[inline]
    pub fn best_ask(&self) -> Option<u32> {
        self.book.best_ask()
    }

    /// Spread in ticks, when both sides are populated.
    #[inline]
    pub fn spread(&self) -> Option<u32> {
        self.book.spread()
    }

    /// Remaining quantity and order count at one level.
    #[inline]
    pub fn depth_at(&self, side: Side, tick: u32) -> (u64, u32) {
        self.book.depth_at(side, tick)
    }

    /// Orders currently resting across both sides.
    #[inline]
    pub fn resting_orders(&self) -> u32 {
        self.book.resting_orders()
    }

    /// Arena slots currently free.
    #[inline]
    pub fn free_slots(&self) -> u32 {
        self.arena.free_slots()
    }

    /// Pre-fault the arena pages.
    pub fn warm_up(&mut self) {
        self.arena.warm_up();
    }

    /// Hash of the externally observable state, for determinism testing.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.book.best_bid().hash(&mut hasher);
        self.book.best_ask().hash(&mut hasher);
        self.book.resting_orders().hash(&mut hasher);
        self.arena.allocated().hash(&mut hasher);
        self.trades_executed.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
