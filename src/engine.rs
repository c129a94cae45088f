//! Engine - event-loop wrapper around the matching core.
//!
//! Owns CPU pinning and warm-up, and (behind the `runtime` feature) a
//! busy-wait SPSC loop fed by rtrb ring buffers. The matching core itself
//! stays transport-agnostic.

use tracing::debug;

use crate::command::NewOrder;
use crate::error::EngineError;
use crate::matching::{Execution, MatchingEngine, MAX_ORDERS, MAX_TICKS};

/// The main engine: a [`MatchingEngine`] plus process-level plumbing.
pub struct Engine {
    /// The underlying matching core
    pub matcher: MatchingEngine,
}

impl Engine {
    /// Engine with the default sizing.
    pub fn new() -> Self {
        Self::with_capacity(MAX_ORDERS, MAX_TICKS)
    }

    /// Engine with explicit arena capacity and tick domain.
    pub fn with_capacity(max_orders: u32, max_ticks: u32) -> Self {
        debug!(max_orders, max_ticks, "constructing engine");
        Self { matcher: MatchingEngine::with_capacity(max_orders, max_ticks) }
    }

    /// Run the engine event loop until the program terminates.
    ///
    /// Pops [`NewOrder`]s from the input ring, pushes one [`Fill`] per
    /// execution to the output ring (best effort - drops on backpressure),
    /// and busy-waits between batches. Orders that fail on arena
    /// exhaustion are dropped; recovery policy belongs to the producer.
    ///
    /// [`Fill`]: crate::command::Fill
    #[cfg(feature = "runtime")]
    pub fn run(
        &mut self,
        input: &mut rtrb::Consumer<NewOrder>,
        output: &mut rtrb::Producer<crate::command::Fill>,
        pin_to_core: bool,
    ) {
        if pin_to_core {
            self.pin_to_core();
        }

        self.warm_up();

        loop {
            while let Ok(order) = input.pop() {
                if let Ok(exec) = self.process_order(order) {
                    for fill in exec.fills {
                        let _ = output.push(fill);
                    }
                }
            }
            std::hint::spin_loop();
        }
    }

    /// Process a single order synchronously.
    ///
    /// Main entry point for tests, benchmarks and embedding callers.
    #[inline]
    pub fn process_order(&mut self, order: NewOrder) -> Result<Execution, EngineError> {
        self.matcher.process_new_order(order.id, order.tick, order.qty, order.side)
    }

    /// Pin the current thread to the last available CPU core, which is
    /// typically the one isolated from OS interrupts.
    #[cfg(feature = "runtime")]
    pub fn pin_to_core(&self) {
        if let Some(core_ids) = core_affinity::get_core_ids() {
            if let Some(last_core) = core_ids.last() {
                debug!(core = last_core.id, "pinning engine thread");
                core_affinity::set_for_current(*last_core);
            }
        }
    }

    /// Pre-fault the arena pages before entering the hot loop.
    pub fn warm_up(&mut self) {
        debug!("warming up arena pages");
        self.matcher.warm_up();
    }

    /// Highest tick with resting buy interest.
    #[inline]
    pub fn best_bid(&self) -> Option<u32> {
        self.matcher.best_bid()
    }

    /// Lowest tick with resting sell interest.
    #[inline]
    pub fn best_ask(&self) -> Option<u32> {
        self.matcher.best_ask()
    }

    /// Spread in ticks.
    #[inline]
    pub fn spread(&self) -> Option<u32> {
        self.matcher.spread()
    }

    /// Total fills executed since construction.
    #[inline]
    pub fn trades_executed(&self) -> u64 {
        self.matcher.trades_executed()
    }

    /// Orders currently resting on the book.
    #[inline]
    pub fn resting_orders(&self) -> u32 {
        self.matcher.resting_orders()
    }

    /// Hash of the observable state, for determinism testing.
    #[inline]
    pub fn state_hash(&self) -> u64 {
        self.matcher.state_hash()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
