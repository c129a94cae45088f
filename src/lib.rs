//! # tickmatch
//!
//! A deterministic, single-threaded limit order book matching core.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns the book exclusively (no locks)
//! - **O(1) Everywhere**: allocation, queue ops and best-price lookup all
//!   run in constant time, independent of spread width
//! - **Arena Allocation**: order slots are pre-sized at construction; the
//!   hot path never touches the heap
//! - **Integer Ticks**: prices are tick indices in `[0, max_ticks)`; the
//!   tick-to-price mapping belongs to the caller
//!
//! ## Architecture
//!
//! ```text
//! [Producer Thread] --> [SPSC Ring Buffer] --> [Engine Thread (Pinned)]
//!                                                      |
//!                                                 [Fill Events]
//! ```
//!
//! The core is four components joined by the matcher: an order arena
//! (free-stack slab), per-tick FIFO queues threaded through intrusive
//! arena indices, a two-level occupancy bitmap per side, and the
//! price-time matching loop itself.

pub mod arena;
pub mod command;
pub mod engine;
pub mod error;
pub mod matching;
pub mod order_book;
pub mod price_index;
pub mod price_level;

// Re-exports for convenience
pub use arena::{Order, OrderArena, OrderHandle, NULL_INDEX};
pub use command::{Fill, NewOrder, Side};
pub use engine::Engine;
pub use error::EngineError;
pub use matching::{Execution, MatchingEngine, MAX_ORDERS, MAX_TICKS};
pub use order_book::OrderBook;
pub use price_index::BestPriceIndex;
pub use price_level::PriceLevelQueue;
