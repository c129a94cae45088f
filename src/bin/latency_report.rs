//! End-to-end latency report over a synthetic order stream.
//!
//! Pre-generates a tightly grouped stream (heavy trading activity), then
//! measures per-order wall time through the full matching cycle and
//! prints hdrhistogram percentiles.

use hdrhistogram::Histogram;
use std::time::Instant;
use tickmatch::{Engine, NewOrder, Side};
use tracing::info;

/// Tiny deterministic generator so the stream is reproducible without
/// pulling an RNG into the binary.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    const WARMUP_OPS: usize = 10_000;
    const ITERATIONS: usize = 500_000;

    let mut engine = Engine::with_capacity(1_000_000, 4096);
    engine.warm_up();

    // Prices grouped in a 50-tick band around 2000 so most orders cross,
    // mirroring a busy inside market.
    info!(orders = ITERATIONS, "pre-generating synthetic stream");
    let mut rng = SplitMix64(0xF1A5_4B1D);
    let stream: Vec<NewOrder> = (0..WARMUP_OPS + ITERATIONS)
        .map(|i| {
            let r = rng.next();
            NewOrder {
                id: i as u64,
                tick: 2000 + (r % 51) as u32,
                qty: 10 + ((r >> 8) % 91) as u32,
                side: if r & (1 << 32) == 0 { Side::Buy } else { Side::Sell },
            }
        })
        .collect();

    info!(ops = WARMUP_OPS, "training branch predictor");
    for order in &stream[..WARMUP_OPS] {
        std::hint::black_box(engine.process_order(*order).ok());
    }

    info!(ops = ITERATIONS, "measuring");
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 1_000_000, 3).unwrap();
    let run_start = Instant::now();

    for order in &stream[WARMUP_OPS..] {
        let start = Instant::now();
        std::hint::black_box(engine.process_order(*order).ok());
        let elapsed = start.elapsed();
        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
    }

    let total = run_start.elapsed();

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {}", ITERATIONS);
    println!("Trades:     {}", engine.trades_executed());
    println!("Resting:    {}", engine.resting_orders());
    println!("Throughput: {:.2} ops/sec", ITERATIONS as f64 / total.as_secs_f64());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("Max:    {:6} ns", histogram.max());
}
