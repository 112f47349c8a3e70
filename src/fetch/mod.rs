// src/fetch/mod.rs
// =============================================================================
// HTTP access for the crawler, behind a bounded-concurrency gate.
// =============================================================================

mod gate;

pub use gate::FetchGate;
