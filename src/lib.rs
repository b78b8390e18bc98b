// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod deals;
pub mod memory;
pub mod notify;
pub mod planner;
pub mod pricing;
pub mod scanner;

// ---- Re-exports for stable public API ----
pub use crate::deals::types::{Deal, DealSelection, Opportunity, ScrapedDeal};
pub use crate::pricing::{
    EnsembleEstimator, NoopObserver, PriceEstimator, PricingError, PricingObserver,
    TracingObserver, FRONTIER_WEIGHT, SPECIALIST_WEIGHT,
};
