//! Observer hooks for the pricing pipeline.
//!
//! The core logs nothing on its own; callers inject an observer so tests can
//! run silent and the binary can wire everything into `tracing`.

/// Receives intermediate values as the ensemble works through one estimate.
/// All hooks default to no-ops, so impls only override what they care about.
pub trait PricingObserver: Send + Sync {
    /// Preprocessing finished; `model` is the rewrite model that was used.
    fn on_preprocessed(&self, _model: &str) {}

    /// One component estimator returned.
    fn on_estimate(&self, _estimator: &str, _price: f64) {}

    /// The weighted blend was computed.
    fn on_combined(&self, _price: f64) {}
}

/// Silent observer for tests and library embedders.
pub struct NoopObserver;

impl PricingObserver for NoopObserver {}

/// Observer that forwards everything to `tracing` at INFO level.
pub struct TracingObserver;

impl PricingObserver for TracingObserver {
    fn on_preprocessed(&self, model: &str) {
        tracing::info!(target: "pricing", model, "description preprocessed");
    }

    fn on_estimate(&self, estimator: &str, price: f64) {
        tracing::info!(target: "pricing", estimator, price = format!("{price:.2}"), "component estimate");
    }

    fn on_combined(&self, price: f64) {
        tracing::info!(target: "pricing", price = format!("{price:.2}"), "ensemble estimate complete");
    }
}
