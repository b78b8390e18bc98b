//! # Ensemble pricing pipeline
//! Preprocess a raw product description, price it with two independent model
//! backends, blend the two estimates with fixed weights.
//!
//! The pipeline is stateless: every call is a pure function of the backends'
//! answers, modulo observer side effects.

pub mod ensemble;
pub mod error;
pub mod frontier;
pub mod observer;
pub mod openai;
pub mod preprocess;
pub mod specialist;

use async_trait::async_trait;

pub use ensemble::{EnsembleEstimator, FRONTIER_WEIGHT, SPECIALIST_WEIGHT};
pub use error::PricingError;
pub use observer::{NoopObserver, PricingObserver, TracingObserver};
pub use preprocess::Preprocessor;

/// One capability, two implementations (specialist and frontier). The
/// ensemble holds both behind this trait and nothing else.
#[async_trait]
pub trait PriceEstimator: Send + Sync {
    /// Estimate a price for a (preprocessed) product description.
    async fn price(&self, text: &str) -> Result<f64, PricingError>;

    /// Short name for observers and error context.
    fn name(&self) -> &'static str;
}

/// Backend boundary check: estimates must be finite and non-negative.
/// Anything else means the backend's answer was not a usable price.
pub(crate) fn validate_price(backend: &'static str, value: f64) -> Result<f64, PricingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::estimation(
            backend,
            format!("out-of-range price {value}"),
        ));
    }
    Ok(value)
}

/// Round to currency precision. Display only — the pipeline itself always
/// carries full precision.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_zero_and_positive() {
        assert_eq!(validate_price("t", 0.0).unwrap(), 0.0);
        assert_eq!(validate_price("t", 19.99).unwrap(), 19.99);
    }

    #[test]
    fn validate_rejects_negative_and_non_finite() {
        assert!(matches!(
            validate_price("t", -1.0),
            Err(PricingError::Estimation { .. })
        ));
        assert!(matches!(
            validate_price("t", f64::NAN),
            Err(PricingError::Estimation { .. })
        ));
        assert!(matches!(
            validate_price("t", f64::INFINITY),
            Err(PricingError::Estimation { .. })
        ));
    }

    #[test]
    fn rounding_is_display_only_cents() {
        assert_eq!(round_to_cents(24.499999), 24.5);
        assert_eq!(round_to_cents(10.004), 10.0);
    }
}
