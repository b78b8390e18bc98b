//! The composition core: preprocess once, fan out to both estimators, blend.

use std::sync::Arc;
use std::time::Duration;

use crate::pricing::error::PricingError;
use crate::pricing::observer::{NoopObserver, PricingObserver};
use crate::pricing::preprocess::Preprocessor;
use crate::pricing::PriceEstimator;

/// Blend weights. The frontier model is treated as generally more reliable;
/// the specialist contributes a bounded correction. Must sum to 1 so that
/// blending a uniform value returns that value.
pub const FRONTIER_WEIGHT: f64 = 0.9;
pub const SPECIALIST_WEIGHT: f64 = 0.1;

pub struct EnsembleEstimator {
    preprocessor: Arc<dyn Preprocessor>,
    specialist: Arc<dyn PriceEstimator>,
    frontier: Arc<dyn PriceEstimator>,
    observer: Arc<dyn PricingObserver>,
}

impl EnsembleEstimator {
    pub fn new(
        preprocessor: Arc<dyn Preprocessor>,
        specialist: Arc<dyn PriceEstimator>,
        frontier: Arc<dyn PriceEstimator>,
    ) -> Self {
        Self {
            preprocessor,
            specialist,
            frontier,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PricingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Estimate a fair price for a raw product description.
    ///
    /// Preprocessing happens exactly once, before either estimator runs. The
    /// two estimates are independent and computed concurrently; the first
    /// error aborts the whole call — there is no partial result.
    pub async fn price(&self, description: &str) -> Result<f64, PricingError> {
        let rewrite = self.preprocessor.preprocess(description).await?;
        self.observer.on_preprocessed(self.preprocessor.model_name());

        let (specialist, frontier) = tokio::try_join!(
            self.specialist.price(&rewrite),
            self.frontier.price(&rewrite),
        )?;
        self.observer.on_estimate(self.specialist.name(), specialist);
        self.observer.on_estimate(self.frontier.name(), frontier);

        let combined = FRONTIER_WEIGHT * frontier + SPECIALIST_WEIGHT * specialist;
        self.observer.on_combined(combined);
        Ok(combined)
    }

    /// Like [`price`](Self::price), but bounded by a deadline. On expiry the
    /// in-flight backend calls are dropped and the caller sees `Cancelled`.
    pub async fn price_within(
        &self,
        description: &str,
        deadline: Duration,
    ) -> Result<f64, PricingError> {
        match tokio::time::timeout(deadline, self.price(description)).await {
            Ok(res) => res,
            Err(_) => Err(PricingError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Shared call log so tests can assert ordering across components.
    type CallLog = Arc<Mutex<Vec<String>>>;

    struct FixedPreprocessor {
        log: CallLog,
    }

    #[async_trait]
    impl Preprocessor for FixedPreprocessor {
        async fn preprocess(&self, text: &str) -> Result<String, PricingError> {
            self.log.lock().unwrap().push("preprocess".into());
            Ok(format!("clean: {text}"))
        }
        fn model_name(&self) -> &str {
            "fixed-rewriter"
        }
    }

    struct FailingPreprocessor;

    #[async_trait]
    impl Preprocessor for FailingPreprocessor {
        async fn preprocess(&self, _text: &str) -> Result<String, PricingError> {
            Err(PricingError::service_unavailable("preprocessor", "down"))
        }
        fn model_name(&self) -> &str {
            "failing-rewriter"
        }
    }

    struct FixedEstimator {
        tag: &'static str,
        value: f64,
        log: CallLog,
    }

    #[async_trait]
    impl PriceEstimator for FixedEstimator {
        async fn price(&self, text: &str) -> Result<f64, PricingError> {
            assert!(text.starts_with("clean: "), "estimator saw raw text");
            self.log.lock().unwrap().push(self.tag.into());
            Ok(self.value)
        }
        fn name(&self) -> &'static str {
            self.tag
        }
    }

    struct FailingEstimator {
        tag: &'static str,
    }

    #[async_trait]
    impl PriceEstimator for FailingEstimator {
        async fn price(&self, _text: &str) -> Result<f64, PricingError> {
            Err(PricingError::estimation(self.tag, "gibberish"))
        }
        fn name(&self) -> &'static str {
            self.tag
        }
    }

    struct StalledEstimator;

    #[async_trait]
    impl PriceEstimator for StalledEstimator {
        async fn price(&self, _text: &str) -> Result<f64, PricingError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(0.0)
        }
        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    fn ensemble_with(specialist: f64, frontier: f64) -> (EnsembleEstimator, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let e = EnsembleEstimator::new(
            Arc::new(FixedPreprocessor { log: log.clone() }),
            Arc::new(FixedEstimator {
                tag: "specialist",
                value: specialist,
                log: log.clone(),
            }),
            Arc::new(FixedEstimator {
                tag: "frontier",
                value: frontier,
                log: log.clone(),
            }),
        );
        (e, log)
    }

    #[test]
    fn weights_sum_to_one() {
        assert!((FRONTIER_WEIGHT + SPECIALIST_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn blend_matches_fixed_weights() {
        let (e, _) = ensemble_with(20.0, 25.0);
        let got = e.price("Wireless mouse, 2.4GHz, USB receiver").await.unwrap();
        let want = 0.9 * 25.0 + 0.1 * 20.0;
        assert!((got - want).abs() < 1e-9 * want);
        assert!((got - 24.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn boundary_zero_specialist() {
        let (e, _) = ensemble_with(0.0, 100.0);
        let got = e.price("x").await.unwrap();
        assert!((got - 90.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn uniform_inputs_pass_through() {
        let (e, _) = ensemble_with(50.0, 50.0);
        let got = e.price("x").await.unwrap();
        assert!((got - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn repeated_calls_are_deterministic() {
        let (e, _) = ensemble_with(13.37, 42.0);
        let a = e.price("same input").await.unwrap();
        let b = e.price("same input").await.unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[tokio::test]
    async fn preprocess_runs_once_before_either_estimator() {
        let (e, log) = ensemble_with(1.0, 2.0);
        e.price("x").await.unwrap();
        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.iter().filter(|c| *c == "preprocess").count(), 1);
        assert_eq!(calls[0], "preprocess");
        assert_eq!(calls.len(), 3);
    }

    #[tokio::test]
    async fn specialist_failure_propagates_unchanged() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let e = EnsembleEstimator::new(
            Arc::new(FixedPreprocessor { log: log.clone() }),
            Arc::new(FailingEstimator { tag: "specialist" }),
            Arc::new(FixedEstimator {
                tag: "frontier",
                value: 10.0,
                log,
            }),
        );
        let err = e.price("x").await.unwrap_err();
        assert!(matches!(
            err,
            PricingError::Estimation {
                backend: "specialist",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn preprocessor_failure_is_hard() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let e = EnsembleEstimator::new(
            Arc::new(FailingPreprocessor),
            Arc::new(FixedEstimator {
                tag: "specialist",
                value: 1.0,
                log: log.clone(),
            }),
            Arc::new(FixedEstimator {
                tag: "frontier",
                value: 2.0,
                log: log.clone(),
            }),
        );
        let err = e.price("x").await.unwrap_err();
        assert!(matches!(err, PricingError::ServiceUnavailable { .. }));
        // Neither estimator may have run.
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_maps_to_cancelled() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let e = EnsembleEstimator::new(
            Arc::new(FixedPreprocessor { log: log.clone() }),
            Arc::new(StalledEstimator),
            Arc::new(FixedEstimator {
                tag: "frontier",
                value: 2.0,
                log,
            }),
        );
        let err = e
            .price_within("x", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
