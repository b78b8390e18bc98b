//! Pricing-specific error types.

/// Errors surfaced by the pricing core. Nothing is recovered at this layer;
/// every failure from a sub-component propagates unchanged to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// A model backend could not be reached at all.
    #[error("{backend} backend unavailable: {detail}")]
    ServiceUnavailable {
        backend: &'static str,
        detail: String,
    },

    /// A backend responded, but the response could not be interpreted as a
    /// valid non-negative price.
    #[error("{backend} returned an unusable estimate: {detail}")]
    Estimation {
        backend: &'static str,
        detail: String,
    },

    /// The caller aborted (or timed out) before both estimates returned.
    #[error("pricing request cancelled before completion")]
    Cancelled,
}

impl PricingError {
    pub fn service_unavailable(backend: &'static str, detail: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            backend,
            detail: detail.into(),
        }
    }

    pub fn estimation(backend: &'static str, detail: impl Into<String>) -> Self {
        Self::Estimation {
            backend,
            detail: detail.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_backend() {
        let e = PricingError::service_unavailable("specialist", "connection refused");
        assert!(e.to_string().contains("specialist"));
        assert!(e.to_string().contains("connection refused"));
    }

    #[test]
    fn cancelled_is_distinguishable() {
        assert!(PricingError::Cancelled.is_cancelled());
        assert!(!PricingError::estimation("frontier", "no number in reply").is_cancelled());
    }
}
