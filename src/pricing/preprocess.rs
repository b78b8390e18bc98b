//! Description preprocessing: rewrite raw scraped text into a normalized form
//! before it reaches the pricing models.

use async_trait::async_trait;

use crate::pricing::error::PricingError;
use crate::pricing::openai::ChatClient;

/// Text-to-text rewrite stage. Same conceptual type in and out; the contract
/// is only that the output is cleaner input for the estimators.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    async fn preprocess(&self, text: &str) -> Result<String, PricingError>;

    /// Which rewrite model produced the output (for the observer).
    fn model_name(&self) -> &str;
}

const REWRITE_SYSTEM: &str = "You rewrite scraped product listings. Rewrite the \
given text into a clean 3-4 sentence product description: plain vocabulary, no \
marketing fluff, no discount or shipping talk, keep every concrete attribute \
(brand, model, capacity, dimensions). Output only the rewritten description.";

/// Chat-model backed rewriter. Any backend failure is a hard
/// `ServiceUnavailable`; there is no fallback to the raw text here — that
/// policy belongs to the caller.
pub struct OpenAiPreprocessor {
    chat: ChatClient,
    model: String,
}

impl OpenAiPreprocessor {
    pub fn new(chat: ChatClient, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Preprocessor for OpenAiPreprocessor {
    async fn preprocess(&self, text: &str) -> Result<String, PricingError> {
        self.chat
            .complete(&self.model, REWRITE_SYSTEM, text)
            .await
            .map_err(|e| PricingError::service_unavailable("preprocessor", e.to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
