//! Frontier estimator: a general-purpose chat model, optionally primed with
//! retrieved comparable items.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;

use crate::pricing::error::PricingError;
use crate::pricing::openai::{ChatClient, ChatError};
use crate::pricing::{validate_price, PriceEstimator};

/// A reference item with a known price, used as context for the model.
#[derive(Debug, Clone)]
pub struct Comparable {
    pub description: String,
    pub price: f64,
}

/// Collaborator: "given a description, return up to K comparable items".
/// Implemented externally (vector store, catalog lookup, ...).
#[async_trait]
pub trait ComparableRetriever: Send + Sync {
    async fn similar(&self, description: &str, k: usize) -> Result<Vec<Comparable>, PricingError>;
}

/// Retriever that contributes nothing; the model prices from the text alone.
pub struct NoRetrieval;

#[async_trait]
impl ComparableRetriever for NoRetrieval {
    async fn similar(&self, _description: &str, _k: usize) -> Result<Vec<Comparable>, PricingError> {
        Ok(Vec::new())
    }
}

const PRICE_SYSTEM: &str = "You estimate prices of items. Reply only with the \
price in dollars, no explanation.";

pub struct FrontierEstimator {
    chat: ChatClient,
    model: String,
    retriever: Arc<dyn ComparableRetriever>,
    context_size: usize,
}

impl FrontierEstimator {
    pub fn new(
        chat: ChatClient,
        model: impl Into<String>,
        retriever: Arc<dyn ComparableRetriever>,
        context_size: usize,
    ) -> Self {
        Self {
            chat,
            model: model.into(),
            retriever,
            context_size,
        }
    }

    fn build_prompt(text: &str, comparables: &[Comparable]) -> String {
        let mut prompt = String::new();
        if !comparables.is_empty() {
            prompt.push_str("For context, here are some similar items and their prices:\n\n");
            for c in comparables {
                prompt.push_str(&format!("{}\nPrice is ${:.2}\n\n", c.description, c.price));
            }
            prompt.push_str("And now the question for you:\n\n");
        }
        prompt.push_str("How much does this cost?\n\n");
        prompt.push_str(text);
        prompt
    }
}

#[async_trait]
impl PriceEstimator for FrontierEstimator {
    async fn price(&self, text: &str) -> Result<f64, PricingError> {
        let comparables = self.retriever.similar(text, self.context_size).await?;
        let prompt = Self::build_prompt(text, &comparables);

        let reply = self
            .chat
            .complete(&self.model, PRICE_SYSTEM, &prompt)
            .await
            .map_err(|e| match e {
                ChatError::Empty => PricingError::estimation("frontier", e.to_string()),
                other => PricingError::service_unavailable("frontier", other.to_string()),
            })?;

        let value = parse_price(&reply)
            .ok_or_else(|| PricingError::estimation("frontier", format!("no number in {reply:?}")))?;
        validate_price("frontier", value)
    }

    fn name(&self) -> &'static str {
        "frontier"
    }
}

/// Pull the first number out of a model reply, tolerating `$` signs and
/// thousands separators ("$1,299.99", "around 40 dollars").
pub fn parse_price(reply: &str) -> Option<f64> {
    static RE_NUM: OnceCell<Regex> = OnceCell::new();
    let re = RE_NUM.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());
    let m = re.find(reply)?;
    m.as_str().replace(',', "").parse::<f64>().ok()
}
