//! Deal scanner: asks a chat model to pick the deals with the clearest
//! prices and descriptions, returned as structured JSON.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::deals::types::{DealSelection, ScrapedDeal};
use crate::pricing::openai::ChatClient;

/// Seam for the planner; lets tests replace the model-backed scanner.
#[async_trait]
pub trait DealSelector: Send + Sync {
    async fn select(&self, deals: &[ScrapedDeal]) -> Result<DealSelection>;
}

const SELECT_SYSTEM: &str = concat!(
    "You identify the most promising deals from a list. Select up to 5 deals ",
    "with the clearest explicit price and the best product description. For ",
    "each, write a 3-4 sentence summary of the product itself - no discount ",
    "or shipping talk - and report the advertised price as a number. Respond ",
    "strictly in JSON with no explanation, like this:\n",
    r#"{"deals": [{"product_description": "...", "price": 99.99, "url": "..."}]}"#,
);

pub struct DealScanner {
    chat: ChatClient,
    model: String,
}

impl DealScanner {
    pub fn new(chat: ChatClient, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }
}

#[async_trait]
impl DealSelector for DealScanner {
    async fn select(&self, deals: &[ScrapedDeal]) -> Result<DealSelection> {
        if deals.is_empty() {
            return Ok(DealSelection::default());
        }

        let listing = deals
            .iter()
            .map(|d| d.describe())
            .collect::<Vec<_>>()
            .join("\n\n");
        let user = format!("Deals:\n\n{listing}");

        let reply = self
            .chat
            .complete(&self.model, SELECT_SYSTEM, &user)
            .await
            .context("scanner completion")?;

        parse_selection(&reply)
    }
}

/// Parse the model reply into a [`DealSelection`]. Tolerates markdown code
/// fences and prose around the JSON object; entries without a positive price
/// or a description are dropped rather than failing the whole scan.
pub fn parse_selection(reply: &str) -> Result<DealSelection> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => bail!("no JSON object in scanner reply"),
    };

    let mut selection: DealSelection =
        serde_json::from_str(json).context("deserializing deal selection")?;
    selection.deals.retain(|d| {
        d.price.is_finite()
            && d.price > 0.0
            && !d.product_description.trim().is_empty()
            && !d.url.is_empty()
    });
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let reply = r#"{"deals": [{"product_description": "A mouse.", "price": 19.99, "url": "https://example.test/m"}]}"#;
        let sel = parse_selection(reply).unwrap();
        assert_eq!(sel.deals.len(), 1);
        assert_eq!(sel.deals[0].price, 19.99);
    }

    #[test]
    fn parses_fenced_json() {
        let reply = "Here you go:\n```json\n{\"deals\": [{\"product_description\": \"A keyboard.\", \"price\": 45.0, \"url\": \"https://example.test/k\"}]}\n```";
        let sel = parse_selection(reply).unwrap();
        assert_eq!(sel.deals.len(), 1);
    }

    #[test]
    fn drops_invalid_entries() {
        let reply = r#"{"deals": [
            {"product_description": "Free item?", "price": 0.0, "url": "https://example.test/a"},
            {"product_description": "", "price": 10.0, "url": "https://example.test/b"},
            {"product_description": "Real one.", "price": 10.0, "url": "https://example.test/c"}
        ]}"#;
        let sel = parse_selection(reply).unwrap();
        assert_eq!(sel.deals.len(), 1);
        assert_eq!(sel.deals[0].url, "https://example.test/c");
    }

    #[test]
    fn rejects_reply_without_json() {
        assert!(parse_selection("sorry, nothing good today").is_err());
    }
}
