// src/deals/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Prompt-size control: scraped text is capped before it reaches any model.
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_SECTION_CHARS: usize = 500;

/// One raw deal as it came off a feed, after normalization and truncation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapedDeal {
    pub title: String,
    pub summary: String,
    pub details: String,
    pub features: String,
    pub url: String,
    /// Unix seconds from the feed's pubDate; 0 when absent/unparsable.
    pub published_at: u64,
}

impl ScrapedDeal {
    pub fn truncate(&mut self) {
        cap(&mut self.title, MAX_TITLE_CHARS);
        cap(&mut self.details, MAX_SECTION_CHARS);
        cap(&mut self.features, MAX_SECTION_CHARS);
    }

    /// Multi-line rendering used when feeding deals into a model prompt.
    /// Empty sections are skipped.
    pub fn describe(&self) -> String {
        let mut out = format!("Title: {}\n", self.title);
        if !self.summary.is_empty() {
            out.push_str(&format!("Summary: {}\n", self.summary.trim()));
        }
        if !self.details.is_empty() {
            out.push_str(&format!("Details: {}\n", self.details.trim()));
        }
        if !self.features.is_empty() {
            out.push_str(&format!("Features: {}\n", self.features.trim()));
        }
        out.push_str(&format!("URL: {}", self.url));
        out
    }
}

fn cap(s: &mut String, max_chars: usize) {
    if s.chars().count() > max_chars {
        *s = s.chars().take(max_chars).collect();
    }
}

/// Structured deal as selected by the scanner model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deal {
    /// 3-4 sentence summary of the product itself (no discount talk).
    pub product_description: String,
    /// The advertised price, after discounts.
    pub price: f64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DealSelection {
    pub deals: Vec<Deal>,
}

/// A deal whose estimated fair price exceeds its listed price.
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Opportunity {
    pub deal: Deal,
    pub estimate: f64,
    pub discount: f64,
}

impl Opportunity {
    pub fn new(deal: Deal, estimate: f64) -> Self {
        let discount = estimate - deal.price;
        Self {
            deal,
            estimate,
            discount,
        }
    }
}

#[async_trait::async_trait]
pub trait DealSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<ScrapedDeal>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(price: f64) -> Deal {
        Deal {
            product_description: "A thing".into(),
            price,
            url: "https://example.test/d".into(),
        }
    }

    #[test]
    fn discount_is_estimate_minus_price() {
        let opp = Opportunity::new(deal(99.0), 150.0);
        assert!((opp.discount - 51.0).abs() < 1e-9);
    }

    #[test]
    fn truncation_caps_hold() {
        let mut d = ScrapedDeal {
            title: "t".repeat(300),
            summary: String::new(),
            details: "d".repeat(900),
            features: "f".repeat(900),
            url: "u".into(),
            published_at: 0,
        };
        d.truncate();
        assert_eq!(d.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(d.details.chars().count(), MAX_SECTION_CHARS);
        assert_eq!(d.features.chars().count(), MAX_SECTION_CHARS);
    }

    #[test]
    fn describe_skips_empty_sections() {
        let d = ScrapedDeal {
            title: "Wireless mouse".into(),
            summary: "2.4GHz, USB receiver".into(),
            details: String::new(),
            features: String::new(),
            url: "https://example.test/m".into(),
            published_at: 0,
        };
        let s = d.describe();
        assert!(s.contains("Title: Wireless mouse"));
        assert!(s.contains("Summary: 2.4GHz"));
        assert!(!s.contains("Details:"));
        assert!(s.ends_with("URL: https://example.test/m"));
    }
}
