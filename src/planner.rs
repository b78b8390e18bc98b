//! Orchestrates one scrape-and-price cycle: collect → select → estimate →
//! surface → alert → persist.

use anyhow::Result;

use crate::deals::types::{DealSource, Opportunity};
use crate::memory::OpportunityMemory;
use crate::notify::Notifier;
use crate::pricing::{round_to_cents, EnsembleEstimator, PricingError};
use crate::scanner::DealSelector;

pub struct Planner {
    sources: Vec<Box<dyn DealSource>>,
    selector: Box<dyn DealSelector>,
    ensemble: EnsembleEstimator,
    notifier: Option<Box<dyn Notifier>>,
    memory: OpportunityMemory,
    /// Minimum `estimate - price` for a deal to count as an opportunity.
    discount_threshold: f64,
}

impl Planner {
    pub fn new(
        sources: Vec<Box<dyn DealSource>>,
        selector: Box<dyn DealSelector>,
        ensemble: EnsembleEstimator,
        memory: OpportunityMemory,
        discount_threshold: f64,
    ) -> Self {
        Self {
            sources,
            selector,
            ensemble,
            notifier: None,
            memory,
            discount_threshold,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn memory(&self) -> &OpportunityMemory {
        &self.memory
    }

    /// Run one full cycle and return the newly surfaced opportunities,
    /// best discount first.
    ///
    /// A failed estimate skips that one deal; the pricing core propagates the
    /// error and the fallback policy (skip, keep going) lives here.
    pub async fn run(&mut self) -> Result<Vec<Opportunity>> {
        let seen = self.memory.seen_urls();
        let scraped = crate::deals::collect_deals(&self.sources, &seen).await;
        tracing::info!(count = scraped.len(), "collected deals");
        if scraped.is_empty() {
            return Ok(Vec::new());
        }

        let selection = self.selector.select(&scraped).await?;
        tracing::info!(count = selection.deals.len(), "deals selected for pricing");

        let mut surfaced = Vec::new();
        for deal in selection.deals {
            let estimate = match self.ensemble.price(&deal.product_description).await {
                Ok(v) => v,
                Err(e @ PricingError::Cancelled) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, url = %deal.url, "estimate failed, skipping deal");
                    continue;
                }
            };
            let opp = Opportunity::new(deal, estimate);
            tracing::info!(
                url = %opp.deal.url,
                listed = opp.deal.price,
                estimate = round_to_cents(opp.estimate),
                discount = round_to_cents(opp.discount),
                "deal priced"
            );
            if opp.discount >= self.discount_threshold {
                surfaced.push(opp);
            }
        }

        surfaced.sort_by(|a, b| b.discount.total_cmp(&a.discount));

        if let (Some(notifier), Some(best)) = (&self.notifier, surfaced.first()) {
            if let Err(e) = notifier.alert(best).await {
                tracing::warn!(error = ?e, "alert failed");
            }
        }

        self.memory.record(&surfaced)?;
        Ok(surfaced)
    }
}
