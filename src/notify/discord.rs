use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;
use crate::deals::types::Opportunity;
use crate::pricing::round_to_cents;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    fn render(opportunity: &Opportunity) -> (String, String) {
        let title = format!(
            "Bargain found: ${:.2} off",
            round_to_cents(opportunity.discount)
        );
        let description = format!(
            "{}\n**Listed:** ${:.2}\n**Estimated:** ${:.2}\n**Discount:** ${:.2}\n{}",
            opportunity.deal.product_description,
            opportunity.deal.price,
            round_to_cents(opportunity.estimate),
            round_to_cents(opportunity.discount),
            opportunity.deal.url
        );
        (title, description)
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn alert(&self, opportunity: &Opportunity) -> Result<()> {
        let (title, description) = Self::render(opportunity);
        let payload = DiscordWebhookPayload::embed(&title, &description);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("Discord webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {e}"));
                }
            }
        }
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn embed(title: &str, description: &str) -> Self {
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: title.to_string(),
                description: description.to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deals::types::Deal;

    #[test]
    fn render_shows_rounded_amounts_and_url() {
        let opp = Opportunity::new(
            Deal {
                product_description: "A decent office chair.".into(),
                price: 99.99,
                url: "https://example.test/chair".into(),
            },
            176.499,
        );
        let (title, desc) = DiscordNotifier::render(&opp);
        assert_eq!(title, "Bargain found: $76.51 off");
        assert!(desc.contains("**Listed:** $99.99"));
        assert!(desc.contains("**Estimated:** $176.50"));
        assert!(desc.contains("https://example.test/chair"));
    }
}
