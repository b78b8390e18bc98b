// src/config.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::deals::rss::DEFAULT_FEEDS;

fn default_feeds() -> Vec<String> {
    DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect()
}
fn default_frontier_model() -> String {
    "gpt-4o".to_string()
}
fn default_scanner_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_preprocess_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_discount_threshold() -> f64 {
    50.0
}
fn default_retrieval_k() -> usize {
    5
}
fn default_memory_path() -> String {
    "memory/opportunities.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// RSS feeds to scrape, one per category.
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,
    /// HTTP endpoint of the fine-tuned specialist pricing model.
    pub specialist_endpoint: String,
    #[serde(default = "default_frontier_model")]
    pub frontier_model: String,
    #[serde(default = "default_scanner_model")]
    pub scanner_model: String,
    #[serde(default = "default_preprocess_model")]
    pub preprocess_model: String,
    /// "ENV" means: read from OPENAI_API_KEY.
    pub api_key: String,
    /// Minimum discount (estimate - listed price) to surface a deal.
    #[serde(default = "default_discount_threshold")]
    pub discount_threshold: f64,
    /// How many comparable items to retrieve for frontier context.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
    #[serde(default = "default_memory_path")]
    pub memory_path: String,
    /// Optional Discord webhook for alerts.
    #[serde(default)]
    pub discord_webhook: Option<String>,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AppConfig = serde_json::from_str(&data)?;

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?;
        }

        // Sanitize
        if !cfg.discount_threshold.is_finite() || cfg.discount_threshold < 0.0 {
            cfg.discount_threshold = default_discount_threshold();
        }
        if cfg.feeds.is_empty() {
            cfg.feeds = default_feeds();
        }

        Ok(cfg)
    }
}
