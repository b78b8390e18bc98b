//! Deal feed source: parses deal-site RSS into [`ScrapedDeal`]s.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::deals::types::{DealSource, ScrapedDeal};

/// Default feeds, one per product category.
pub const DEFAULT_FEEDS: &[&str] = &[
    "https://www.dealnews.com/c142/Electronics/?rss=1",
    "https://www.dealnews.com/c39/Computers/?rss=1",
    "https://www.dealnews.com/f1912/Smart-Home/?rss=1",
    "https://www.dealnews.com/c238/Automotive/?rss=1",
    "https://www.dealnews.com/c196/Home-Garden/?rss=1",
];

/// Cap per feed so one busy category cannot flood the scanner prompt.
const MAX_ITEMS_PER_FEED: usize = 10;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

pub struct DealFeedSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl DealFeedSource {
    /// Parse from an in-memory XML document (tests, replays).
    pub fn from_xml_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client: reqwest::Client::new(),
            },
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<ScrapedDeal>> {
        let t0 = std::time::Instant::now();
        let rss: Rss = from_str(s).context("parsing deal rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(MAX_ITEMS_PER_FEED));
        for it in rss.channel.item.into_iter().take(MAX_ITEMS_PER_FEED) {
            let url = match it.link {
                Some(u) if !u.is_empty() => u,
                _ => continue,
            };
            out.push(ScrapedDeal {
                title: it.title.unwrap_or_default(),
                summary: it.description.unwrap_or_default(),
                details: String::new(),
                features: String::new(),
                url,
                published_at: it
                    .pub_date
                    .as_deref()
                    .map(parse_rfc2822_to_unix)
                    .unwrap_or(0),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("deals_parse_ms").record(ms);
        counter!("deals_scraped_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl DealSource for DealFeedSource {
    async fn fetch_latest(&self) -> Result<Vec<ScrapedDeal>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .context("deal feed get()")?
                    .text()
                    .await
                    .context("deal feed .text()")?;
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "deal-rss"
    }
}
