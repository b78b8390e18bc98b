// src/deals/mod.rs
pub mod rss;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::deals::types::{DealSource, ScrapedDeal};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("deals_scraped_total", "Deals parsed from all sources.");
        describe_counter!("deals_kept_total", "Deals kept after normalization + dedup.");
        describe_counter!("deals_dedup_total", "Deals dropped as already seen.");
        describe_counter!("deals_source_errors_total", "Source fetch/parse errors.");
        describe_histogram!("deals_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("deals_last_run_ts", "Unix ts when deal collection last ran.");
    });
}

/// Normalize scraped text: decode HTML entities, strip tags, collapse
/// whitespace into single spaces, trim.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Normalize, truncate and dedup a raw batch. `seen_urls` carries URLs from
/// previous runs; duplicates within the batch are dropped too.
pub fn normalize_and_dedup(
    raw: Vec<ScrapedDeal>,
    seen_urls: &HashSet<String>,
) -> (Vec<ScrapedDeal>, usize) {
    let mut batch_urls: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(raw.len());
    let mut deduped = 0usize;

    for mut deal in raw {
        deal.title = normalize_text(&deal.title);
        deal.summary = normalize_text(&deal.summary);
        deal.details = normalize_text(&deal.details);
        deal.features = normalize_text(&deal.features);
        deal.truncate();

        if deal.title.is_empty() || deal.url.is_empty() {
            continue;
        }
        if seen_urls.contains(&deal.url) || !batch_urls.insert(deal.url.clone()) {
            deduped += 1;
            continue;
        }
        kept.push(deal);
    }

    // Newest first so selection favors fresh listings.
    kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    (kept, deduped)
}

/// Fan in over all sources, then normalize + dedup. Per-source failures are
/// logged and counted; the run continues with whatever the others returned.
pub async fn collect_deals(
    sources: &[Box<dyn DealSource>],
    seen_urls: &HashSet<String>,
) -> Vec<ScrapedDeal> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for source in sources {
        match source.fetch_latest().await {
            Ok(mut v) => raw.append(&mut v),
            Err(e) => {
                tracing::warn!(error = ?e, source = source.name(), "deal source error");
                counter!("deals_source_errors_total").increment(1);
            }
        }
    }

    let (kept, deduped) = normalize_and_dedup(raw, seen_urls);

    counter!("deals_kept_total").increment(kept.len() as u64);
    counter!("deals_dedup_total").increment(deduped as u64);
    gauge!("deals_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    kept
}
