//! Bargain Scout — binary entrypoint.
//! Runs one scrape-and-price cycle and logs the surfaced opportunities.
//! Scheduling repeated runs is left to the operator (cron, systemd timer).

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bargain_scout::config::AppConfig;
use bargain_scout::deals::rss::DealFeedSource;
use bargain_scout::deals::types::DealSource;
use bargain_scout::memory::OpportunityMemory;
use bargain_scout::notify::discord::DiscordNotifier;
use bargain_scout::planner::Planner;
use bargain_scout::pricing::frontier::{FrontierEstimator, NoRetrieval};
use bargain_scout::pricing::openai::ChatClient;
use bargain_scout::pricing::preprocess::OpenAiPreprocessor;
use bargain_scout::pricing::specialist::SpecialistEstimator;
use bargain_scout::pricing::{round_to_cents, EnsembleEstimator, TracingObserver};
use bargain_scout::scanner::DealScanner;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bargain_scout=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config_path =
        std::env::var("BARGAIN_SCOUT_CONFIG").unwrap_or_else(|_| "config/app.json".to_string());
    let cfg = AppConfig::load_from_file(&config_path)?;

    let chat = ChatClient::new(cfg.api_key.clone());
    let ensemble = EnsembleEstimator::new(
        Arc::new(OpenAiPreprocessor::new(chat.clone(), cfg.preprocess_model.clone())),
        Arc::new(SpecialistEstimator::new(cfg.specialist_endpoint.clone())),
        Arc::new(FrontierEstimator::new(
            chat.clone(),
            cfg.frontier_model.clone(),
            Arc::new(NoRetrieval),
            cfg.retrieval_k,
        )),
    )
    .with_observer(Arc::new(TracingObserver));

    let sources: Vec<Box<dyn DealSource>> = cfg
        .feeds
        .iter()
        .map(|url| Box::new(DealFeedSource::from_url(url.clone())) as Box<dyn DealSource>)
        .collect();

    let memory = OpportunityMemory::load(&cfg.memory_path)?;
    let scanner = DealScanner::new(chat, cfg.scanner_model.clone());

    let mut planner = Planner::new(
        sources,
        Box::new(scanner),
        ensemble,
        memory,
        cfg.discount_threshold,
    );
    if let Some(webhook) = cfg.discord_webhook.clone() {
        planner = planner.with_notifier(Box::new(DiscordNotifier::new(webhook)));
    }

    let surfaced = planner.run().await?;
    if surfaced.is_empty() {
        tracing::info!("no opportunities this run");
    }
    for opp in &surfaced {
        tracing::info!(
            listed = opp.deal.price,
            estimate = round_to_cents(opp.estimate),
            discount = round_to_cents(opp.discount),
            url = %opp.deal.url,
            "opportunity"
        );
    }
    Ok(())
}
