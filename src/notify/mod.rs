pub mod discord;

use anyhow::Result;
use async_trait::async_trait;

use crate::deals::types::Opportunity;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn alert(&self, opportunity: &Opportunity) -> Result<()>;
}
