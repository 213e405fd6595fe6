//! Content catalog boundary.
//!
//! The catalog is an external, read-only lookup service. The engine consumes
//! it through [`ContentCatalog`]; failures are retried with bounded backoff
//! at session-creation time only. In-progress sessions run off cards cached
//! at creation and never call back into the catalog.

mod seed;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

use crate::domain::cards::{Category, ChallengeCard, QualityTier, RoleCard, SynergyCard};

pub use seed::SeedCatalog;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn challenge_cards(&self, category: Category) -> Result<Vec<ChallengeCard>, CatalogError>;

    /// Role cards whose quality for `category` is one of `tiers`.
    async fn role_cards_by_quality(
        &self,
        category: Category,
        tiers: &[QualityTier],
    ) -> Result<Vec<RoleCard>, CatalogError>;

    async fn synergy_cards(&self) -> Result<Vec<SynergyCard>, CatalogError>;
}

/// Run `op` with bounded exponential backoff.
///
/// `attempts` is the total number of tries; the delay doubles after each
/// failure starting from `base`. Used only on the session-creation path.
pub async fn with_retry<T, F, Fut>(
    attempts: u32,
    base: Duration,
    mut op: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                let delay = base.saturating_mul(2u32.saturating_pow(attempt - 1));
                warn!(
                    error = %err,
                    attempt,
                    retry_delay_ms = delay.as_millis() as u64,
                    "catalog lookup failed, retrying"
                );
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
