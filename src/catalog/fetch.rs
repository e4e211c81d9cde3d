//! One-shot download of the card dataset.

use std::time::Duration;

use tracing::info;

use crate::catalog::card::Card;
use crate::catalog::store::CardCatalog;
use crate::common::error::CatalogError;
use crate::config::types::CatalogConfig;

/// Fetch every card from the configured endpoint.
///
/// Called once at startup; any failure is fatal.
pub async fn fetch_catalog(
    config: &CatalogConfig,
    timeout: Duration,
) -> Result<CardCatalog, CatalogError> {
    let url = &config.cards_url;
    let fetch_err = |source: reqwest::Error| CatalogError::Fetch {
        url: url.clone(),
        source,
    };

    info!("Fetching card catalog from {}", url);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_err)?;

    let cards: Vec<Card> = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_err)?
        .json()
        .await
        .map_err(fetch_err)?;

    let catalog = CardCatalog::from_cards(cards);
    if catalog.is_empty() {
        return Err(CatalogError::Empty { url: url.clone() });
    }

    Ok(catalog)
}
