use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::time::Duration;
use tracing::warn;

use crate::config::ScoutConfig;
use crate::providers::{MarketDataProvider, Sourced};
use crate::{MarketListing, MarketMetrics};

#[derive(Clone)]
pub struct DexScreenerProvider {
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    #[serde(default)]
    price_usd: Option<String>,
    #[serde(default)]
    volume: Option<Window>,
    #[serde(default)]
    price_change: Option<Window>,
    #[serde(default)]
    liquidity: Option<Liquidity>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    fdv: Option<f64>,
    #[serde(default)]
    pair_created_at: Option<i64>,
    #[serde(default)]
    base_token: Option<BaseToken>,
}

#[derive(Debug, Deserialize)]
struct Window {
    #[serde(default)]
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    #[serde(default)]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BaseToken {
    name: Option<String>,
    symbol: Option<String>,
}

impl DexScreenerProvider {
    pub fn from_config(config: &ScoutConfig) -> Result<Self, String> {
        let timeout = Duration::from_millis(config.providers.timeout_ms);
        DexScreenerProvider::new(config.providers.dexscreener_base.clone(), timeout)
    }

    pub fn new(api_base: String, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| format!("failed to build dexscreener client: {}", err))?;
        Ok(Self { api_base, client })
    }

    async fn fetch_pairs(&self, address: &str) -> Result<Vec<Pair>, String> {
        let url = format!(
            "{}/latest/dex/tokens/{}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(address)
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| format!("dexscreener request failed: {}", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("dexscreener error {}: {}", status, body.trim()));
        }

        let body: TokenPairsResponse = response
            .json()
            .await
            .map_err(|err| format!("dexscreener response parse failed: {}", err))?;
        Ok(body.pairs.unwrap_or_default())
    }
}

/// Picks the deepest pool; a token with no pools is listed with zeroes.
fn listing_from_pairs(pairs: &[Pair]) -> MarketListing {
    let deepest = pairs.iter().max_by(|a, b| {
        pair_liquidity(a)
            .partial_cmp(&pair_liquidity(b))
            .unwrap_or(Ordering::Equal)
    });
    let Some(pair) = deepest else {
        return MarketListing::default();
    };

    let metrics = MarketMetrics {
        price: pair
            .price_usd
            .as_deref()
            .and_then(|price| price.parse::<f64>().ok())
            .unwrap_or(0.0),
        volume_24h: pair.volume.as_ref().and_then(|w| w.h24).unwrap_or(0.0),
        liquidity: pair_liquidity(pair),
        market_cap: pair.market_cap.or(pair.fdv).unwrap_or(0.0),
        price_change_24h: pair.price_change.as_ref().and_then(|w| w.h24).unwrap_or(0.0),
    };

    MarketListing {
        metrics,
        name: pair.base_token.as_ref().and_then(|token| token.name.clone()),
        symbol: pair.base_token.as_ref().and_then(|token| token.symbol.clone()),
        pair_created_at: pair.pair_created_at.and_then(millis_to_datetime),
    }
}

fn pair_liquidity(pair: &Pair) -> f64 {
    pair.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[async_trait]
impl MarketDataProvider for DexScreenerProvider {
    async fn market_listing(&self, address: &str) -> Sourced<MarketListing> {
        match self.fetch_pairs(address).await {
            Ok(pairs) => Sourced::Available(listing_from_pairs(&pairs)),
            Err(err) => {
                warn!(token = %address, error = %err, "market lookup failed");
                Sourced::unavailable(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_deepest_pair() {
        let body: TokenPairsResponse = serde_json::from_str(
            r#"{
                "pairs": [
                    {"priceUsd": "0.001", "liquidity": {"usd": 500.0}, "volume": {"h24": 10.0}},
                    {"priceUsd": "0.002", "liquidity": {"usd": 90000.0}, "volume": {"h24": 25000.0},
                     "priceChange": {"h24": -12.5}, "fdv": 1500000.0, "pairCreatedAt": 1700000000000,
                     "baseToken": {"name": "Dog Wif Hat", "symbol": "WIF"}}
                ]
            }"#,
        )
        .unwrap();
        let listing = listing_from_pairs(&body.pairs.unwrap());
        assert!((listing.metrics.price - 0.002).abs() < 1e-12);
        assert!((listing.metrics.liquidity - 90000.0).abs() < 1e-9);
        assert!((listing.metrics.price_change_24h + 12.5).abs() < 1e-9);
        assert!((listing.metrics.market_cap - 1500000.0).abs() < 1e-9);
        assert_eq!(listing.symbol.as_deref(), Some("WIF"));
        assert!(listing.pair_created_at.is_some());
    }

    #[test]
    fn no_pairs_means_zeroed_listing() {
        let body: TokenPairsResponse = serde_json::from_str(r#"{"pairs": null}"#).unwrap();
        let listing = listing_from_pairs(&body.pairs.unwrap_or_default());
        assert_eq!(listing.metrics, MarketMetrics::default());
    }
}
