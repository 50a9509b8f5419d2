//! File-backed and in-memory collaborators.
//!
//! The file providers re-read their JSON on every call so an external job
//! can refresh the data without restarting the service.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::providers::{
    ChainMetadataProvider, MarketDataProvider, SocialDataProvider, Sourced, TrendingMemeFeed,
};
use crate::{MarketListing, SocialSnapshot, TokenFacts, TrendingMeme};

async fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf, what: &str) -> Result<T, String> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| format!("failed to read {} from {}: {}", what, path.display(), err))?;
    serde_json::from_str(&data).map_err(|err| format!("failed to parse {}: {}", what, err))
}

/// Social aggregates keyed by token symbol (case-insensitive).
pub struct FileSocialProvider {
    path: PathBuf,
}

impl FileSocialProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SocialDataProvider for FileSocialProvider {
    async fn social_signals(&self, symbol: &str, _name: &str) -> Sourced<SocialSnapshot> {
        let table: HashMap<String, SocialSnapshot> = match read_json(&self.path, "social data").await {
            Ok(table) => table,
            Err(err) => return Sourced::unavailable(err),
        };
        let wanted = symbol.trim().to_lowercase();
        table
            .into_iter()
            .find(|(key, _)| key.trim().to_lowercase() == wanted)
            .map(|(_, snapshot)| Sourced::Available(snapshot))
            .unwrap_or_else(|| Sourced::unavailable(format!("no social data for {}", symbol)))
    }
}

pub struct FileMemeFeed {
    path: PathBuf,
}

impl FileMemeFeed {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TrendingMemeFeed for FileMemeFeed {
    async fn trending_memes(&self) -> Sourced<Vec<TrendingMeme>> {
        match read_json(&self.path, "trending memes").await {
            Ok(memes) => Sourced::Available(memes),
            Err(err) => Sourced::unavailable(err),
        }
    }
}

/// Token facts from a JSON list, looked up by mint address.
pub struct FileChainProvider {
    path: PathBuf,
}

impl FileChainProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ChainMetadataProvider for FileChainProvider {
    async fn token_facts(&self, address: &str) -> Sourced<TokenFacts> {
        let facts: Vec<TokenFacts> = match read_json(&self.path, "token facts").await {
            Ok(facts) => facts,
            Err(err) => return Sourced::unavailable(err),
        };
        facts
            .into_iter()
            .find(|fact| fact.address == address)
            .map(Sourced::Available)
            .unwrap_or_else(|| Sourced::unavailable(format!("no token facts for {}", address)))
    }
}

#[derive(Default)]
pub struct StaticChainProvider {
    facts: HashMap<String, TokenFacts>,
}

impl StaticChainProvider {
    pub fn new(facts: Vec<TokenFacts>) -> Self {
        Self {
            facts: facts
                .into_iter()
                .map(|fact| (fact.address.clone(), fact))
                .collect(),
        }
    }
}

#[async_trait]
impl ChainMetadataProvider for StaticChainProvider {
    async fn token_facts(&self, address: &str) -> Sourced<TokenFacts> {
        self.facts
            .get(address)
            .cloned()
            .map(Sourced::Available)
            .unwrap_or_else(|| Sourced::unavailable(format!("mint account {} not found", address)))
    }
}

#[derive(Default)]
pub struct StaticMarketProvider {
    listings: HashMap<String, MarketListing>,
}

impl StaticMarketProvider {
    pub fn new(listings: Vec<(String, MarketListing)>) -> Self {
        Self {
            listings: listings.into_iter().collect(),
        }
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketProvider {
    async fn market_listing(&self, address: &str) -> Sourced<MarketListing> {
        self.listings
            .get(address)
            .cloned()
            .map(Sourced::Available)
            .unwrap_or_else(|| Sourced::unavailable(format!("no market data for {}", address)))
    }
}

#[derive(Default)]
pub struct StaticSocialProvider {
    snapshots: HashMap<String, SocialSnapshot>,
}

impl StaticSocialProvider {
    pub fn new(snapshots: Vec<(String, SocialSnapshot)>) -> Self {
        Self {
            snapshots: snapshots
                .into_iter()
                .map(|(symbol, snapshot)| (symbol.to_lowercase(), snapshot))
                .collect(),
        }
    }
}

#[async_trait]
impl SocialDataProvider for StaticSocialProvider {
    async fn social_signals(&self, symbol: &str, _name: &str) -> Sourced<SocialSnapshot> {
        self.snapshots
            .get(&symbol.trim().to_lowercase())
            .copied()
            .map(Sourced::Available)
            .unwrap_or_else(|| Sourced::unavailable(format!("no social data for {}", symbol)))
    }
}

#[derive(Default)]
pub struct StaticMemeFeed {
    memes: Vec<TrendingMeme>,
}

impl StaticMemeFeed {
    pub fn new(memes: Vec<TrendingMeme>) -> Self {
        Self { memes }
    }
}

#[async_trait]
impl TrendingMemeFeed for StaticMemeFeed {
    async fn trending_memes(&self) -> Sourced<Vec<TrendingMeme>> {
        Sourced::Available(self.memes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIF: &str = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("meme-scout-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn chain_facts_are_read_from_file() {
        let path = temp_path("tokens");
        let body = serde_json::json!([{
            "address": WIF,
            "name": "dogwifhat",
            "symbol": "WIF",
            "supply": 998_900_000.0,
            "decimals": 6,
            "mint_authority_present": false,
            "freeze_authority_present": false,
            "holder_count": 20,
            "top_holder_percentage": 7.5
        }]);
        tokio::fs::write(&path, body.to_string()).await.unwrap();

        let provider = FileChainProvider::new(path.clone());
        let facts = provider.token_facts(WIF).await.available().unwrap();
        assert_eq!(facts.symbol, "WIF");
        assert!(facts.created_at.is_none());
        assert!(!provider.token_facts("GhostMint").await.is_available());
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_chain_file_is_unavailable() {
        let provider = FileChainProvider::new(temp_path("no-such-tokens"));
        let facts = provider.token_facts(WIF).await;
        assert!(facts.reason().unwrap_or_default().contains("token facts"));
    }
}
