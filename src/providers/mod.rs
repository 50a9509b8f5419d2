//! External collaborators that feed raw data into the scoring engine.
//!
//! Every fetch returns [`Sourced`] so callers can tell a legitimate zero
//! from missing data. Providers never return errors for a failed lookup;
//! the failure reason travels inside [`Sourced::Unavailable`].

pub mod dexscreener;
pub mod fixtures;
pub mod solana;

use async_trait::async_trait;

use crate::{MarketListing, SocialSnapshot, TokenFacts, TrendingMeme};

pub use dexscreener::DexScreenerProvider;
pub use fixtures::{FileChainProvider, FileMemeFeed, FileSocialProvider, StaticChainProvider, StaticMarketProvider, StaticMemeFeed, StaticSocialProvider};
pub use solana::SolanaRpcProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Sourced<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Sourced::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Sourced::Available(_))
    }

    pub fn available(self) -> Option<T> {
        match self {
            Sourced::Available(value) => Some(value),
            Sourced::Unavailable { .. } => None,
        }
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Sourced::Available(value) => Some(value),
            Sourced::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Sourced::Available(_) => None,
            Sourced::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T: Default> Sourced<T> {
    /// The zeroed sentinel the engine scores with when data is missing.
    pub fn or_default(self) -> T {
        self.available().unwrap_or_default()
    }
}

#[async_trait]
pub trait ChainMetadataProvider: Send + Sync {
    async fn token_facts(&self, address: &str) -> Sourced<TokenFacts>;
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn market_listing(&self, address: &str) -> Sourced<MarketListing>;
}

#[async_trait]
pub trait SocialDataProvider: Send + Sync {
    async fn social_signals(&self, symbol: &str, name: &str) -> Sourced<SocialSnapshot>;
}

/// A finite listing of currently trending memes; every call starts over.
#[async_trait]
pub trait TrendingMemeFeed: Send + Sync {
    async fn trending_memes(&self) -> Sourced<Vec<TrendingMeme>>;
}
