pub mod analysis;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod providers;
pub mod scoring;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use analysis::Analyzer;
pub use error::{Result, ScoutError};

/// Token age assumed when neither the chain nor the DEX listing reports a
/// creation time.
pub const UNKNOWN_AGE_DAYS: f64 = 30.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFacts {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub supply: f64,
    pub decimals: u8,
    pub created_at: Option<DateTime<Utc>>,
    pub mint_authority_present: bool,
    pub freeze_authority_present: bool,
    pub holder_count: u64,
    pub top_holder_percentage: f64,
}

impl TokenFacts {
    /// The worst-case facts substituted when the chain lookup fails.
    pub fn pessimistic(address: &str) -> Self {
        Self {
            address: address.to_string(),
            name: String::new(),
            symbol: String::new(),
            supply: 0.0,
            decimals: 0,
            created_at: None,
            mint_authority_present: true,
            freeze_authority_present: true,
            holder_count: 0,
            top_holder_percentage: 100.0,
        }
    }
}

/// Age in fractional days, clamped at zero for creation times in the future.
pub fn age_in_days(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<f64> {
    created_at.map(|created| {
        let seconds = (now - created).num_seconds() as f64;
        (seconds / SECONDS_PER_DAY).max(0.0)
    })
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketMetrics {
    pub price: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub market_cap: f64,
    pub price_change_24h: f64,
}

impl MarketMetrics {
    pub fn has_liquidity(&self) -> bool {
        self.liquidity > 0.0
    }
}

/// Market metrics plus the identity details a DEX listing carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketListing {
    pub metrics: MarketMetrics,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub pair_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Reddit,
    Telegram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Twitter, Platform::Reddit, Platform::Telegram];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Reddit => "reddit",
            Platform::Telegram => "telegram",
        }
    }

    /// Weight of the platform in the cross-platform sentiment average.
    pub fn sentiment_weight(self) -> f64 {
        match self {
            Platform::Twitter => 0.5,
            Platform::Reddit => 0.3,
            Platform::Telegram => 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialSignal {
    pub count: u64,
    /// -1.0 (negative) to 1.0 (positive).
    pub sentiment: f64,
    pub engagement: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialSnapshot {
    #[serde(default)]
    pub twitter: SocialSignal,
    #[serde(default)]
    pub reddit: SocialSignal,
    #[serde(default)]
    pub telegram: SocialSignal,
}

impl SocialSnapshot {
    pub fn platform(&self, platform: Platform) -> &SocialSignal {
        match platform {
            Platform::Twitter => &self.twitter,
            Platform::Reddit => &self.reddit,
            Platform::Telegram => &self.telegram,
        }
    }

    pub fn total_mentions(&self) -> u64 {
        Platform::ALL
            .iter()
            .map(|platform| self.platform(*platform).count)
            .sum()
    }

    pub fn total_engagement(&self) -> f64 {
        Platform::ALL
            .iter()
            .map(|platform| self.platform(*platform).engagement.max(0.0))
            .sum()
    }

    /// Platform-weighted sentiment; platforms without mentions are left out
    /// of both numerator and denominator.
    pub fn average_sentiment(&self) -> f64 {
        let mut weighted = 0.0;
        let mut weights = 0.0;
        for platform in Platform::ALL {
            let signal = self.platform(platform);
            if signal.count > 0 {
                let sentiment = signal.sentiment.clamp(-1.0, 1.0);
                weighted += sentiment * platform.sentiment_weight();
                weights += platform.sentiment_weight();
            }
        }
        if weights <= 0.0 {
            0.0
        } else {
            weighted / weights
        }
    }

    /// Engagement figure fed to the hype scorer: twitter engagement plus
    /// reddit mentions x5 and telegram mentions x3.
    pub fn hype_engagement(&self) -> f64 {
        self.twitter.engagement.max(0.0)
            + self.reddit.count as f64 * 5.0
            + self.telegram.count as f64 * 3.0
    }
}

/// Aggregated social statistics as consumed by the opportunity scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SocialStats {
    pub mentions: f64,
    pub engagement: f64,
    pub average_sentiment: Option<f64>,
}

impl From<&SocialSnapshot> for SocialStats {
    fn from(snapshot: &SocialSnapshot) -> Self {
        let mentions = snapshot.total_mentions();
        Self {
            mentions: mentions as f64,
            engagement: snapshot.total_engagement(),
            average_sentiment: if mentions > 0 {
                Some(snapshot.average_sentiment())
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingMeme {
    pub name: String,
    pub source: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskTier::Low
        } else if score >= 50.0 {
            RiskTier::Medium
        } else if score >= 20.0 {
            RiskTier::High
        } else {
            RiskTier::Extreme
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
            RiskTier::Extreme => "Extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationCategory {
    Established,
    New,
    Speculative,
}

impl AllocationCategory {
    pub fn label(self) -> &'static str {
        match self {
            AllocationCategory::Established => "established",
            AllocationCategory::New => "new",
            AllocationCategory::Speculative => "speculative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
    VeryAggressive,
}

impl RiskTolerance {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "conservative" | "low" => Some(RiskTolerance::Conservative),
            "moderate" | "medium" => Some(RiskTolerance::Moderate),
            "aggressive" | "high" => Some(RiskTolerance::Aggressive),
            "very_aggressive" | "degen" => Some(RiskTolerance::VeryAggressive),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
            RiskTolerance::VeryAggressive => "very_aggressive",
        }
    }
}

pub fn format_usd(value: f64) -> String {
    let cents = (value.max(0.0) * 100.0).round() as i64;
    let mut chars: Vec<char> = (cents / 100).to_string().chars().collect();
    let mut whole = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            whole.push(',');
            count = 0;
        }
        whole.push(ch);
        count += 1;
    }

    format!("${}.{:02}", whole.chars().rev().collect::<String>(), cents % 100)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_usd_groups_thousands() {
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(0.5), "$0.50");
        assert_eq!(format_usd(-3.0), "$0.00");
    }

    #[test]
    fn sentiment_average_skips_silent_platforms() {
        let snapshot = SocialSnapshot {
            twitter: SocialSignal { count: 10, sentiment: 0.4, engagement: 100.0 },
            reddit: SocialSignal { count: 0, sentiment: -1.0, engagement: 0.0 },
            telegram: SocialSignal { count: 2, sentiment: -0.6, engagement: 0.0 },
        };
        let expected = (0.4 * 0.5 + -0.6 * 0.2) / 0.7;
        assert!((snapshot.average_sentiment() - expected).abs() < 1e-9);
        assert_eq!(SocialSnapshot::default().average_sentiment(), 0.0);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(RiskTier::from_score(80.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(79.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(50.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(20.0), RiskTier::High);
        assert_eq!(RiskTier::from_score(19.9), RiskTier::Extreme);
    }

    #[test]
    fn age_never_negative() {
        let now = Utc::now();
        let future = now + chrono::Duration::days(2);
        assert_eq!(age_in_days(Some(future), now), Some(0.0));
        assert_eq!(age_in_days(None, now), None);
    }
}
