use serde::{Deserialize, Serialize};

use crate::scoring::correlation::CorrelationEntry;
use crate::scoring::normalize::{
    log10_plus_one, market_liquidity_factor, market_price_change_factor, market_volume_factor,
    novelty_tier,
};
use crate::{MarketMetrics, SocialStats, UNKNOWN_AGE_DAYS};

/// Weak prior used when nothing is known about social traction.
pub const DEFAULT_SOCIAL_SCORE: f64 = 0.3;
/// Prior used when the token correlates with no trending meme.
pub const DEFAULT_MEME_SCORE: f64 = 0.2;
const NEUTRAL_SENTIMENT_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct OpportunityInput {
    /// Contract safety score, 0..=100.
    pub safety_score: f64,
    pub age_days: Option<f64>,
    pub market: MarketMetrics,
    pub social: Option<SocialStats>,
    pub correlations: Vec<CorrelationEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OpportunityBreakdown {
    pub novelty_factor: f64,
    pub market_factor: f64,
    pub risk_adjusted_score: f64,
    pub social_score: f64,
    pub meme_score: f64,
    pub opportunity_score: f64,
}

pub fn market_factor(market: &MarketMetrics) -> f64 {
    market_price_change_factor(market.price_change_24h) * 0.4
        + market_volume_factor(market.volume_24h) * 0.3
        + market_liquidity_factor(market.liquidity) * 0.3
}

pub fn risk_adjusted_score(safety_score: f64, novelty_factor: f64, market_factor: f64) -> f64 {
    let safety = if safety_score.is_finite() {
        safety_score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    safety / 100.0 * 0.5 + novelty_factor * 0.25 + market_factor * 0.25
}

pub fn social_score(social: Option<&SocialStats>) -> f64 {
    // No mentions scores the prior, same as missing data.
    let Some(stats) = social.filter(|stats| stats.mentions > 0.0) else {
        return DEFAULT_SOCIAL_SCORE;
    };
    let mentions_factor = (log10_plus_one(stats.mentions) / 3.0).min(1.0);
    let engagement_factor = (log10_plus_one(stats.engagement) / 4.0).min(1.0);
    let sentiment_factor = stats
        .average_sentiment
        .filter(|sentiment| sentiment.is_finite())
        .map(|sentiment| (sentiment.clamp(-1.0, 1.0) + 1.0) / 2.0)
        .unwrap_or(NEUTRAL_SENTIMENT_FACTOR);

    mentions_factor * 0.4 + engagement_factor * 0.3 + sentiment_factor * 0.3
}

pub fn meme_score(correlations: &[CorrelationEntry]) -> f64 {
    if correlations.is_empty() {
        return DEFAULT_MEME_SCORE;
    }
    let count = correlations.len() as f64;
    let average = correlations
        .iter()
        .map(|entry| entry.correlation_score)
        .sum::<f64>()
        / count;
    (average + (count * 0.05).min(0.3)).min(1.0)
}

pub fn score_opportunity(input: &OpportunityInput) -> OpportunityBreakdown {
    let novelty_factor = novelty_tier(input.age_days.unwrap_or(UNKNOWN_AGE_DAYS));
    let market_factor = market_factor(&input.market);
    let risk_adjusted_score = risk_adjusted_score(input.safety_score, novelty_factor, market_factor);
    let social_score = social_score(input.social.as_ref());
    let meme_score = meme_score(&input.correlations);

    OpportunityBreakdown {
        novelty_factor,
        market_factor,
        risk_adjusted_score,
        social_score,
        meme_score,
        opportunity_score: risk_adjusted_score * 0.4 + social_score * 0.3 + meme_score * 0.3,
    }
}
