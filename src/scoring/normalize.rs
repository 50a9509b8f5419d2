//! Bounded factors derived from raw metrics.
//!
//! Several metrics are normalised differently depending on the consumer: the
//! hype scorer works with multiplicative factors around 1.0, while the
//! opportunity scorer blends additive factors in 0..1. The two families are
//! kept apart on purpose; merging them would shift every published score.
//!
//! | metric       | hype (`hype_*`)            | opportunity (`market_*`, `novelty_tier`) |
//! |--------------|----------------------------|------------------------------------------|
//! | age          | continuous, 0.5..1.5       | discrete tiers, 0.2..1.0                 |
//! | volume       | log10/4, 0.2..2.0          | log10/6, 0..1                            |
//! | price change | (pct+100)/100, 0.5..2.0    | split around 0.5, 0..1.5                 |

/// `log10(value + 1)` with zero, negative and NaN inputs mapped to 0.
pub fn log10_plus_one(value: f64) -> f64 {
    if value.is_nan() || value <= 0.0 {
        0.0
    } else {
        (value + 1.0).log10()
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Hype age factor: newer tokens score higher, settling at 0.5 after 45 days.
pub fn hype_age_factor(age_days: f64) -> f64 {
    let age = finite_or(age_days, crate::UNKNOWN_AGE_DAYS).max(0.0);
    (2.0 - age / 30.0).clamp(0.5, 1.5)
}

pub fn hype_volume_factor(volume_24h: f64) -> f64 {
    (log10_plus_one(volume_24h) / 4.0).clamp(0.2, 2.0)
}

pub fn hype_price_change_factor(price_change_24h: f64) -> f64 {
    let change = finite_or(price_change_24h, 0.0);
    ((change + 100.0) / 100.0).clamp(0.5, 2.0)
}

pub fn hype_engagement_factor(engagement: f64) -> f64 {
    (log10_plus_one(engagement) / 2.0).clamp(0.2, 2.0)
}

/// Maps sentiment in -1..1 onto 0.5..1.5.
pub fn hype_sentiment_factor(sentiment: f64) -> f64 {
    finite_or(sentiment, 0.0).clamp(-1.0, 1.0) * 0.5 + 1.0
}

/// Discrete novelty used by the opportunity scorer. Upper bounds are
/// exclusive, so a token exactly seven days old lands in the 0.6 tier.
pub fn novelty_tier(age_days: f64) -> f64 {
    let age = finite_or(age_days, crate::UNKNOWN_AGE_DAYS).max(0.0);
    if age < 1.0 {
        1.0
    } else if age < 7.0 {
        0.8
    } else if age < 30.0 {
        0.6
    } else if age < 90.0 {
        0.4
    } else {
        0.2
    }
}

pub fn market_volume_factor(volume_24h: f64) -> f64 {
    (log10_plus_one(volume_24h) / 6.0).min(1.0)
}

pub fn market_liquidity_factor(liquidity: f64) -> f64 {
    (log10_plus_one(liquidity) / 6.0).min(1.0)
}

pub fn market_price_change_factor(price_change_24h: f64) -> f64 {
    let change = finite_or(price_change_24h, 0.0);
    if change > 0.0 {
        (change / 100.0).min(1.0) + 0.5
    } else {
        (0.5 - change.abs() / 100.0).max(0.0)
    }
}
