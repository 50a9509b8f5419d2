//! Orchestration around the pure scoring engine.
//!
//! The [`Analyzer`] fetches raw data through its collaborators, substitutes
//! documented defaults for anything unavailable, runs the engine, and writes
//! the audit trail. Persistence failures are logged and never fail a call.

use chrono::{Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{require_address, Result, ScoutError};
use crate::providers::{
    ChainMetadataProvider, MarketDataProvider, SocialDataProvider, Sourced, TrendingMemeFeed,
};
use crate::scoring::{
    allocate_portfolio, assess_safety, contract_safety_score, find_missing_memes,
    pessimistic_assessment, score_hype, score_opportunity, CorrelationConfig, CorrelationEntry,
    HypeBreakdown, HypeInput, MemeCorrelator, MissingMemeOpportunity, OpportunityBreakdown,
    OpportunityInput, PortfolioCandidate, PortfolioPlan, SafetyAssessment, SafetyMetrics,
};
use crate::store::{
    record_id, AllocationRecord, CorrelationRecord, HypeScoreRecord, PersistenceSink,
    SafetyCheckRecord, SocialSignalRecord,
};
use crate::{
    age_in_days, MarketListing, Platform, RiskTolerance, SocialSnapshot, SocialStats, TokenFacts,
    TrendingMeme,
};

const SOCIAL_HISTORY_DAYS: i64 = 7;

/// Explicitly constructed collaborator handles.
#[derive(Clone)]
pub struct Collaborators {
    pub chain: Arc<dyn ChainMetadataProvider>,
    pub market: Arc<dyn MarketDataProvider>,
    pub social: Arc<dyn SocialDataProvider>,
    pub memes: Arc<dyn TrendingMemeFeed>,
    pub sink: Arc<dyn PersistenceSink>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DataAvailability {
    pub chain: bool,
    pub market: bool,
    pub social: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypeReport {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    pub hype_score: u8,
    pub breakdown: HypeBreakdown,
    pub social: SocialSnapshot,
    pub availability: DataAvailability,
    pub data_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    #[serde(flatten)]
    pub assessment: SafetyAssessment,
    pub metrics: SafetyMetrics,
    pub availability: DataAvailability,
    pub data_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub token_address: Option<String>,
    pub name: String,
    pub symbol: String,
    pub correlations: Vec<CorrelationEntry>,
    pub top_match: Option<CorrelationEntry>,
    pub predicted_opportunity: bool,
    pub memes_considered: usize,
    pub data_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemeOpportunitiesReport {
    pub opportunities: Vec<MissingMemeOpportunity>,
    pub memes_considered: usize,
    pub known_tokens: usize,
    pub data_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityReport {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    pub safety_score: f64,
    pub age_days: Option<f64>,
    #[serde(flatten)]
    pub breakdown: OpportunityBreakdown,
    pub correlations: Vec<CorrelationEntry>,
    pub social_source: SocialSource,
    pub availability: DataAvailability,
    pub data_warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialSource {
    Live,
    History,
    Prior,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedToken {
    pub token_address: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    #[serde(flatten)]
    pub plan: PortfolioPlan,
    pub evaluated: Vec<OpportunityReport>,
    pub skipped: Vec<SkippedToken>,
    pub data_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingReport {
    pub memes: Vec<TrendingMeme>,
    pub available: bool,
    pub data_warnings: Vec<String>,
}

struct TokenContext {
    address: String,
    name: String,
    symbol: String,
    facts: Sourced<TokenFacts>,
    listing: Sourced<MarketListing>,
    age_days: Option<f64>,
    warnings: Vec<String>,
}

impl TokenContext {
    fn has_liquidity(&self) -> bool {
        self.listing
            .as_available()
            .map(|listing| listing.metrics.has_liquidity())
            .unwrap_or(false)
    }

    fn market(&self) -> crate::MarketMetrics {
        self.listing
            .as_available()
            .map(|listing| listing.metrics)
            .unwrap_or_default()
    }

    fn safety_metrics(&self) -> Option<SafetyMetrics> {
        self.facts.as_available().map(|facts| SafetyMetrics {
            mint_authority_present: facts.mint_authority_present,
            freeze_authority_present: facts.freeze_authority_present,
            top_holder_percentage: facts.top_holder_percentage,
            holder_count: facts.holder_count,
            has_liquidity: self.has_liquidity(),
        })
    }

    fn availability(&self, social: bool) -> DataAvailability {
        DataAvailability {
            chain: self.facts.is_available(),
            market: self.listing.is_available(),
            social,
        }
    }
}

pub struct Analyzer {
    collaborators: Collaborators,
    correlator: MemeCorrelator,
}

impl Analyzer {
    pub fn new(collaborators: Collaborators, correlation: CorrelationConfig) -> Self {
        Self {
            collaborators,
            correlator: MemeCorrelator::new(correlation),
        }
    }

    async fn load_token(&self, address: &str, name: Option<&str>, symbol: Option<&str>) -> TokenContext {
        let (facts, listing) = tokio::join!(
            self.collaborators.chain.token_facts(address),
            self.collaborators.market.market_listing(address)
        );

        let mut warnings = Vec::new();
        if let Some(reason) = facts.reason() {
            warnings.push(format!("chain data unavailable: {}", reason));
        }
        if let Some(reason) = listing.reason() {
            warnings.push(format!("market data unavailable: {}", reason));
        }

        let pick = |explicit: Option<&str>, from_chain: Option<&str>, from_market: Option<&str>| {
            [explicit, from_chain, from_market]
                .into_iter()
                .flatten()
                .map(str::trim)
                .find(|value| !value.is_empty())
                .unwrap_or_default()
                .to_string()
        };
        let chain_facts = facts.as_available();
        let market_listing = listing.as_available();
        let name = pick(
            name,
            chain_facts.map(|f| f.name.as_str()),
            market_listing.and_then(|l| l.name.as_deref()),
        );
        let symbol = pick(
            symbol,
            chain_facts.map(|f| f.symbol.as_str()),
            market_listing.and_then(|l| l.symbol.as_deref()),
        );
        let created_at = chain_facts
            .and_then(|f| f.created_at)
            .or_else(|| market_listing.and_then(|l| l.pair_created_at));
        let age_days = age_in_days(created_at, Utc::now());

        TokenContext {
            address: address.to_string(),
            name,
            symbol,
            facts,
            listing,
            age_days,
            warnings,
        }
    }

    async fn load_memes(&self, warnings: &mut Vec<String>) -> Vec<TrendingMeme> {
        match self.collaborators.memes.trending_memes().await {
            Sourced::Available(memes) => memes,
            Sourced::Unavailable { reason } => {
                warnings.push(format!("trending memes unavailable: {}", reason));
                Vec::new()
            }
        }
    }

    pub async fn hype_score(&self, address: &str, name: Option<&str>, symbol: Option<&str>) -> Result<HypeReport> {
        let address = require_address(address)?;
        let mut ctx = self.load_token(&address, name, symbol).await;

        let social = self
            .collaborators
            .social
            .social_signals(&ctx.symbol, &ctx.name)
            .await;
        if let Some(reason) = social.reason() {
            ctx.warnings.push(format!("social data unavailable: {}", reason));
        }
        let social_available = social.is_available();
        let snapshot = social.or_default();

        let breakdown = score_hype(&HypeInput {
            age_days: ctx.age_days,
            market: ctx.market(),
            social: snapshot,
        });
        info!(token = %address, score = breakdown.score, "hype score computed");

        let now = Utc::now();
        let stamp = now.to_rfc3339();
        if social_available {
            // Only the twitter aggregate is kept in the signal history.
            let record = SocialSignalRecord {
                id: record_id(&["social", &address, Platform::Twitter.label(), &stamp]),
                token_address: address.clone(),
                platform: Platform::Twitter,
                mentions: snapshot.twitter.count,
                sentiment: snapshot.twitter.sentiment,
                engagement: snapshot.twitter.engagement,
                recorded_at: now,
            };
            if let Err(err) = self.collaborators.sink.record_social_signal(record).await {
                warn!(token = %address, error = %err, "failed to persist social signal");
            }
        }
        let record = HypeScoreRecord {
            id: record_id(&["hype", &address, &stamp]),
            token_address: address.clone(),
            token_name: ctx.name.clone(),
            token_symbol: ctx.symbol.clone(),
            score: breakdown.score,
            recorded_at: now,
        };
        if let Err(err) = self.collaborators.sink.record_hype_score(record).await {
            warn!(token = %address, error = %err, "failed to persist hype score");
        }

        Ok(HypeReport {
            availability: ctx.availability(social_available),
            token_address: address,
            name: ctx.name,
            symbol: ctx.symbol,
            hype_score: breakdown.score,
            breakdown,
            social: snapshot,
            data_warnings: ctx.warnings,
        })
    }

    pub async fn rugpull_scan(&self, address: &str, scam_similarity_score: Option<f64>) -> Result<SafetyReport> {
        let address = require_address(address)?;
        let scam = scam_similarity_score.unwrap_or(0.0);
        if !(0.0..=100.0).contains(&scam) {
            return Err(ScoutError::InvalidInput(
                "scam_similarity_score must be between 0 and 100".into(),
            ));
        }
        let ctx = self.load_token(&address, None, None).await;

        let (assessment, metrics) = match ctx.safety_metrics() {
            Some(metrics) => (assess_safety(&metrics, scam), metrics),
            None => (pessimistic_assessment(scam), SafetyMetrics::pessimistic()),
        };
        info!(
            token = %address,
            safety = assessment.safety_score,
            risk = assessment.risk_level.label(),
            "rugpull scan complete"
        );

        let now = Utc::now();
        let record = SafetyCheckRecord {
            id: record_id(&["safety", &address, &now.to_rfc3339()]),
            token_address: address.clone(),
            contract_safety_score: assessment.contract_safety_score,
            safety_score: assessment.safety_score,
            risk_level: assessment.risk_level,
            data_available: ctx.facts.is_available(),
            recorded_at: now,
        };
        if let Err(err) = self.collaborators.sink.record_safety_check(record).await {
            warn!(token = %address, error = %err, "failed to persist safety check");
        }

        Ok(SafetyReport {
            availability: ctx.availability(false),
            token_address: address,
            name: ctx.name,
            symbol: ctx.symbol,
            assessment,
            metrics,
            data_warnings: ctx.warnings,
        })
    }

    pub async fn correlate_memes(
        &self,
        address: Option<&str>,
        name: Option<&str>,
        symbol: Option<&str>,
    ) -> Result<CorrelationReport> {
        let address = match address.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Some(require_address(value)?),
            None => None,
        };
        let mut warnings = Vec::new();
        let (name, symbol) = match address.as_deref() {
            Some(addr) if blank(name) || blank(symbol) => {
                let ctx = self.load_token(addr, name, symbol).await;
                warnings.extend(ctx.warnings);
                (ctx.name, ctx.symbol)
            }
            _ => (
                name.unwrap_or_default().trim().to_string(),
                symbol.unwrap_or_default().trim().to_string(),
            ),
        };
        if name.is_empty() && symbol.is_empty() {
            return Err(ScoutError::InvalidInput(
                "token name or symbol is required".into(),
            ));
        }

        let memes = self.load_memes(&mut warnings).await;
        let correlations = self.correlator.correlate(&name, &symbol, &memes);
        let predicted_opportunity = self.correlator.is_predicted_opportunity(&correlations);
        debug!(token = %name, matches = correlations.len(), "meme correlation complete");

        let now = Utc::now();
        let stamp = now.to_rfc3339();
        let token_address = address.clone().unwrap_or_default();
        let records: Vec<CorrelationRecord> = self
            .correlator
            .persistable(&correlations)
            .into_iter()
            .map(|entry| CorrelationRecord {
                id: record_id(&["correlation", &token_address, &name, &entry.meme_name, &stamp]),
                token_address: token_address.clone(),
                token_name: name.clone(),
                token_symbol: symbol.clone(),
                meme_name: entry.meme_name.clone(),
                correlation_score: entry.correlation_score,
                source: entry.source.clone(),
                recorded_at: now,
            })
            .collect();
        if let Err(err) = self.collaborators.sink.record_correlations(records).await {
            warn!(token = %name, error = %err, "failed to persist correlations");
        }

        Ok(CorrelationReport {
            token_address: address,
            name,
            symbol,
            top_match: correlations.first().cloned(),
            predicted_opportunity,
            memes_considered: memes.len(),
            correlations,
            data_warnings: warnings,
        })
    }

    pub async fn meme_opportunities(&self) -> Result<MemeOpportunitiesReport> {
        let mut warnings = Vec::new();
        let memes = self.load_memes(&mut warnings).await;
        let known = self.collaborators.sink.known_token_names().await?;
        let opportunities = find_missing_memes(&memes, &known);
        info!(
            memes = memes.len(),
            missing = opportunities.len(),
            "meme opportunity sweep complete"
        );

        Ok(MemeOpportunitiesReport {
            opportunities,
            memes_considered: memes.len(),
            known_tokens: known.len(),
            data_warnings: warnings,
        })
    }

    pub async fn trending_memes(&self) -> Result<TrendingReport> {
        let mut warnings = Vec::new();
        let memes = self.load_memes(&mut warnings).await;
        Ok(TrendingReport {
            available: warnings.is_empty(),
            memes,
            data_warnings: warnings,
        })
    }

    pub async fn opportunity_score(&self, address: &str) -> Result<OpportunityReport> {
        let address = require_address(address)?;
        let mut warnings = Vec::new();
        let memes = self.load_memes(&mut warnings).await;
        let mut report = self.evaluate(&address, &memes).await;
        warnings.append(&mut report.data_warnings);
        report.data_warnings = warnings;
        Ok(report)
    }

    /// Scores one token for ranking. Missing chain data yields a zero safety
    /// score rather than an error.
    async fn evaluate(&self, address: &str, memes: &[TrendingMeme]) -> OpportunityReport {
        let mut ctx = self.load_token(address, None, None).await;
        let safety_score = ctx
            .safety_metrics()
            .map(|metrics| contract_safety_score(&metrics))
            .unwrap_or(0.0);

        let (social, social_source) = self.resolve_social(&mut ctx).await;
        let correlations = self.correlator.correlate(&ctx.name, &ctx.symbol, memes);

        let breakdown = score_opportunity(&OpportunityInput {
            safety_score,
            age_days: ctx.age_days,
            market: ctx.market(),
            social,
            correlations: correlations.clone(),
        });
        debug!(
            token = %address,
            opportunity = breakdown.opportunity_score,
            "opportunity score computed"
        );

        OpportunityReport {
            availability: ctx.availability(social_source == SocialSource::Live),
            token_address: ctx.address,
            name: ctx.name,
            symbol: ctx.symbol,
            safety_score,
            age_days: ctx.age_days,
            breakdown,
            correlations,
            social_source,
            data_warnings: ctx.warnings,
        }
    }

    /// Portfolio candidates need real chain facts; a token that cannot be
    /// assessed is skipped instead of being ranked on worst-case defaults.
    async fn evaluate_candidate(
        &self,
        candidate: &str,
        memes: &[TrendingMeme],
    ) -> std::result::Result<OpportunityReport, SkippedToken> {
        let address = require_address(candidate).map_err(|err| SkippedToken {
            token_address: candidate.trim().to_string(),
            reason: err.to_string(),
        })?;
        let report = self.evaluate(&address, memes).await;
        if !report.availability.chain {
            return Err(SkippedToken {
                token_address: address,
                reason: "on-chain data unavailable".to_string(),
            });
        }
        Ok(report)
    }

    async fn resolve_social(&self, ctx: &mut TokenContext) -> (Option<SocialStats>, SocialSource) {
        let live = self
            .collaborators
            .social
            .social_signals(&ctx.symbol, &ctx.name)
            .await;
        if let Sourced::Available(snapshot) = &live {
            return (Some(SocialStats::from(snapshot)), SocialSource::Live);
        }

        let since = Utc::now() - Duration::days(SOCIAL_HISTORY_DAYS);
        match self.collaborators.sink.social_history(&ctx.address, since).await {
            Ok(history) => {
                if let Some(stats) = average_history(&history) {
                    return (Some(stats), SocialSource::History);
                }
            }
            Err(err) => {
                warn!(token = %ctx.address, error = %err, "failed to read social history");
            }
        }
        if let Some(reason) = live.reason() {
            ctx.warnings.push(format!("social data unavailable: {}", reason));
        }
        (None, SocialSource::Prior)
    }

    pub async fn build_portfolio(
        &self,
        candidates: &[String],
        investment_size: f64,
        risk_tolerance: RiskTolerance,
        existing_portfolio: &[String],
    ) -> Result<PortfolioReport> {
        if candidates.is_empty() {
            return Err(ScoutError::InvalidInput(
                "at least one candidate token is required".into(),
            ));
        }
        if !investment_size.is_finite() || investment_size <= 0.0 {
            return Err(ScoutError::InvalidInput(
                "investment_size must be a positive number".into(),
            ));
        }

        let mut warnings = Vec::new();
        let memes = self.load_memes(&mut warnings).await;

        let evaluations = join_all(
            candidates
                .iter()
                .map(|candidate| self.evaluate_candidate(candidate, &memes)),
        )
        .await;

        let mut evaluated = Vec::new();
        let mut skipped = Vec::new();
        for evaluation in evaluations {
            match evaluation {
                Ok(report) => evaluated.push(report),
                Err(skip) => {
                    warn!(token = %skip.token_address, reason = %skip.reason, "skipping portfolio candidate");
                    skipped.push(skip);
                }
            }
        }

        let portfolio_candidates: Vec<PortfolioCandidate> = evaluated
            .iter()
            .map(|report| PortfolioCandidate {
                address: report.token_address.clone(),
                name: report.name.clone(),
                symbol: report.symbol.clone(),
                safety_score: report.safety_score,
                opportunity_score: report.breakdown.opportunity_score,
            })
            .collect();
        let plan = allocate_portfolio(
            &portfolio_candidates,
            investment_size,
            risk_tolerance,
            existing_portfolio,
        );
        info!(
            tolerance = risk_tolerance.label(),
            evaluated = evaluated.len(),
            skipped = skipped.len(),
            allocated = plan.total_allocated,
            "portfolio built"
        );

        let now = Utc::now();
        let record = AllocationRecord {
            id: record_id(&["allocation", risk_tolerance.label(), &now.to_rfc3339()]),
            risk_tolerance,
            investment_size: plan.investment_size,
            total_allocated: plan.total_allocated,
            tokens: plan.allocations.iter().map(|entry| entry.token.clone()).collect(),
            recorded_at: now,
        };
        if let Err(err) = self.collaborators.sink.record_allocation(record).await {
            warn!(error = %err, "failed to persist allocation");
        }

        Ok(PortfolioReport {
            plan,
            evaluated,
            skipped,
            data_warnings: warnings,
        })
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Mean of stored signal records; `None` when there is no history.
fn average_history(records: &[SocialSignalRecord]) -> Option<SocialStats> {
    if records.is_empty() {
        return None;
    }
    let count = records.len() as f64;
    let mentions = records.iter().map(|r| r.mentions as f64).sum::<f64>() / count;
    let engagement = records.iter().map(|r| r.engagement.max(0.0)).sum::<f64>() / count;
    let with_mentions: Vec<f64> = records
        .iter()
        .filter(|r| r.mentions > 0)
        .map(|r| r.sentiment.clamp(-1.0, 1.0))
        .collect();
    let average_sentiment = if with_mentions.is_empty() {
        None
    } else {
        Some(with_mentions.iter().sum::<f64>() / with_mentions.len() as f64)
    };

    Some(SocialStats {
        mentions,
        engagement,
        average_sentiment,
    })
}
