//! Named-function dispatch over the analyzer.
//!
//! Every supported call is a variant of [`Operation`]; parameters are
//! deserialized into a typed struct per operation before the analyzer runs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::analysis::Analyzer;
use crate::error::{Result, ScoutError};
use crate::RiskTolerance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    HypeScore,
    RugpullScan,
    CorrelateMemes,
    MemeOpportunities,
    OpportunityScore,
    BuildPortfolio,
    TrendingMemes,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::HypeScore,
        Operation::RugpullScan,
        Operation::CorrelateMemes,
        Operation::MemeOpportunities,
        Operation::OpportunityScore,
        Operation::BuildPortfolio,
        Operation::TrendingMemes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::HypeScore => "calculate_hype_score",
            Operation::RugpullScan => "scan_rugpull",
            Operation::CorrelateMemes => "correlate_memes",
            Operation::MemeOpportunities => "find_meme_opportunities",
            Operation::OpportunityScore => "score_opportunity",
            Operation::BuildPortfolio => "build_portfolio",
            Operation::TrendingMemes => "get_trending_memes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "calculate_hype_score" => Some(Operation::HypeScore),
            "scan_rugpull" => Some(Operation::RugpullScan),
            "correlate_memes" => Some(Operation::CorrelateMemes),
            "find_meme_opportunities" => Some(Operation::MemeOpportunities),
            "score_opportunity" => Some(Operation::OpportunityScore),
            "build_portfolio" => Some(Operation::BuildPortfolio),
            "get_trending_memes" => Some(Operation::TrendingMemes),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::HypeScore => {
                "Score social and market momentum for a token on a 0-100 scale."
            }
            Operation::RugpullScan => {
                "Check mint/freeze authority, holder concentration and liquidity for rug-pull risk."
            }
            Operation::CorrelateMemes => {
                "Correlate a token's name and symbol against the trending meme feed."
            }
            Operation::MemeOpportunities => {
                "List trending memes that no known token represents yet."
            }
            Operation::OpportunityScore => {
                "Composite opportunity score from safety, novelty, market, social and meme signals."
            }
            Operation::BuildPortfolio => {
                "Rank candidate tokens and allocate an investment across risk buckets."
            }
            Operation::TrendingMemes => "Return the current trending meme feed.",
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            Operation::HypeScore => json!({
                "type": "object",
                "properties": {
                    "token_address": { "type": "string", "description": "Token mint address" },
                    "token_name": { "type": "string", "description": "Overrides the resolved name" },
                    "token_symbol": { "type": "string", "description": "Overrides the resolved symbol" }
                },
                "required": ["token_address"]
            }),
            Operation::RugpullScan => json!({
                "type": "object",
                "properties": {
                    "token_address": { "type": "string", "description": "Token mint address" },
                    "scam_similarity_score": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": 100,
                        "description": "Similarity to known scam patterns (default 0)"
                    }
                },
                "required": ["token_address"]
            }),
            Operation::CorrelateMemes => json!({
                "type": "object",
                "properties": {
                    "token_address": { "type": "string", "description": "Resolves name/symbol when omitted" },
                    "token_name": { "type": "string" },
                    "token_symbol": { "type": "string" }
                }
            }),
            Operation::OpportunityScore => json!({
                "type": "object",
                "properties": {
                    "token_address": { "type": "string", "description": "Token mint address" }
                },
                "required": ["token_address"]
            }),
            Operation::BuildPortfolio => json!({
                "type": "object",
                "properties": {
                    "candidate_tokens": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Token addresses to consider"
                    },
                    "investment_size": { "type": "number", "exclusiveMinimum": 0, "description": "USD amount" },
                    "risk_tolerance": {
                        "type": "string",
                        "enum": ["conservative", "moderate", "aggressive", "very_aggressive"],
                        "default": "moderate"
                    },
                    "existing_portfolio": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Addresses already held; never allocated again"
                    }
                },
                "required": ["candidate_tokens", "investment_size"]
            }),
            Operation::MemeOpportunities | Operation::TrendingMemes => json!({
                "type": "object",
                "properties": {}
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn function_specs() -> Vec<FunctionSpec> {
    Operation::ALL
        .iter()
        .map(|op| FunctionSpec {
            name: op.name(),
            description: op.description(),
            input_schema: op.input_schema(),
        })
        .collect()
}

/// `{name, parameters}` as posted to the call endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CallEnvelope {
    pub name: String,
    #[serde(default, alias = "arguments")]
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
struct HypeParams {
    #[serde(alias = "tokenAddress")]
    token_address: String,
    #[serde(default, alias = "tokenName")]
    token_name: Option<String>,
    #[serde(default, alias = "tokenSymbol")]
    token_symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RugpullParams {
    #[serde(alias = "tokenAddress")]
    token_address: String,
    #[serde(default, alias = "scamSimilarityScore")]
    scam_similarity_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CorrelateParams {
    #[serde(default, alias = "tokenAddress")]
    token_address: Option<String>,
    #[serde(default, alias = "tokenName")]
    token_name: Option<String>,
    #[serde(default, alias = "tokenSymbol")]
    token_symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressParams {
    #[serde(alias = "tokenAddress")]
    token_address: String,
}

#[derive(Debug, Deserialize)]
struct PortfolioParams {
    #[serde(alias = "candidateTokens", alias = "candidates")]
    candidate_tokens: Vec<String>,
    #[serde(alias = "investmentSize")]
    investment_size: f64,
    #[serde(default, alias = "riskTolerance")]
    risk_tolerance: Option<String>,
    #[serde(default, alias = "existingPortfolio")]
    existing_portfolio: Vec<String>,
}

fn parse_params<T: DeserializeOwned>(op: Operation, parameters: Value) -> Result<T> {
    let parameters = match parameters {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(parameters)
        .map_err(|err| ScoutError::InvalidInput(format!("{}: {}", op.name(), err)))
}

fn parse_tolerance(value: Option<&str>) -> Result<RiskTolerance> {
    match value {
        None => Ok(RiskTolerance::Moderate),
        Some(raw) => RiskTolerance::from_str(raw).ok_or_else(|| {
            ScoutError::InvalidInput(format!("unknown risk_tolerance: {}", raw))
        }),
    }
}

/// Runs one call and returns its typed result serialized to JSON.
pub async fn dispatch(analyzer: &Analyzer, envelope: CallEnvelope) -> Result<Value> {
    let op = Operation::from_name(&envelope.name)
        .ok_or_else(|| ScoutError::UnknownFunction(envelope.name.clone()))?;
    let parameters = envelope.parameters;

    let result = match op {
        Operation::HypeScore => {
            let params: HypeParams = parse_params(op, parameters)?;
            let report = analyzer
                .hype_score(
                    &params.token_address,
                    params.token_name.as_deref(),
                    params.token_symbol.as_deref(),
                )
                .await?;
            serde_json::to_value(report)?
        }
        Operation::RugpullScan => {
            let params: RugpullParams = parse_params(op, parameters)?;
            let report = analyzer
                .rugpull_scan(&params.token_address, params.scam_similarity_score)
                .await?;
            serde_json::to_value(report)?
        }
        Operation::CorrelateMemes => {
            let params: CorrelateParams = parse_params(op, parameters)?;
            let report = analyzer
                .correlate_memes(
                    params.token_address.as_deref(),
                    params.token_name.as_deref(),
                    params.token_symbol.as_deref(),
                )
                .await?;
            serde_json::to_value(report)?
        }
        Operation::MemeOpportunities => serde_json::to_value(analyzer.meme_opportunities().await?)?,
        Operation::OpportunityScore => {
            let params: AddressParams = parse_params(op, parameters)?;
            serde_json::to_value(analyzer.opportunity_score(&params.token_address).await?)?
        }
        Operation::BuildPortfolio => {
            let params: PortfolioParams = parse_params(op, parameters)?;
            let tolerance = parse_tolerance(params.risk_tolerance.as_deref())?;
            let report = analyzer
                .build_portfolio(
                    &params.candidate_tokens,
                    params.investment_size,
                    tolerance,
                    &params.existing_portfolio,
                )
                .await?;
            serde_json::to_value(report)?
        }
        Operation::TrendingMemes => serde_json::to_value(analyzer.trending_memes().await?)?,
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_the_table() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("drop_tables"), None);
    }

    #[test]
    fn every_schema_is_an_object() {
        for spec in function_specs() {
            assert_eq!(spec.input_schema["type"], "object", "{}", spec.name);
            assert!(!spec.description.is_empty());
        }
    }

    #[test]
    fn tolerance_defaults_to_moderate() {
        assert_eq!(parse_tolerance(None).unwrap(), RiskTolerance::Moderate);
        assert_eq!(parse_tolerance(Some("degen")).unwrap(), RiskTolerance::VeryAggressive);
        assert!(parse_tolerance(Some("yolo")).is_err());
    }

    #[test]
    fn missing_address_is_invalid_input() {
        let err = parse_params::<AddressParams>(Operation::OpportunityScore, Value::Null).unwrap_err();
        assert!(matches!(err, ScoutError::InvalidInput(_)));
    }
}
