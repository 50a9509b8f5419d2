pub mod correlation;
pub mod hype;
pub mod normalize;
pub mod opportunity;
pub mod portfolio;
pub mod safety;

pub use correlation::{
    candidate_token_names, find_missing_memes, CorrelationConfig, CorrelationEntry, MemeCorrelator,
    MissingMemeOpportunity,
};
pub use hype::{score_hype, HypeBreakdown, HypeInput};
pub use opportunity::{score_opportunity, OpportunityBreakdown, OpportunityInput};
pub use portfolio::{
    allocate_portfolio, AllocationEntry, PortfolioCandidate, PortfolioPlan, RiskPreset, Strategy,
};
pub use safety::{
    assess_safety, contract_safety_score, pessimistic_assessment, SafetyAssessment, SafetyMetrics,
};
