use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{Result, ScoutError};
use crate::{Platform, RiskTier, RiskTolerance};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialSignalRecord {
    pub id: String,
    pub token_address: String,
    pub platform: Platform,
    pub mentions: u64,
    pub sentiment: f64,
    pub engagement: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypeScoreRecord {
    pub id: String,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub score: u8,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheckRecord {
    pub id: String,
    pub token_address: String,
    pub contract_safety_score: f64,
    pub safety_score: f64,
    pub risk_level: RiskTier,
    pub data_available: bool,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub id: String,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub meme_name: String,
    pub correlation_score: f64,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub id: String,
    pub risk_tolerance: RiskTolerance,
    pub investment_size: f64,
    pub total_allocated: f64,
    pub tokens: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Everything the audit trail holds, newest record first in each list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(default)]
    pub social_signals: Vec<SocialSignalRecord>,
    #[serde(default)]
    pub hype_scores: Vec<HypeScoreRecord>,
    #[serde(default)]
    pub safety_checks: Vec<SafetyCheckRecord>,
    #[serde(default)]
    pub correlations: Vec<CorrelationRecord>,
    #[serde(default)]
    pub allocations: Vec<AllocationRecord>,
}

/// Write side of the audit trail plus the history reads a caller resolves
/// before invoking the engine.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn record_social_signal(&self, record: SocialSignalRecord) -> Result<()>;
    async fn record_hype_score(&self, record: HypeScoreRecord) -> Result<()>;
    async fn record_safety_check(&self, record: SafetyCheckRecord) -> Result<()>;
    async fn record_correlations(&self, records: Vec<CorrelationRecord>) -> Result<()>;
    async fn record_allocation(&self, record: AllocationRecord) -> Result<()>;
    /// Names of every token with a stored meme correlation.
    async fn known_token_names(&self) -> Result<Vec<String>>;
    async fn social_history(&self, token_address: &str, since: DateTime<Utc>) -> Result<Vec<SocialSignalRecord>>;
}

/// Stable short id derived from the record's identifying parts.
pub fn record_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    format!("{:016x}", u64::from_be_bytes(bytes))
}

pub struct AuditStore {
    path: Option<PathBuf>,
    max_records_per_kind: usize,
    log: Mutex<AuditLog>,
}

impl AuditStore {
    pub async fn load(path: PathBuf, max_records_per_kind: usize) -> Result<Self> {
        let log = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| ScoutError::Store(format!("failed to read audit log: {}", err)))?;
            if data.trim().is_empty() {
                AuditLog::default()
            } else {
                serde_json::from_str(&data)
                    .map_err(|err| ScoutError::Store(format!("failed to parse audit log: {}", err)))?
            }
        } else {
            AuditLog::default()
        };

        Ok(Self {
            path: Some(path),
            max_records_per_kind,
            log: Mutex::new(log),
        })
    }

    pub fn in_memory(max_records_per_kind: usize) -> Self {
        Self {
            path: None,
            max_records_per_kind,
            log: Mutex::new(AuditLog::default()),
        }
    }

    pub async fn snapshot(&self) -> AuditLog {
        let guard = self.log.lock().await;
        guard.clone()
    }

    async fn update(&self, apply: impl FnOnce(&mut AuditLog, usize) + Send) -> Result<()> {
        let mut guard = self.log.lock().await;
        apply(&mut guard, self.max_records_per_kind);
        if let Some(path) = self.path.as_ref() {
            persist(path, &guard).await?;
        }
        Ok(())
    }
}

fn push_front<T>(records: &mut Vec<T>, record: T, cap: usize) {
    records.insert(0, record);
    if records.len() > cap {
        records.truncate(cap);
    }
}

#[async_trait]
impl PersistenceSink for AuditStore {
    async fn record_social_signal(&self, record: SocialSignalRecord) -> Result<()> {
        self.update(|log, cap| push_front(&mut log.social_signals, record, cap))
            .await
    }

    async fn record_hype_score(&self, record: HypeScoreRecord) -> Result<()> {
        self.update(|log, cap| push_front(&mut log.hype_scores, record, cap))
            .await
    }

    async fn record_safety_check(&self, record: SafetyCheckRecord) -> Result<()> {
        self.update(|log, cap| push_front(&mut log.safety_checks, record, cap))
            .await
    }

    async fn record_correlations(&self, records: Vec<CorrelationRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.update(|log, cap| {
            for record in records {
                push_front(&mut log.correlations, record, cap);
            }
        })
        .await
    }

    async fn record_allocation(&self, record: AllocationRecord) -> Result<()> {
        self.update(|log, cap| push_front(&mut log.allocations, record, cap))
            .await
    }

    async fn known_token_names(&self) -> Result<Vec<String>> {
        let guard = self.log.lock().await;
        let mut seen = HashSet::new();
        let names: Vec<String> = guard
            .correlations
            .iter()
            .map(|record| record.token_name.trim())
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.to_lowercase()))
            .map(str::to_string)
            .collect();
        Ok(names)
    }

    async fn social_history(&self, token_address: &str, since: DateTime<Utc>) -> Result<Vec<SocialSignalRecord>> {
        let guard = self.log.lock().await;
        Ok(guard
            .social_signals
            .iter()
            .filter(|record| record.token_address == token_address && record.recorded_at >= since)
            .cloned()
            .collect())
    }
}

async fn persist(path: &Path, log: &AuditLog) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    let payload = serde_json::to_string_pretty(log)?;
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, payload)
        .await
        .map_err(|err| ScoutError::Store(format!("failed to write audit log: {}", err)))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|err| ScoutError::Store(format!("failed to finalize audit log: {}", err)))?;
    Ok(())
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| ScoutError::Store(format!("failed to create audit dir: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hype(name: &str) -> HypeScoreRecord {
        HypeScoreRecord {
            id: record_id(&["hype", name]),
            token_address: format!("{}-mint", name),
            token_name: name.to_string(),
            token_symbol: name.to_uppercase(),
            score: 42,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn record_ids_are_stable_and_distinct() {
        assert_eq!(record_id(&["a", "b"]), record_id(&["a", "b"]));
        assert_ne!(record_id(&["ab", ""]), record_id(&["a", "b"]));
        assert_eq!(record_id(&["x"]).len(), 16);
    }

    #[tokio::test]
    async fn caps_records_per_kind() {
        let store = AuditStore::in_memory(2);
        for name in ["one", "two", "three"] {
            store.record_hype_score(hype(name)).await.unwrap();
        }
        let log = store.snapshot().await;
        assert_eq!(log.hype_scores.len(), 2);
        assert_eq!(log.hype_scores[0].token_name, "three");
    }

    fn correlation(name: &str) -> CorrelationRecord {
        CorrelationRecord {
            id: record_id(&["corr", name]),
            token_address: format!("{}-mint", name),
            token_name: name.to_string(),
            token_symbol: name.to_uppercase(),
            meme_name: name.to_lowercase(),
            correlation_score: 0.8,
            source: "reddit".to_string(),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn known_names_are_deduplicated_case_insensitively() {
        let store = AuditStore::in_memory(10);
        store
            .record_correlations(vec![correlation("Pepe"), correlation("pepe ")])
            .await
            .unwrap();
        let names = store.known_token_names().await.unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].to_lowercase(), "pepe");
    }

    #[tokio::test]
    async fn hype_scores_do_not_count_as_known_names() {
        let store = AuditStore::in_memory(10);
        store.record_hype_score(hype("Moo Deng")).await.unwrap();
        assert!(store.known_token_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persists_and_reloads_from_disk() {
        let path = std::env::temp_dir().join(format!("meme-scout-store-{}.json", record_id(&["reload", Utc::now().to_rfc3339().as_str()])));
        {
            let store = AuditStore::load(path.clone(), 10).await.unwrap();
            store.record_hype_score(hype("Bonk")).await.unwrap();
            store.record_correlations(vec![correlation("Bonk")]).await.unwrap();
        }
        let reloaded = AuditStore::load(path.clone(), 10).await.unwrap();
        assert_eq!(reloaded.snapshot().await.hype_scores.len(), 1);
        assert_eq!(reloaded.known_token_names().await.unwrap(), vec!["Bonk".to_string()]);
        let _ = std::fs::remove_file(path);
    }
}
