use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ScoutConfig;
use crate::providers::{ChainMetadataProvider, Sourced};
use crate::TokenFacts;

/// Reads mint and holder facts over Solana JSON-RPC.
///
/// Holder count is the number of non-empty accounts returned by
/// `getTokenLargestAccounts`. The RPC caps that list at 20, so the count is
/// a lower bound.
#[derive(Clone)]
pub struct SolanaRpcProvider {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct AccountInfoResult {
    value: Option<AccountValue>,
}

#[derive(Deserialize)]
struct AccountValue {
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintInfo {
    decimals: u8,
    supply: String,
    mint_authority: Option<String>,
    freeze_authority: Option<String>,
}

#[derive(Deserialize)]
struct LargestAccountsResult {
    value: Vec<TokenAmount>,
}

#[derive(Deserialize)]
struct TokenAmount {
    amount: String,
}

impl SolanaRpcProvider {
    pub fn from_config(config: &ScoutConfig) -> Result<Self, String> {
        let timeout = Duration::from_millis(config.providers.timeout_ms);
        SolanaRpcProvider::new(config.providers.solana_rpc_url.clone(), timeout)
    }

    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| format!("failed to build solana rpc client: {}", err))?;
        Ok(Self { endpoint, client })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, String> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("{} request failed: {}", method, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{} error {}: {}", method, status, body.trim()));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|err| format!("{} response parse failed: {}", method, err))?;

        if let Some(error) = body.error {
            return Err(format!("{} rpc error {}: {}", method, error.code, error.message));
        }
        body.result
            .ok_or_else(|| format!("{} response missing result", method))
    }

    async fn fetch_mint(&self, address: &str) -> Result<MintInfo, String> {
        let result: AccountInfoResult = self
            .call(
                "getAccountInfo",
                json!([address, { "encoding": "jsonParsed", "commitment": "confirmed" }]),
            )
            .await?;
        let account = result
            .value
            .ok_or_else(|| format!("mint account {} not found", address))?;
        parse_mint_info(&account.data)
    }

    async fn fetch_largest_accounts(&self, address: &str) -> Result<Vec<u128>, String> {
        let result: LargestAccountsResult = self
            .call(
                "getTokenLargestAccounts",
                json!([address, { "commitment": "confirmed" }]),
            )
            .await?;
        Ok(result
            .value
            .iter()
            .filter_map(|account| account.amount.parse::<u128>().ok())
            .collect())
    }
}

fn parse_mint_info(data: &Value) -> Result<MintInfo, String> {
    let parsed = data
        .get("parsed")
        .ok_or_else(|| "account is not a parsed token mint".to_string())?;
    if parsed.get("type").and_then(Value::as_str) != Some("mint") {
        return Err("account is not a token mint".to_string());
    }
    let info = parsed
        .get("info")
        .cloned()
        .ok_or_else(|| "mint account missing info".to_string())?;
    serde_json::from_value(info).map_err(|err| format!("mint info parse failed: {}", err))
}

/// Builds facts from raw mint data and the largest-account balances (raw units).
fn facts_from_accounts(address: &str, mint: &MintInfo, balances: &[u128]) -> TokenFacts {
    let raw_supply = mint.supply.parse::<u128>().unwrap_or(0);
    let largest = balances.iter().copied().max().unwrap_or(0);
    let top_holder_percentage = if raw_supply == 0 {
        0.0
    } else {
        (largest as f64 / raw_supply as f64 * 100.0).min(100.0)
    };

    TokenFacts {
        address: address.to_string(),
        name: String::new(),
        symbol: String::new(),
        supply: raw_supply as f64 / 10f64.powi(mint.decimals as i32),
        decimals: mint.decimals,
        created_at: None,
        mint_authority_present: mint.mint_authority.is_some(),
        freeze_authority_present: mint.freeze_authority.is_some(),
        holder_count: balances.iter().filter(|amount| **amount > 0).count() as u64,
        top_holder_percentage,
    }
}

#[async_trait]
impl ChainMetadataProvider for SolanaRpcProvider {
    async fn token_facts(&self, address: &str) -> Sourced<TokenFacts> {
        let mint = match self.fetch_mint(address).await {
            Ok(mint) => mint,
            Err(err) => {
                warn!(token = %address, error = %err, "mint lookup failed");
                return Sourced::unavailable(err);
            }
        };
        let balances = match self.fetch_largest_accounts(address).await {
            Ok(balances) => balances,
            Err(err) => {
                warn!(token = %address, error = %err, "holder lookup failed");
                return Sourced::unavailable(err);
            }
        };
        debug!(token = %address, holders = balances.len(), "fetched chain facts");
        Sourced::Available(facts_from_accounts(address, &mint, &balances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jsonparsed_mint_account() {
        let data = json!({
            "program": "spl-token",
            "parsed": {
                "type": "mint",
                "info": {
                    "decimals": 6,
                    "supply": "1000000000000",
                    "mintAuthority": null,
                    "freezeAuthority": "Fr3ez3AuthOr1ty1111111111111111111111111111",
                    "isInitialized": true
                }
            }
        });
        let mint = parse_mint_info(&data).unwrap();
        assert_eq!(mint.decimals, 6);
        assert!(mint.mint_authority.is_none());
        assert!(mint.freeze_authority.is_some());

        let facts = facts_from_accounts("mint", &mint, &[400_000_000_000, 100_000_000_000, 0]);
        assert!((facts.supply - 1_000_000.0).abs() < 1e-6);
        assert!((facts.top_holder_percentage - 40.0).abs() < 1e-9);
        assert_eq!(facts.holder_count, 2);
        assert!(!facts.mint_authority_present);
        assert!(facts.freeze_authority_present);
    }

    #[test]
    fn rejects_non_mint_accounts() {
        let data = json!({ "parsed": { "type": "account", "info": {} } });
        assert!(parse_mint_info(&data).is_err());
    }
}
