//! Fullnode JSON-RPC client.
//!
//! | Operation | Method |
//! |-----------|--------|
//! | current epoch | `suix_getLatestSuiSystemState` |
//! | coins of one type | `suix_getCoins` (followed across pages) |
//! | build a transfer | `unsafe_paySui` for the native coin, `unsafe_pay` otherwise |
//! | submit | `sui_executeTransactionBlock` |
//!
//! Transactions are built by the fullnode from the selected input coins, so
//! the client never has to encode transaction data itself. The returned
//! bytes are what the ephemeral key signs.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use sdk_core::SuiAddress;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error};
use url::Url;

use crate::http::{check_status, read_text, send_error};
use crate::{HttpConfig, TransportError};

const RPC: &str = "rpc";

/// The chain's native coin type. Transfers of it pay gas from the inputs.
pub const NATIVE_COIN_TYPE: &str = "0x2::sui::SUI";

/// Whether a transfer of `coin_type` takes its gas out of the input coins,
/// so the inputs must cover `amount + gas_budget`.
pub fn pays_gas_from_inputs(coin_type: &str) -> bool {
    coin_type == NATIVE_COIN_TYPE
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An owned coin object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: String,
    #[serde(deserialize_with = "u64_from_string")]
    pub balance: u64,
}

/// Inputs for a fullnode-built transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub sender: SuiAddress,
    pub coin_type: String,
    /// Object ids of the selected input coins, in selection order.
    pub input_coins: Vec<String>,
    pub recipient: SuiAddress,
    pub amount: u64,
    pub gas_budget: u64,
}

/// Outcome of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    pub digest: String,
    pub success: bool,
    /// Execution error reported by the chain, if any.
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<Coin>,
    next_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct SystemState {
    #[serde(deserialize_with = "u64_from_string")]
    epoch: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBlockBytes {
    tx_bytes: String,
}

#[derive(Deserialize)]
struct ExecutionResponse {
    digest: String,
    effects: Option<Effects>,
}

#[derive(Deserialize)]
struct Effects {
    status: ExecutionStatus,
}

#[derive(Deserialize)]
struct ExecutionStatus {
    status: String,
    error: Option<String>,
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
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Fullnodes render 64-bit integers as decimal strings; accept both forms.
fn u64_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Num(n) => Ok(n),
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read and write access to the chain.
pub trait ChainClient: Send + Sync {
    /// The current epoch.
    fn current_epoch(&self) -> impl Future<Output = Result<u64, TransportError>> + Send;

    /// Every coin of `coin_type` owned by `owner`, in the order the node
    /// returns them.
    fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> impl Future<Output = Result<Vec<Coin>, TransportError>> + Send;

    /// Builds an unsigned transfer and returns its BCS bytes.
    fn build_transfer(
        &self,
        request: &TransferRequest,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// Submits signed transaction bytes. `signature` is base64.
    fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signature: &str,
    ) -> impl Future<Output = Result<TransactionResult, TransportError>> + Send;
}

// ---------------------------------------------------------------------------
// JsonRpcChainClient
// ---------------------------------------------------------------------------

/// JSON-RPC implementation of [`ChainClient`].
#[derive(Debug)]
pub struct JsonRpcChainClient {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

impl JsonRpcChainClient {
    /// Creates a client for the fullnode at `url`. No network I/O.
    pub fn new(url: Url, http: &HttpConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: http.client(http.request_timeout)?,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    /// Issues one JSON-RPC call and decodes its `result`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc_call");
        let response = self
            .client
            .post(self.url.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|e| send_error(RPC, e))?;
        let body = read_text(RPC, check_status(RPC, response).await?).await?;
        decode_response(method, &body)
    }
}

fn decode_response<T: DeserializeOwned>(
    method: &'static str,
    body: &str,
) -> Result<T, TransportError> {
    let envelope: RpcResponse<T> = serde_json::from_str(body).map_err(|e| {
        error!(method, error = %e, "rpc_decode_error");
        TransportError::malformed(RPC, e)
    })?;
    if let Some(err) = envelope.error {
        error!(method, code = err.code, message = %err.message, "rpc_error");
        return Err(TransportError::Rpc {
            method,
            code: err.code,
            message: err.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| TransportError::malformed(RPC, format!("{method}: missing result")))
}

fn transfer_params(request: &TransferRequest) -> (&'static str, Value) {
    let amounts = [request.amount.to_string()];
    let recipients = [request.recipient.to_string()];
    let budget = request.gas_budget.to_string();
    if pays_gas_from_inputs(&request.coin_type) {
        (
            "unsafe_paySui",
            json!([request.sender.to_string(), request.input_coins, recipients, amounts, budget]),
        )
    } else {
        (
            "unsafe_pay",
            json!([
                request.sender.to_string(),
                request.input_coins,
                recipients,
                amounts,
                Value::Null,
                budget
            ]),
        )
    }
}

impl ChainClient for JsonRpcChainClient {
    async fn current_epoch(&self) -> Result<u64, TransportError> {
        let state: SystemState = self.call("suix_getLatestSuiSystemState", json!([])).await?;
        Ok(state.epoch)
    }

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<Vec<Coin>, TransportError> {
        let mut coins = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page: CoinPage = self
                .call(
                    "suix_getCoins",
                    json!([owner.to_string(), coin_type, cursor, Value::Null]),
                )
                .await?;
            coins.extend(page.data);
            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }
        debug!(count = coins.len(), coin_type, "coins_loaded");
        Ok(coins)
    }

    async fn build_transfer(&self, request: &TransferRequest) -> Result<Vec<u8>, TransportError> {
        let (method, params) = transfer_params(request);
        let built: TransactionBlockBytes = self.call(method, params).await?;
        STANDARD
            .decode(built.tx_bytes)
            .map_err(|e| TransportError::malformed(RPC, e))
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signature: &str,
    ) -> Result<TransactionResult, TransportError> {
        let executed: ExecutionResponse = self
            .call(
                "sui_executeTransactionBlock",
                json!([
                    STANDARD.encode(tx_bytes),
                    [signature],
                    { "showEffects": true },
                    "WaitForLocalExecution"
                ]),
            )
            .await?;
        Ok(execution_result(executed))
    }
}

fn execution_result(executed: ExecutionResponse) -> TransactionResult {
    match executed.effects {
        Some(Effects { status }) => TransactionResult {
            digest: executed.digest,
            success: status.status == "success",
            error: status.error,
        },
        None => TransactionResult {
            digest: executed.digest,
            success: true,
            error: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportErrorKind;

    #[test]
    fn decodes_epoch_from_string() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{"epoch":"417","protocolVersion":"60"}}"#;
        let state: SystemState = decode_response("suix_getLatestSuiSystemState", body).unwrap();
        assert_eq!(state.epoch, 417);
    }

    #[test]
    fn decodes_coin_page() {
        let body = r#"{"jsonrpc":"2.0","id":2,"result":{
            "data":[
                {"coinType":"0x2::sui::SUI","coinObjectId":"0xa","version":"3","digest":"d","balance":"30"},
                {"coinType":"0x2::sui::SUI","coinObjectId":"0xb","version":"3","digest":"d","balance":"50"}
            ],
            "nextCursor":"0xb","hasNextPage":false}}"#;
        let page: CoinPage = decode_response("suix_getCoins", body).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[1].balance, 50);
        assert!(!page.has_next_page);
    }

    #[test]
    fn rpc_error_is_surfaced() {
        let body = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32602,"message":"Invalid params"}}"#;
        let err = decode_response::<SystemState>("suix_getCoins", body).unwrap_err();
        assert_eq!(err.kind(), TransportErrorKind::Status);
        assert!(err.to_string().contains("Invalid params"));
    }

    #[test]
    fn missing_result_is_malformed() {
        let err = decode_response::<SystemState>("x", r#"{"jsonrpc":"2.0","id":4}"#).unwrap_err();
        assert_eq!(err.kind(), TransportErrorKind::Malformed);
    }

    fn transfer(coin_type: &str) -> TransferRequest {
        TransferRequest {
            sender: SuiAddress::new([1; 32]),
            coin_type: coin_type.into(),
            input_coins: vec!["0xa".into(), "0xb".into()],
            recipient: SuiAddress::new([2; 32]),
            amount: 45,
            gas_budget: 10_000_000,
        }
    }

    #[test]
    fn native_transfers_use_pay_sui() {
        let (method, params) = transfer_params(&transfer(NATIVE_COIN_TYPE));
        assert_eq!(method, "unsafe_paySui");
        assert_eq!(params[1], json!(["0xa", "0xb"]));
        assert_eq!(params[3], json!(["45"]));
        assert_eq!(params[4], json!("10000000"));
    }

    #[test]
    fn other_coins_use_pay() {
        let (method, params) = transfer_params(&transfer("0xc0ffee::usdc::USDC"));
        assert_eq!(method, "unsafe_pay");
        assert_eq!(params[4], Value::Null);
        assert_eq!(params[5], json!("10000000"));
    }

    #[test]
    fn failed_execution_is_reported() {
        let executed: ExecutionResponse = serde_json::from_str(
            r#"{"digest":"D1","effects":{"status":{"status":"failure","error":"InsufficientGas"}}}"#,
        )
        .unwrap();
        let result = execution_result(executed);
        assert_eq!(result.digest, "D1");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("InsufficientGas"));
    }
}
