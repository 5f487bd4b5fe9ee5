//! JSON-RPC 2.0 node client over blocking HTTP

use ethers_core::types::U256;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{NodeRpc, TransactionReceipt};
use crate::error::{ToolError, ToolResult};
use crate::types::Address;
use crate::utils::network_config::validate_endpoint;
use crate::utils::create_client;
use crate::{log_debug, log_warn};

pub struct JsonRpcClient {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
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
#[serde(rename_all = "camelCase")]
struct RpcBlock {
    base_fee_per_gas: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
    gas_used: String,
    effective_gas_price: Option<String>,
}

impl JsonRpcClient {
    pub fn new(url: &str) -> ToolResult<Self> {
        let validation = validate_endpoint(url);
        let host = validation.host.as_deref().unwrap_or("unknown");
        for warning in &validation.warnings {
            log_warn!("rpc", "Endpoint warning", host = host, warning = warning);
        }
        let url = validation.url.ok_or_else(|| {
            ToolError::invalid_input(format!(
                "Invalid node URL: {}",
                validation.errors.join("; ")
            ))
        })?;

        Ok(Self {
            url,
            client: create_client()?,
            next_id: AtomicU64::new(1),
        })
    }

    /// Send one request and unwrap its `result`.
    ///
    /// `Ok(None)` means the node answered `null`.
    fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> ToolResult<Option<T>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        log_debug!("rpc", "Request", method = method, id = id);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&RpcRequest {
                jsonrpc: "2.0",
                method,
                params,
                id,
            })
            .send()
            .map_err(|e| ToolError::from(e).context(method))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::upstream(format!("HTTP {}", status)).context(method));
        }

        let body: RpcResponse<T> = response
            .json()
            .map_err(|e| ToolError::upstream(format!("Malformed response: {}", e)).context(method))?;

        if let Some(error) = body.error {
            return Err(ToolError::upstream(error.message)
                .with_details(format!("rpc error code {}", error.code))
                .context(method));
        }

        Ok(body.result)
    }

    fn request_required<T: DeserializeOwned>(&self, method: &str, params: Value) -> ToolResult<T> {
        self.request(method, params)?
            .ok_or_else(|| ToolError::upstream("Empty result").context(method))
    }
}

impl NodeRpc for JsonRpcClient {
    fn get_transaction_count(&self, address: Address) -> ToolResult<u64> {
        let method = "eth_getTransactionCount";
        let hex: String = self.request_required(method, json!([address.to_string(), "pending"]))?;
        parse_hex_u64(&hex).map_err(|e| e.context(method))
    }

    fn get_latest_base_fee_per_gas(&self) -> ToolResult<U256> {
        let method = "eth_getBlockByNumber";
        let block: RpcBlock = self.request_required(method, json!(["latest", false]))?;
        let hex = block
            .base_fee_per_gas
            .ok_or_else(|| ToolError::upstream("Latest block has no base fee").context(method))?;
        parse_hex_u256(&hex).map_err(|e| e.context(method))
    }

    fn get_max_priority_fee_per_gas(&self) -> ToolResult<U256> {
        let method = "eth_maxPriorityFeePerGas";
        let hex: String = self.request_required(method, json!([]))?;
        parse_hex_u256(&hex).map_err(|e| e.context(method))
    }

    fn estimate_gas(&self, from: Address, to: Address, value: U256, data: &[u8]) -> ToolResult<u64> {
        let method = "eth_estimateGas";
        let params = json!([{
            "from": from.to_string(),
            "to": to.to_string(),
            "value": format!("{:#x}", value),
            "data": format!("0x{}", hex::encode(data)),
        }]);
        let hex: String = self.request_required(method, params)?;
        parse_hex_u64(&hex).map_err(|e| e.context(method))
    }

    fn call(&self, from: Address, to: Address, data: &[u8]) -> ToolResult<Vec<u8>> {
        let method = "eth_call";
        let params = json!([
            {
                "from": from.to_string(),
                "to": to.to_string(),
                "data": format!("0x{}", hex::encode(data)),
            },
            "latest"
        ]);
        let hex: String = self.request_required(method, params)?;
        decode_hex_data(&hex).map_err(|e| e.context(method))
    }

    fn send_raw_transaction(&self, raw: &[u8]) -> ToolResult<String> {
        let method = "eth_sendRawTransaction";
        self.request_required(method, json!([format!("0x{}", hex::encode(raw))]))
    }

    fn get_transaction_receipt(&self, tx_hash: &str) -> ToolResult<Option<TransactionReceipt>> {
        let method = "eth_getTransactionReceipt";
        let receipt: Option<RpcReceipt> = self.request(method, json!([tx_hash]))?;
        receipt
            .map(|r| convert_receipt(r).map_err(|e| e.context(method)))
            .transpose()
    }

    fn get_balance(&self, address: Address) -> ToolResult<U256> {
        let method = "eth_getBalance";
        let hex: String = self.request_required(method, json!([address.to_string(), "latest"]))?;
        parse_hex_u256(&hex).map_err(|e| e.context(method))
    }
}

fn convert_receipt(raw: RpcReceipt) -> ToolResult<TransactionReceipt> {
    Ok(TransactionReceipt {
        transaction_hash: raw.transaction_hash,
        block_number: raw.block_number.as_deref().map(parse_hex_u64).transpose()?,
        status: raw.status.as_deref().map(parse_hex_u64).transpose()?,
        gas_used: parse_hex_u256(&raw.gas_used)?,
        // pre-London nodes omit it
        effective_gas_price: raw
            .effective_gas_price
            .as_deref()
            .map(parse_hex_u256)
            .transpose()?
            .unwrap_or_default(),
    })
}

fn strip_hex_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x").unwrap_or(hex)
}

pub(crate) fn parse_hex_u64(hex: &str) -> ToolResult<u64> {
    let clean = strip_hex_prefix(hex);
    u64::from_str_radix(clean, 16)
        .map_err(|e| ToolError::upstream(format!("Invalid hex quantity '{}': {}", hex, e)))
}

pub(crate) fn parse_hex_u256(hex: &str) -> ToolResult<U256> {
    let clean = strip_hex_prefix(hex);
    if clean.is_empty() || clean.len() > 64 {
        return Err(ToolError::upstream(format!("Invalid hex quantity '{}'", hex)));
    }
    U256::from_str_radix(clean, 16)
        .map_err(|e| ToolError::upstream(format!("Invalid hex quantity '{}': {:?}", hex, e)))
}

fn decode_hex_data(hex: &str) -> ToolResult<Vec<u8>> {
    hex::decode(strip_hex_prefix(hex))
        .map_err(|e| ToolError::upstream(format!("Invalid hex data: {}", e)))
}
