use metrics::counter;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::ReadError;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC client for read-only `eth_call`s.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    url: String,
}

impl RpcClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `eth_call` against the latest block. `call` labels the read in metrics.
    pub async fn eth_call(&self, call: &'static str, to: &str, data: &str) -> Result<String, ReadError> {
        counter!("chain_reads_total", "call" => call).increment(1);

        let result = self
            .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await;
        if let Err(e) = &result {
            counter!("chain_read_failures_total", "call" => call).increment(1);
            tracing::debug!(error = %e, call, to, "eth_call failed");
        }
        result
    }

    /// Chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64, ReadError> {
        let raw = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&raw)
    }

    async fn request(&self, method: &str, params: serde_json::Value) -> Result<String, ReadError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let resp: RpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_response(resp)
    }
}

/// Hex-encoded JSON-RPC quantity, e.g. `0xaa36a7`.
fn parse_quantity(raw: &str) -> Result<u64, ReadError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ReadError::Decode(format!("quantity without 0x prefix: {raw}")))?;
    u64::from_str_radix(digits, 16).map_err(|e| ReadError::Decode(format!("bad quantity {raw}: {e}")))
}

fn parse_response(resp: RpcResponse) -> Result<String, ReadError> {
    if let Some(err) = resp.error {
        return Err(ReadError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    resp.result
        .ok_or_else(|| ReadError::Decode("RPC response has neither result nor error".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result() {
        let resp: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x01"}"#).unwrap();
        assert_eq!(parse_response(resp).unwrap(), "0x01");
    }

    #[test]
    fn test_parse_error_object() {
        let resp: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap();
        match parse_response(resp) {
            Err(ReadError::Rpc { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "execution reverted");
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
    }

    #[test]
    fn test_request_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: json!([{ "to": "0xabc", "data": "0x18160ddd" }, "latest"]),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "eth_call");
        assert_eq!(value["params"][0]["data"], "0x18160ddd");
        assert_eq!(value["params"][1], "latest");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0xaa36a7").unwrap(), 11_155_111);
        assert_eq!(parse_quantity("0x7a69").unwrap(), 31_337);
        assert!(parse_quantity("aa36a7").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }
}
