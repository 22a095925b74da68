use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;

use super::abi::{self, AbiWords};
use super::rpc::RpcClient;
use crate::config::ChainConfig;
use crate::errors::ReadError;
use crate::models::{MarketId, MarketRecord, Outcome};

/// Read access to the market contract and its outcome tokens.
///
/// Every call is independent; implementations do not retry.
#[async_trait]
pub trait MarketReader: Send + Sync {
    async fn market_count(&self) -> Result<u64, ReadError>;

    async fn market(&self, id: MarketId) -> Result<MarketRecord, ReadError>;

    async fn escrow(&self, id: MarketId) -> Result<Decimal, ReadError>;

    async fn total_supply(&self, token: &str) -> Result<Decimal, ReadError>;

    async fn balance_of(&self, token: &str, account: &str) -> Result<Decimal, ReadError>;
}

/// [`MarketReader`] over JSON-RPC `eth_call`.
#[derive(Debug, Clone)]
pub struct RpcMarketReader {
    rpc: RpcClient,
    contract: String,
}

impl RpcMarketReader {
    pub fn new(http: Client, chain: &ChainConfig) -> Result<Self, ReadError> {
        Ok(Self {
            rpc: RpcClient::new(http, chain.rpc_url.clone()),
            contract: abi::normalize_address(&chain.contract_address)?,
        })
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Fail unless the node serves `expected`.
    pub async fn verify_chain_id(&self, expected: u64) -> Result<(), ReadError> {
        let actual = self.rpc.chain_id().await?;
        if actual != expected {
            return Err(ReadError::ChainMismatch { expected, actual });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketReader for RpcMarketReader {
    async fn market_count(&self) -> Result<u64, ReadError> {
        let data = abi::encode_call(abi::MARKET_COUNT, &[]);
        let raw = self.rpc.eth_call("marketCount", &self.contract, &data).await?;
        AbiWords::new(&raw)?.uint_u64(0)
    }

    async fn market(&self, id: MarketId) -> Result<MarketRecord, ReadError> {
        let data = abi::encode_call(abi::MARKETS, &[abi::encode_uint(id)]);
        let raw = self.rpc.eth_call("markets", &self.contract, &data).await?;
        decode_market(id, &raw)
    }

    async fn escrow(&self, id: MarketId) -> Result<Decimal, ReadError> {
        let data = abi::encode_call(abi::MARKET_ESCROW, &[abi::encode_uint(id)]);
        let raw = self.rpc.eth_call("marketEscrow", &self.contract, &data).await?;
        AbiWords::new(&raw)?.amount(0)
    }

    async fn total_supply(&self, token: &str) -> Result<Decimal, ReadError> {
        let token = abi::normalize_address(token)?;
        let data = abi::encode_call(abi::TOTAL_SUPPLY, &[]);
        let raw = self.rpc.eth_call("totalSupply", &token, &data).await?;
        AbiWords::new(&raw)?.amount(0)
    }

    async fn balance_of(&self, token: &str, account: &str) -> Result<Decimal, ReadError> {
        let token = abi::normalize_address(token)?;
        let data = abi::encode_call(abi::BALANCE_OF, &[abi::encode_address(account)?]);
        let raw = self.rpc.eth_call("balanceOf", &token, &data).await?;
        AbiWords::new(&raw)?.amount(0)
    }
}

/// Decode the `markets(uint256)` return tuple:
/// `(owner, question, deadline, status, resolved, outcome, yesToken, noToken, exists)`.
///
/// `status` is carried by the contract but not used; lifecycle is derived
/// from `resolved` and `deadline` instead.
pub fn decode_market(id: MarketId, raw: &str) -> Result<MarketRecord, ReadError> {
    let words = AbiWords::new(raw)?;
    if words.len() < 9 {
        return Err(ReadError::Decode(format!(
            "markets({id}) returned {} words, expected at least 9",
            words.len()
        )));
    }

    let resolved = words.bool(4)?;

    Ok(MarketRecord {
        id,
        owner: words.address(0)?,
        question: words.string(1)?,
        deadline: words.timestamp(2)?,
        resolved,
        outcome: Outcome::from_raw(resolved, words.uint_u8(5)?),
        yes_token: words.address(6)?,
        no_token: words.address(7)?,
        exists: words.bool(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u128) -> String {
        format!("{value:064x}")
    }

    fn address_word(hex40: &str) -> String {
        format!("{hex40:0>64}")
    }

    fn encoded_market(question: &str, deadline: u128, resolved: bool, outcome: u128, exists: bool) -> String {
        let q_hex: String = question.bytes().map(|b| format!("{b:02x}")).collect();
        let padded_len = question.len().div_ceil(32) * 64;

        let mut data = String::from("0x");
        data.push_str(&address_word("00000000000000000000000000000000000000aa"));
        data.push_str(&word(9 * 32)); // string offset, after the 9 head words
        data.push_str(&word(deadline));
        data.push_str(&word(0)); // status
        data.push_str(&word(resolved as u128));
        data.push_str(&word(outcome));
        data.push_str(&address_word("00000000000000000000000000000000000000b1"));
        data.push_str(&address_word("00000000000000000000000000000000000000b2"));
        data.push_str(&word(exists as u128));
        data.push_str(&word(question.len() as u128));
        data.push_str(&format!("{q_hex:0<width$}", width = padded_len));
        data
    }

    #[test]
    fn test_decode_market() {
        let raw = encoded_market("Will ACME default before 2027?", 1_800_000_000, true, 1, true);
        let record = decode_market(4, &raw).unwrap();

        assert_eq!(record.id, 4);
        assert_eq!(record.owner, "0x00000000000000000000000000000000000000aa");
        assert_eq!(record.question, "Will ACME default before 2027?");
        assert_eq!(record.deadline.timestamp(), 1_800_000_000);
        assert!(record.resolved);
        assert_eq!(record.outcome, Outcome::CreditEvent);
        assert_eq!(record.yes_token, "0x00000000000000000000000000000000000000b1");
        assert_eq!(record.no_token, "0x00000000000000000000000000000000000000b2");
        assert!(record.exists);
    }

    #[test]
    fn test_decode_unresolved_has_unset_outcome() {
        let raw = encoded_market("q", 1_800_000_000, false, 1, true);
        let record = decode_market(1, &raw).unwrap();
        assert_eq!(record.outcome, Outcome::Unset);
    }

    #[test]
    fn test_decode_empty_slot() {
        let raw = encoded_market("", 0, false, 0, false);
        let record = decode_market(99, &raw).unwrap();
        assert!(!record.exists);
        assert_eq!(record.question, "");
    }

    #[test]
    fn test_decode_short_data() {
        let raw = format!("0x{}", word(1));
        assert!(matches!(decode_market(1, &raw), Err(ReadError::Decode(_))));
    }

    #[test]
    fn test_reader_rejects_bad_contract_address() {
        let chain = ChainConfig {
            rpc_url: "http://localhost:8545".into(),
            chain_id: 11_155_111,
            contract_address: "not-an-address".into(),
        };
        assert!(RpcMarketReader::new(Client::new(), &chain).is_err());
    }
}
