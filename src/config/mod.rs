use chrono::Duration;
use rust_decimal::Decimal;
use std::env;

use crate::engine::projector::{default_assumed_lifetime, DEFAULT_ASSUMED_LIFETIME_DAYS};

const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";
const SEPOLIA_CHAIN_ID: u64 = 11_155_111;
const DEFAULT_MAX_MARKETS: u64 = 10_000;
const MAX_ASSUMED_LIFETIME_DAYS: i64 = 36_500;

/// Network and contract the read layer talks to.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    pub chain: ChainConfig,

    // Reads
    pub read_concurrency: usize,
    /// Upper bound on market ids enumerated per batch, whatever `marketCount` says.
    pub max_markets: u64,

    // Derivation
    pub assumed_lifetime_days: i64,
    pub price_impact_amount: Decimal,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            chain: ChainConfig {
                rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.into()),
                chain_id: env::var("CHAIN_ID")
                    .unwrap_or_else(|_| SEPOLIA_CHAIN_ID.to_string())
                    .parse()?,
                contract_address: env::var("CONTRACT_ADDRESS")
                    .map_err(|_| anyhow::anyhow!("CONTRACT_ADDRESS must be set"))?,
            },

            read_concurrency: env::var("READ_CONCURRENCY")
                .unwrap_or_else(|_| "8".into())
                .parse::<usize>()
                .unwrap_or(8)
                .max(1),

            max_markets: env::var("MAX_MARKETS")
                .unwrap_or_else(|_| DEFAULT_MAX_MARKETS.to_string())
                .parse::<u64>()
                .unwrap_or(DEFAULT_MAX_MARKETS)
                .max(1),

            assumed_lifetime_days: parse_lifetime_days(env::var("ASSUMED_LIFETIME_DAYS").ok())?,
            price_impact_amount: env::var("PRICE_IMPACT_AMOUNT")
                .unwrap_or_else(|_| "0.1".into())
                .parse()
                .unwrap_or(Decimal::new(1, 1)),
        })
    }

    /// Lifetime assumed for markets whose creation time is unknown.
    pub fn assumed_lifetime(&self) -> Duration {
        Duration::try_days(self.assumed_lifetime_days)
            .filter(|lifetime| *lifetime > Duration::zero())
            .unwrap_or_else(default_assumed_lifetime)
    }
}

fn parse_lifetime_days(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_ASSUMED_LIFETIME_DAYS);
    };

    let days: i64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("ASSUMED_LIFETIME_DAYS must be an integer, got {raw:?}"))?;
    if !(1..=MAX_ASSUMED_LIFETIME_DAYS).contains(&days) {
        anyhow::bail!("ASSUMED_LIFETIME_DAYS must be within 1..={MAX_ASSUMED_LIFETIME_DAYS}, got {days}");
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_days_default() {
        assert_eq!(parse_lifetime_days(None).unwrap(), DEFAULT_ASSUMED_LIFETIME_DAYS);
        assert_eq!(parse_lifetime_days(Some(" 90 ".into())).unwrap(), 90);
    }

    #[test]
    fn test_lifetime_days_out_of_range() {
        assert!(parse_lifetime_days(Some("0".into())).is_err());
        assert!(parse_lifetime_days(Some("-5".into())).is_err());
        assert!(parse_lifetime_days(Some("36501".into())).is_err());
        assert!(parse_lifetime_days(Some("9223372036854775807".into())).is_err());
        assert!(parse_lifetime_days(Some("month".into())).is_err());
    }

    #[test]
    fn test_assumed_lifetime_falls_back_when_unrepresentable() {
        let mut config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            chain: ChainConfig {
                rpc_url: DEFAULT_RPC_URL.into(),
                chain_id: SEPOLIA_CHAIN_ID,
                contract_address: "0x00000000000000000000000000000000000000cc".into(),
            },
            read_concurrency: 1,
            max_markets: DEFAULT_MAX_MARKETS,
            assumed_lifetime_days: 45,
            price_impact_amount: Decimal::ONE,
        };
        assert_eq!(config.assumed_lifetime(), Duration::days(45));

        config.assumed_lifetime_days = i64::MAX;
        assert_eq!(config.assumed_lifetime(), default_assumed_lifetime());

        config.assumed_lifetime_days = -3;
        assert_eq!(config.assumed_lifetime(), default_assumed_lifetime());
    }
}
