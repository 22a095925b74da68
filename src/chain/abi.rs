use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::ReadError;

/// `marketCount()`
pub const MARKET_COUNT: &str = "ec979082";
/// `markets(uint256)`
pub const MARKETS: &str = "b1283e77";
/// `marketEscrow(uint256)`
pub const MARKET_ESCROW: &str = "d632363c";
/// ERC-20 `totalSupply()`
pub const TOTAL_SUPPLY: &str = "18160ddd";
/// ERC-20 `balanceOf(address)`
pub const BALANCE_OF: &str = "70a08231";

/// Token amounts and native currency both use 18 decimals.
pub const TOKEN_DECIMALS: u32 = 18;

const WORD_HEX: usize = 64;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Calldata for `selector` with already-encoded 32-byte argument words.
pub fn encode_call(selector: &str, args: &[String]) -> String {
    let mut data = String::with_capacity(2 + 8 + args.len() * WORD_HEX);
    data.push_str("0x");
    data.push_str(selector);
    for arg in args {
        data.push_str(arg);
    }
    data
}

pub fn encode_uint(value: u64) -> String {
    format!("{value:064x}")
}

/// Left-pad a 20-byte address into an argument word.
pub fn encode_address(address: &str) -> Result<String, ReadError> {
    let hex = normalize_address(address)?;
    Ok(format!("{:0>64}", &hex[2..]))
}

/// Validate a `0x`-prefixed 20-byte hex address and lowercase it.
pub fn normalize_address(address: &str) -> Result<String, ReadError> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ReadError::InvalidAddress(address.to_string()))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ReadError::InvalidAddress(address.to_string()));
    }

    Ok(format!("0x{}", hex.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// View over ABI-encoded return data as 32-byte words.
#[derive(Debug, Clone, Copy)]
pub struct AbiWords<'a> {
    hex: &'a str,
}

impl<'a> AbiWords<'a> {
    pub fn new(data: &'a str) -> Result<Self, ReadError> {
        let hex = data.strip_prefix("0x").unwrap_or(data);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ReadError::Decode("return data is not hex".into()));
        }
        if hex.len() % WORD_HEX != 0 {
            return Err(ReadError::Decode(format!(
                "return data is not word aligned ({} hex chars)",
                hex.len()
            )));
        }
        Ok(Self { hex })
    }

    pub fn len(&self) -> usize {
        self.hex.len() / WORD_HEX
    }

    pub fn is_empty(&self) -> bool {
        self.hex.is_empty()
    }

    pub fn word(&self, index: usize) -> Result<&'a str, ReadError> {
        let missing = || ReadError::Decode(format!("missing word {index} of {}", self.len()));
        let start = index.checked_mul(WORD_HEX).ok_or_else(missing)?;
        let end = start.checked_add(WORD_HEX).ok_or_else(missing)?;
        self.hex.get(start..end).ok_or_else(missing)
    }

    pub fn uint(&self, index: usize) -> Result<u128, ReadError> {
        parse_u128(self.word(index)?)
    }

    pub fn uint_u64(&self, index: usize) -> Result<u64, ReadError> {
        let value = self.uint(index)?;
        u64::try_from(value)
            .map_err(|_| ReadError::Decode(format!("word {index} overflows u64")))
    }

    pub fn uint_u8(&self, index: usize) -> Result<u8, ReadError> {
        let value = self.uint(index)?;
        u8::try_from(value).map_err(|_| ReadError::Decode(format!("word {index} overflows u8")))
    }

    pub fn bool(&self, index: usize) -> Result<bool, ReadError> {
        match self.uint(index)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ReadError::Decode(format!("word {index} is not a bool: {other}"))),
        }
    }

    /// Address in the low 20 bytes of the word, lowercased. Words are
    /// ASCII hex once [`AbiWords::new`] accepts them.
    pub fn address(&self, index: usize) -> Result<String, ReadError> {
        let word = self.word(index)?;
        Ok(format!("0x{}", word[WORD_HEX - 40..].to_lowercase()))
    }

    /// Dynamic `string` whose head word holds a byte offset into the data.
    pub fn string(&self, index: usize) -> Result<String, ReadError> {
        let offset = self.uint(index)?;
        if offset % 32 != 0 {
            return Err(ReadError::Decode(format!("unaligned string offset {offset}")));
        }
        let len_word = usize::try_from(offset / 32)
            .map_err(|_| ReadError::Decode("string offset out of range".into()))?;
        let len = usize::try_from(self.uint(len_word)?)
            .map_err(|_| ReadError::Decode("string length out of range".into()))?;

        let truncated = || ReadError::Decode(format!("string of {len} bytes truncated"));
        let start = len_word
            .checked_add(1)
            .and_then(|w| w.checked_mul(WORD_HEX))
            .ok_or_else(truncated)?;
        let end = len
            .checked_mul(2)
            .and_then(|n| n.checked_add(start))
            .ok_or_else(truncated)?;
        let body = self.hex.get(start..end).ok_or_else(truncated)?;

        let bytes = hex::decode(body).map_err(|e| ReadError::Decode(format!("bad string bytes: {e}")))?;
        String::from_utf8(bytes).map_err(|e| ReadError::Decode(format!("string is not utf-8: {e}")))
    }

    /// Unsigned amount with 18 decimals.
    pub fn amount(&self, index: usize) -> Result<Decimal, ReadError> {
        to_decimal(self.uint(index)?, TOKEN_DECIMALS)
    }

    /// Unix-seconds timestamp.
    pub fn timestamp(&self, index: usize) -> Result<DateTime<Utc>, ReadError> {
        let secs = i64::try_from(self.uint(index)?)
            .map_err(|_| ReadError::Decode(format!("word {index} is not a timestamp")))?;
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ReadError::Decode(format!("timestamp {secs} out of range")))
    }
}

/// Parse a hex word into u128. Words wider than 128 bits are rejected.
fn parse_u128(word: &str) -> Result<u128, ReadError> {
    let digits = word.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 32 {
        return Err(ReadError::Decode(format!("uint256 overflows u128: 0x{digits}")));
    }
    u128::from_str_radix(digits, 16).map_err(|e| ReadError::Decode(format!("bad hex word: {e}")))
}

/// Fixed-point integer to Decimal.
pub fn to_decimal(raw: u128, decimals: u32) -> Result<Decimal, ReadError> {
    let signed = i128::try_from(raw)
        .map_err(|_| ReadError::Decode(format!("amount {raw} out of range")))?;
    Decimal::try_from_i128_with_scale(signed, decimals)
        .map(|d| d.normalize())
        .map_err(|e| ReadError::Decode(format!("amount {raw} out of range: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u128) -> String {
        format!("{value:064x}")
    }

    #[test]
    fn test_encode_call() {
        assert_eq!(
            encode_call(MARKETS, &[encode_uint(3)]),
            "0xb1283e770000000000000000000000000000000000000000000000000000000000000003"
        );
        assert_eq!(encode_call(MARKET_COUNT, &[]), "0xec979082");
    }

    #[test]
    fn test_encode_address() {
        let encoded = encode_address("0x4BFB41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E").unwrap();
        assert_eq!(
            encoded,
            "0000000000000000000000004bfb41d5b3570defd03c39a9a4d8de6bd8b8982e"
        );
        assert!(encode_address("0x1234").is_err());
        assert!(encode_address("4bfb41d5b3570defd03c39a9a4d8de6bd8b8982e").is_err());
    }

    #[test]
    fn test_parse_amount_with_18_decimals() {
        // 1.5 * 10^18
        let data = format!("0x{}", word(1_500_000_000_000_000_000));
        let words = AbiWords::new(&data).unwrap();
        assert_eq!(words.amount(0).unwrap(), Decimal::new(15, 1));
    }

    #[test]
    fn test_zero_word() {
        let data = word(0);
        let words = AbiWords::new(&data).unwrap();
        assert_eq!(words.uint(0).unwrap(), 0);
        assert!(!words.bool(0).unwrap());
        assert_eq!(words.amount(0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_rejected() {
        let data = "f".repeat(64);
        let words = AbiWords::new(&data).unwrap();
        assert!(words.uint(0).is_err());
    }

    #[test]
    fn test_unaligned_data_rejected() {
        assert!(AbiWords::new("0x1234").is_err());
    }

    #[test]
    fn test_missing_word() {
        let data = word(1);
        let words = AbiWords::new(&data).unwrap();
        assert!(words.word(1).is_err());
    }

    #[test]
    fn test_decode_string() {
        // head: offset 0x20, then length 5, then "hello" padded
        let data = format!(
            "{}{}{:0<64}",
            word(32),
            word(5),
            "68656c6c6f"
        );
        let words = AbiWords::new(&data).unwrap();
        assert_eq!(words.string(0).unwrap(), "hello");
    }

    #[test]
    fn test_decode_address() {
        let data = "0000000000000000000000004BFB41D5B3570DEFD03C39A9A4D8DE6BD8B8982E";
        let words = AbiWords::new(data).unwrap();
        assert_eq!(
            words.address(0).unwrap(),
            "0x4bfb41d5b3570defd03c39a9a4d8de6bd8b8982e"
        );
    }

    #[test]
    fn test_timestamp() {
        let data = word(1_700_000_000);
        let words = AbiWords::new(&data).unwrap();
        assert_eq!(words.timestamp(0).unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_oversized_string_offset_is_decode_error() {
        let data = word(1 << 63);
        let words = AbiWords::new(&data).unwrap();
        assert!(matches!(words.string(0), Err(ReadError::Decode(_))));
        assert!(words.word(usize::MAX).is_err());
    }

    #[test]
    fn test_oversized_string_length_is_decode_error() {
        let data = format!("{}{}", word(32), word(u64::MAX as u128));
        let words = AbiWords::new(&data).unwrap();
        assert!(matches!(words.string(0), Err(ReadError::Decode(_))));
    }

    #[test]
    fn test_non_hex_data_rejected() {
        let mut data = "0".repeat(62);
        data.push_str("zz");
        assert!(matches!(AbiWords::new(&data), Err(ReadError::Decode(_))));

        // 64 bytes, but not ASCII
        let data = format!("{}é{}", "0".repeat(30), "0".repeat(32));
        assert_eq!(data.len(), 64);
        assert!(matches!(AbiWords::new(&data), Err(ReadError::Decode(_))));
    }
}
