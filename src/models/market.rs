use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential market identifier assigned by the contract, starting at 1.
pub type MarketId = u64;

/// Resolution outcome as recorded by the settlement contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Unset,
    NoEvent,
    CreditEvent,
}

impl Outcome {
    /// Decode the contract's `uint8 outcome` field.
    ///
    /// The contract writes `1` for a credit event and `0` for no event, and
    /// the field is only meaningful once `resolved` is set. Any other value on
    /// a resolved market is read as `NoEvent`, so a resolved record always
    /// carries a settled outcome.
    pub fn from_raw(resolved: bool, raw: u8) -> Self {
        match (resolved, raw) {
            (false, _) => Outcome::Unset,
            (true, 1) => Outcome::CreditEvent,
            (true, _) => Outcome::NoEvent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Unset => "unset",
            Outcome::NoEvent => "no_event",
            Outcome::CreditEvent => "credit_event",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Unset => write!(f, "Unset"),
            Outcome::NoEvent => write!(f, "No Event"),
            Outcome::CreditEvent => write!(f, "Credit Event"),
        }
    }
}

/// Read-only snapshot of one `markets(id)` slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub id: MarketId,
    pub owner: String,
    pub question: String,
    pub deadline: DateTime<Utc>,
    pub resolved: bool,
    pub outcome: Outcome,
    pub yes_token: String,
    pub no_token: String,
    /// False for slots that were never created.
    pub exists: bool,
}

impl MarketRecord {
    pub fn is_owned_by(&self, account: &str) -> bool {
        self.owner.eq_ignore_ascii_case(account)
    }
}

/// Total supplies of a market's YES and NO tokens, in whole-token units.
///
/// The two values come from independent reads and may be from different
/// blocks; nothing downstream treats them as an atomic pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyPair {
    pub yes: Decimal,
    pub no: Decimal,
}

impl SupplyPair {
    pub fn new(yes: Decimal, no: Decimal) -> Self {
        Self { yes, no }
    }

    pub fn total(&self) -> Decimal {
        self.yes + self.no
    }

    /// Supplies after a protection purchase of `amount`: the buyer receives
    /// `amount` YES and the owner is minted the same `amount` of NO.
    /// Each side saturates at `Decimal::MAX`.
    pub fn after_buy(&self, amount: Decimal) -> Self {
        Self {
            yes: self.yes.checked_add(amount).unwrap_or(Decimal::MAX),
            no: self.no.checked_add(amount).unwrap_or(Decimal::MAX),
        }
    }

    /// Both supplies scaled by `factor`.
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            yes: self.yes * factor,
            no: self.no * factor,
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleState
// ---------------------------------------------------------------------------

/// Derived lifecycle label. Never stored; recomputed against `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    AwaitingResolution,
    Resolved(Outcome),
}

impl LifecycleState {
    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LifecycleState::Resolved(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::AwaitingResolution => "awaiting_resolution",
            LifecycleState::Resolved(_) => "resolved",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Active => write!(f, "Active"),
            LifecycleState::AwaitingResolution => write!(f, "Pending Resolution"),
            LifecycleState::Resolved(outcome) => write!(f, "Resolved ({outcome})"),
        }
    }
}
