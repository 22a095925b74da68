use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{LifecycleState, Outcome, SupplyPair, WalletBalances};

/// Which of the caller's two balances a settlement pays out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutBasis {
    Yes,
    No,
}

impl PayoutBasis {
    /// YES holders win a credit event; NO holders win otherwise.
    pub fn for_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::CreditEvent => PayoutBasis::Yes,
            Outcome::NoEvent | Outcome::Unset => PayoutBasis::No,
        }
    }

    pub fn balance(&self, yes: Decimal, no: Decimal) -> Decimal {
        match self {
            PayoutBasis::Yes => yes,
            PayoutBasis::No => no,
        }
    }
}

impl fmt::Display for PayoutBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutBasis::Yes => write!(f, "YES"),
            PayoutBasis::No => write!(f, "NO"),
        }
    }
}

/// Claim affordance for one account on one market.
///
/// A zero winning balance reads the same whether the account never held the
/// winning side or already claimed; only the contract can tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementPreview {
    /// `None` until the market is resolved.
    pub basis: Option<PayoutBasis>,
    pub winning_balance: Decimal,
    pub can_claim: bool,
}

/// True only for a resolved market where the winning-side balance is positive.
pub fn can_claim(state: LifecycleState, yes_balance: Decimal, no_balance: Decimal) -> bool {
    match state {
        LifecycleState::Resolved(outcome) => {
            PayoutBasis::for_outcome(outcome).balance(yes_balance, no_balance) > Decimal::ZERO
        }
        LifecycleState::Active | LifecycleState::AwaitingResolution => false,
    }
}

pub fn preview(state: LifecycleState, balances: &WalletBalances) -> SettlementPreview {
    let LifecycleState::Resolved(outcome) = state else {
        return SettlementPreview {
            basis: None,
            winning_balance: Decimal::ZERO,
            can_claim: false,
        };
    };

    let basis = PayoutBasis::for_outcome(outcome);
    SettlementPreview {
        basis: Some(basis),
        winning_balance: basis.balance(balances.yes, balances.no),
        can_claim: can_claim(state, balances.yes, balances.no),
    }
}

/// Caller's fraction of the winning side's supply, assuming escrow is split
/// pro rata among winning tokens. Zero when unresolved or nothing is held.
pub fn expected_share(preview: &SettlementPreview, supply: SupplyPair) -> Decimal {
    let Some(basis) = preview.basis else {
        return Decimal::ZERO;
    };

    let winning_supply = basis.balance(supply.yes, supply.no);
    if winning_supply.is_zero() {
        return Decimal::ZERO;
    }

    (preview.winning_balance / winning_supply).min(Decimal::ONE)
}

// ---------------------------------------------------------------------------
// Position valuation
// ---------------------------------------------------------------------------

/// Mark-to-model value of a wallet's holdings at the current YES price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValue {
    pub yes_value: Decimal,
    pub no_value: Decimal,
    pub total: Decimal,
}

pub fn value_position(balances: &WalletBalances, yes_price: Decimal) -> PositionValue {
    let yes_value = balances.yes * yes_price;
    let no_value = balances.no * (Decimal::ONE - yes_price);

    PositionValue {
        yes_value,
        no_value,
        total: yes_value + no_value,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
