use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{LifecycleState, SupplyPair};

/// Price of a market with no supply on either side.
pub const UNINFORMED_PRICE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Implied YES price: `yes / (yes + no)`, or 0.5 when both supplies are zero.
///
/// The division is done from the smaller side so that
/// `yes_price(y, n) + yes_price(n, y)` is exactly one. Supplies whose sum
/// overflows `Decimal` are quartered first, which keeps the ratio.
pub fn yes_price(supply: SupplyPair) -> Decimal {
    let supply = match supply.yes.checked_add(supply.no) {
        Some(_) => supply,
        None => supply.scaled(Decimal::new(25, 2)),
    };

    let total = supply.total();
    if total.is_zero() {
        return UNINFORMED_PRICE;
    }

    // smaller <= total, so the quotient is at most one half
    if supply.yes <= supply.no {
        supply.yes / total
    } else {
        Decimal::ONE - supply.no / total
    }
}

pub fn no_price(supply: SupplyPair) -> Decimal {
    Decimal::ONE - yes_price(supply)
}

/// YES price as a percentage in `[0, 100]`.
pub fn implied_probability_pct(supply: SupplyPair) -> Decimal {
    yes_price(supply) * Decimal::ONE_HUNDRED
}

/// YES price after a protection purchase of `amount`.
pub fn price_after_buy(supply: SupplyPair, amount: Decimal) -> Decimal {
    yes_price(supply.after_buy(amount))
}

/// Relative price move caused by buying `amount`, in percent.
/// Zero when the current price is zero.
pub fn price_impact_pct(supply: SupplyPair, amount: Decimal) -> Decimal {
    pct_change(yes_price(supply), price_after_buy(supply, amount))
}

/// `(to - from) / from * 100`. Zero when `from` is zero; saturates at
/// `Decimal::MAX` / `Decimal::MIN` when the result does not fit.
pub fn pct_change(from: Decimal, to: Decimal) -> Decimal {
    if from.is_zero() {
        return Decimal::ZERO;
    }

    let saturated = if (to > from) == from.is_sign_positive() {
        Decimal::MAX
    } else {
        Decimal::MIN
    };

    to.checked_sub(from)
        .and_then(|diff| diff.checked_div(from))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(saturated)
}

// ---------------------------------------------------------------------------
// Buy quote
// ---------------------------------------------------------------------------

/// Preview of a protection purchase, for the buy form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyQuote {
    pub amount: Decimal,
    pub price_before: Decimal,
    pub price_after: Decimal,
    pub impact_pct: Decimal,
    /// `None` when no wallet balance is known.
    pub sufficient_funds: Option<bool>,
    pub can_buy: bool,
}

/// Quote a purchase of `amount` against current supplies.
///
/// Buying is only offered while the market is active, for a positive
/// amount, and when the caller's base-currency balance (if known) covers it.
pub fn quote_buy(
    state: LifecycleState,
    supply: SupplyPair,
    amount: Decimal,
    available: Option<Decimal>,
) -> BuyQuote {
    let amount = amount.max(Decimal::ZERO);
    let sufficient_funds = available.map(|balance| balance >= amount);

    let can_buy = state.is_active() && amount > Decimal::ZERO && sufficient_funds.unwrap_or(false);

    BuyQuote {
        amount,
        price_before: yes_price(supply),
        price_after: price_after_buy(supply, amount),
        impact_pct: price_impact_pct(supply, amount),
        sufficient_funds,
        can_buy,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
