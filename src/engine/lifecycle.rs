use chrono::{DateTime, Utc};

use crate::models::{LifecycleState, MarketRecord, Outcome};

/// Classify a market against `now`.
///
/// Rules:
/// - **Resolved(outcome)**: `resolved` is set, regardless of time.
/// - **Active**: unresolved and `now < deadline`.
/// - **AwaitingResolution**: unresolved and `now >= deadline`.
///
/// Callers drop `exists = false` slots before classifying.
pub fn classify(record: &MarketRecord, now: DateTime<Utc>) -> LifecycleState {
    if record.resolved {
        // A resolved slot always carries a settled outcome
        let outcome = match record.outcome {
            Outcome::Unset => Outcome::NoEvent,
            settled => settled,
        };
        return LifecycleState::Resolved(outcome);
    }

    if now < record.deadline {
        LifecycleState::Active
    } else {
        LifecycleState::AwaitingResolution
    }
}

/// Whether `caller` may resolve the market now: the owner, after expiry,
/// before resolution. Informational; the contract enforces it.
pub fn can_resolve(record: &MarketRecord, caller: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(caller) = caller else {
        return false;
    };

    record.is_owned_by(caller) && classify(record, now) == LifecycleState::AwaitingResolution
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
