//! Payout figures reconciled from the profile payout block and the v3
//! balance snapshot.
//!
//! Both sources drift between API deployments, so every quantity is looked up
//! through an ordered list of candidate field paths. The first candidate that
//! holds a finite number wins.

use crate::domain::model::User;
use serde::Serialize;
use serde_json::Value;

/// A field location inside a JSON document, outermost key first.
pub type FieldPath = &'static [&'static str];

pub const AVAILABLE: &[FieldPath] = &[
    &["available_now"],
    &["availableNow"],
    &["available"],
    &["balance_available"],
    &["balanceAvailable"],
];

pub const PENDING: &[FieldPath] = &[&["pending"]];

pub const WITHDRAWN_LIFETIME: &[FieldPath] = &[&["withdrawn_lifetime"], &["withdrawnLifetime"]];

pub const SNAPSHOT_TOTAL: &[FieldPath] = &[&["balance"], &["total_balance"], &["totalBalance"]];

/// Looked up on the serialized profile.
pub const PROFILE_BALANCE: &[FieldPath] = &[
    &["payout_data", "balance"],
    &["payout_data", "payout_balance"],
    &["payout_data", "payoutBalance"],
    &["payout_balance"],
    &["payoutBalance"],
];

/// Read a value as a finite number. Numeric strings are accepted.
pub fn as_finite(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn lookup<'a>(doc: &'a Value, path: FieldPath) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, key| node.get(*key))
}

/// First candidate path yielding a finite number.
pub fn probe(doc: &Value, candidates: &[FieldPath]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|path| lookup(doc, *path).and_then(as_finite))
}

/// Sum of the present operands, `None` when both are missing.
fn sum_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        _ => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

/// Quantities read straight off the balance snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SnapshotFigures {
    pub available: Option<f64>,
    pub pending: Option<f64>,
    pub withdrawn_lifetime: Option<f64>,
    pub total: Option<f64>,
}

impl SnapshotFigures {
    pub fn from_snapshot(snapshot: &Value) -> Self {
        if !snapshot.is_object() {
            return Self::default();
        }
        Self {
            available: probe(snapshot, AVAILABLE),
            pending: probe(snapshot, PENDING),
            withdrawn_lifetime: probe(snapshot, WITHDRAWN_LIFETIME),
            total: probe(snapshot, SNAPSHOT_TOTAL),
        }
    }

    pub fn has_data(&self) -> bool {
        self.available.is_some() || self.pending.is_some() || self.withdrawn_lifetime.is_some()
    }

    /// Available plus pending, what the revenue page calls the balance.
    pub fn balance(&self) -> Option<f64> {
        sum_present(self.available, self.pending)
    }

    /// Balance plus everything already withdrawn.
    pub fn lifetime(&self) -> Option<f64> {
        sum_present(self.balance(), self.withdrawn_lifetime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutSource {
    BalanceSnapshot,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutSummary {
    pub available: Option<f64>,
    pub pending: Option<f64>,
    pub withdrawn_lifetime: Option<f64>,
    pub wallet_balance: f64,
    pub lifetime_earnings: f64,
    pub currency: Option<String>,
    pub source: PayoutSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PayoutView {
    Unavailable,
    Available(PayoutSummary),
}

impl PayoutView {
    pub fn summary(&self) -> Option<&PayoutSummary> {
        match self {
            PayoutView::Available(summary) => Some(summary),
            PayoutView::Unavailable => None,
        }
    }
}

/// Inputs to reconciliation, as returned by the gateway.
pub struct PayoutInputs<'a> {
    pub profile: &'a User,
    /// Status of the `/user/{id}` refresh, when one was attempted.
    pub profile_status: Option<u16>,
    /// Balance snapshot body, when the endpoint answered with one.
    pub snapshot: Option<&'a Value>,
}

impl PayoutInputs<'_> {
    /// The profile refresh was refused, so its payout block cannot be trusted.
    pub fn profile_unauthorized(&self) -> bool {
        matches!(self.profile_status, Some(401 | 403))
    }
}

/// Combine the snapshot and the profile into one view.
///
/// Pure: the same inputs always give the same view.
pub fn reconcile(inputs: &PayoutInputs<'_>) -> PayoutView {
    let figures = inputs
        .snapshot
        .map(SnapshotFigures::from_snapshot)
        .unwrap_or_default();
    let currency = inputs
        .profile
        .payout_data
        .as_present()
        .and_then(|data| data.currency.clone());

    let trusted = !inputs.profile_unauthorized() && inputs.profile.payout_data.is_present();
    let profile_balance = if trusted {
        serde_json::to_value(inputs.profile)
            .ok()
            .and_then(|doc| probe(&doc, PROFILE_BALANCE))
    } else {
        None
    };

    if figures.has_data() {
        let wallet_balance = figures.balance().or(profile_balance).unwrap_or(0.0);
        let lifetime_earnings = figures
            .lifetime()
            .or(figures.total)
            .unwrap_or(wallet_balance);
        return PayoutView::Available(PayoutSummary {
            available: figures.available,
            pending: figures.pending,
            withdrawn_lifetime: figures.withdrawn_lifetime,
            wallet_balance,
            lifetime_earnings,
            currency,
            source: PayoutSource::BalanceSnapshot,
        });
    }

    match profile_balance {
        Some(balance) => PayoutView::Available(PayoutSummary {
            available: Some(balance),
            pending: None,
            withdrawn_lifetime: None,
            wallet_balance: balance,
            lifetime_earnings: figures.total.unwrap_or(balance),
            currency,
            source: PayoutSource::Profile,
        }),
        None => PayoutView::Unavailable,
    }
}

/// Whether the dashboard should prompt the user to set up a payout wallet.
pub fn wallet_warning(inputs: &PayoutInputs<'_>) -> bool {
    let has_snapshot = inputs
        .snapshot
        .map(|snapshot| SnapshotFigures::from_snapshot(snapshot).has_data())
        .unwrap_or(false);
    if has_snapshot {
        return false;
    }

    let wallet_configured = inputs
        .profile
        .payout_data
        .as_present()
        .is_some_and(|data| data.wallet_configured());

    inputs.profile_unauthorized() || !wallet_configured
}
