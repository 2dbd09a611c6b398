//! 收益对账测试

use rinth::domain::model::User;
use rinth::domain::payout::{
    probe, reconcile, wallet_warning, PayoutInputs, PayoutSource, PayoutView, SnapshotFigures,
    AVAILABLE,
};
use serde_json::json;

fn user(payout_data: serde_json::Value) -> User {
    serde_json::from_value(json!({
        "id": "u1",
        "username": "alice",
        "role": "developer",
        "payout_data": payout_data,
    }))
    .unwrap()
}

#[test]
fn test_snapshot_figures_are_combined() {
    let profile = user(json!({ "balance": 99.0, "currency": "USD" }));
    let snapshot = json!({ "available": 10, "pending": 2, "withdrawn_lifetime": 50 });
    let inputs = PayoutInputs {
        profile: &profile,
        profile_status: Some(200),
        snapshot: Some(&snapshot),
    };

    let view = reconcile(&inputs);
    let summary = view.summary().unwrap();
    assert_eq!(summary.wallet_balance, 12.0);
    assert_eq!(summary.lifetime_earnings, 62.0);
    assert_eq!(summary.currency.as_deref(), Some("USD"));
    assert_eq!(summary.source, PayoutSource::BalanceSnapshot);

    // 纯函数：相同输入结果相同
    assert_eq!(reconcile(&inputs), view);
    assert!(!wallet_warning(&inputs));
}

#[test]
fn test_unavailable_without_any_source() {
    let profile = user(serde_json::Value::Null);
    let inputs = PayoutInputs {
        profile: &profile,
        profile_status: Some(200),
        snapshot: None,
    };

    assert_eq!(reconcile(&inputs), PayoutView::Unavailable);
    assert!(wallet_warning(&inputs));
}

#[test]
fn test_profile_balance_fallback() {
    let profile = user(json!({ "balance": "12.5", "currency": "USD", "payout_wallet": "paypal" }));
    let inputs = PayoutInputs {
        profile: &profile,
        profile_status: Some(200),
        snapshot: None,
    };

    let view = reconcile(&inputs);
    let summary = view.summary().unwrap();
    assert_eq!(summary.wallet_balance, 12.5);
    assert_eq!(summary.lifetime_earnings, 12.5);
    assert_eq!(summary.source, PayoutSource::Profile);
    assert!(!wallet_warning(&inputs));
}

#[test]
fn test_unauthorized_profile_is_ignored() {
    let profile = user(json!({ "balance": 30, "payout_wallet": "paypal" }));
    let inputs = PayoutInputs {
        profile: &profile,
        profile_status: Some(401),
        snapshot: None,
    };

    assert_eq!(reconcile(&inputs), PayoutView::Unavailable);
    assert!(wallet_warning(&inputs));
}

#[test]
fn test_snapshot_without_available_uses_profile_balance() {
    let profile = user(json!({ "balance": 8 }));
    let snapshot = json!({ "withdrawnLifetime": "20" });
    let inputs = PayoutInputs {
        profile: &profile,
        profile_status: Some(200),
        snapshot: Some(&snapshot),
    };

    let summary = reconcile(&inputs).summary().cloned().unwrap();
    assert_eq!(summary.wallet_balance, 8.0);
    assert_eq!(summary.lifetime_earnings, 20.0);
    assert_eq!(summary.available, None);
}

#[test]
fn test_snapshot_total_used_for_profile_lifetime() {
    let profile = user(json!({ "payout_balance": 5 }));
    let snapshot = json!({ "total_balance": 40 });
    let inputs = PayoutInputs {
        profile: &profile,
        profile_status: None,
        snapshot: Some(&snapshot),
    };

    let summary = reconcile(&inputs).summary().cloned().unwrap();
    assert_eq!(summary.source, PayoutSource::Profile);
    assert_eq!(summary.wallet_balance, 5.0);
    assert_eq!(summary.lifetime_earnings, 40.0);
    assert!(wallet_warning(&inputs));
}

#[test]
fn test_probe_order_and_parsing() {
    let doc = json!({ "availableNow": "abc", "available": " 3.5 ", "available_now": null });
    assert_eq!(probe(&doc, AVAILABLE), Some(3.5));

    let doc = json!({ "balance_available": 1, "available_now": 2 });
    assert_eq!(probe(&doc, AVAILABLE), Some(2.0));

    assert_eq!(probe(&json!({}), AVAILABLE), None);
}

#[test]
fn test_non_object_snapshot_has_no_data() {
    assert!(!SnapshotFigures::from_snapshot(&json!([1, 2, 3])).has_data());
    assert!(!SnapshotFigures::from_snapshot(&json!("10")).has_data());
    assert!(SnapshotFigures::from_snapshot(&json!({ "pending": 0 })).has_data());
}

#[test]
fn test_payout_balance_counts_as_wallet() {
    let profile = user(json!({ "balance": 1, "currency": "USD", "payout_balance": 5 }));
    let inputs = PayoutInputs {
        profile: &profile,
        profile_status: Some(200),
        snapshot: None,
    };
    assert!(!wallet_warning(&inputs));

    let zero = user(json!({ "balance": 1, "currency": "USD", "payout_balance": 0 }));
    let inputs = PayoutInputs {
        profile: &zero,
        profile_status: Some(200),
        snapshot: None,
    };
    assert!(wallet_warning(&inputs));
}

#[test]
fn test_profile_unauthorized_statuses() {
    let profile = user(serde_json::Value::Null);
    let status = |code| PayoutInputs {
        profile: &profile,
        profile_status: code,
        snapshot: None,
    };
    assert!(status(Some(401)).profile_unauthorized());
    assert!(status(Some(403)).profile_unauthorized());
    assert!(!status(Some(404)).profile_unauthorized());
    assert!(!status(None).profile_unauthorized());
}
