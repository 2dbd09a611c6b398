//! 仪表盘聚合测试

use async_trait::async_trait;
use rinth::application::analytics::{
    compute_stats, load_dashboard, load_payout_history, Metric, SnapshotState,
};
use rinth::domain::error::RinthError;
use rinth::domain::model::{Outcome, PayoutHistory, Project, User};
use rinth::domain::payout::{PayoutSource, PayoutView};
use rinth::domain::traits::DashboardSource;
use rinth::presentation::render::{render_dashboard, render_projects};
use rinth::presentation::theme::Theme;
use serde_json::{json, Value};

fn project(id: &str, downloads: u64, followers: u64, categories: &[&str]) -> Project {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("Project {}", id),
        "downloads": downloads,
        "followers": followers,
        "categories": categories,
    }))
    .unwrap()
}

fn user(payout_data: Value) -> User {
    serde_json::from_value(json!({
        "id": "u1",
        "username": "alice",
        "payout_data": payout_data,
    }))
    .unwrap()
}

struct FakeSource {
    me: Result<User, u16>,
    by_id: Outcome<User>,
    projects: Result<Vec<Project>, u16>,
    balance: Result<Outcome<Value>, u16>,
    history: Result<Outcome<PayoutHistory>, u16>,
}

fn status_error(status: u16) -> RinthError {
    RinthError::Status {
        status,
        body: String::new(),
    }
}

#[async_trait]
impl DashboardSource for FakeSource {
    async fn current_user(&self) -> Result<User, RinthError> {
        self.me.clone().map_err(status_error)
    }

    async fn user_by_id(&self, _user_id: &str) -> Result<Outcome<User>, RinthError> {
        Ok(self.by_id.clone())
    }

    async fn user_projects(&self, _user_id: &str) -> Result<Vec<Project>, RinthError> {
        self.projects.clone().map_err(status_error)
    }

    async fn payout_balance(&self) -> Result<Outcome<Value>, RinthError> {
        self.balance.clone().map_err(status_error)
    }

    async fn payout_history(&self, _user_id: &str) -> Result<Outcome<PayoutHistory>, RinthError> {
        self.history.clone().map_err(status_error)
    }
}

#[test]
fn test_compute_stats_ranks_projects() {
    let projects = vec![
        project("a", 100, 5, &["fabric", "utility"]),
        project("b", 300, 1, &["fabric"]),
        project("c", 200, 9, &["magic", "utility", "fabric"]),
    ];

    let stats = compute_stats(&projects, Metric::Downloads);
    assert_eq!(stats.project_count, 3);
    assert_eq!(stats.total_downloads, 600);
    assert_eq!(stats.total_followers, 15);
    assert_eq!(stats.avg_downloads, 200.0);
    assert_eq!(
        stats.top_categories,
        vec![
            ("fabric".to_string(), 3),
            ("utility".to_string(), 2),
            ("magic".to_string(), 1),
        ]
    );
    let order: Vec<&str> = stats.top_projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(order, ["b", "c", "a"]);

    let by_followers = compute_stats(&projects, Metric::Followers);
    assert_eq!(by_followers.top_projects[0].id, "c");
    assert_eq!(by_followers.top_projects[0].value, 9);
}

#[test]
fn test_compute_stats_empty() {
    let stats = compute_stats(&[], Metric::Downloads);
    assert_eq!(stats.project_count, 0);
    assert_eq!(stats.avg_downloads, 0.0);
    assert!(stats.top_projects.is_empty());
    assert!(stats.top_categories.is_empty());
}

#[test]
fn test_top_lists_are_truncated() {
    let cats = ["a", "b", "c", "d", "e"];
    let projects: Vec<Project> = (0..12)
        .map(|i| project(&i.to_string(), i, 0, &cats))
        .collect();

    let stats = compute_stats(&projects, Metric::Downloads);
    assert_eq!(stats.top_projects.len(), 10);
    assert_eq!(stats.top_projects[0].value, 11);
    assert_eq!(stats.top_categories.len(), 4);
}

#[tokio::test]
async fn test_dashboard_merges_snapshot() {
    let source = FakeSource {
        me: Ok(user(json!({ "balance": 1, "currency": "USD" }))),
        by_id: Outcome::Found(user(Value::Null)),
        projects: Ok(vec![project("a", 10, 1, &[])]),
        balance: Ok(Outcome::Found(json!({
            "available": 10,
            "pending": 2,
            "withdrawn_lifetime": 50
        }))),
        history: Ok(Outcome::RouteMissing),
    };

    let dashboard = load_dashboard(&source, Metric::Downloads).await.unwrap();
    assert_eq!(dashboard.profile_status, Some(200));
    assert_eq!(dashboard.snapshot_state, SnapshotState::Loaded);
    assert!(dashboard.user.payout_data.is_present());
    assert!(!dashboard.wallet_warning);

    let summary = dashboard.payout.summary().unwrap();
    assert_eq!(summary.wallet_balance, 12.0);
    assert_eq!(summary.lifetime_earnings, 62.0);
    assert_eq!(summary.currency.as_deref(), Some("USD"));
    assert_eq!(summary.source, PayoutSource::BalanceSnapshot);
    assert_eq!(dashboard.stats.total_downloads, 10);

    let text = render_dashboard(&dashboard, &Theme::from_settings("dark", "#30B27C"));
    assert!(text.contains("alice"));
}

#[tokio::test]
async fn test_dashboard_degrades_on_secondary_failures() {
    let source = FakeSource {
        me: Ok(user(json!({ "balance": "4.5" }))),
        by_id: Outcome::Status(403),
        projects: Err(500),
        balance: Ok(Outcome::RouteMissing),
        history: Ok(Outcome::RouteMissing),
    };

    let dashboard = load_dashboard(&source, Metric::Followers).await.unwrap();
    assert_eq!(dashboard.profile_status, Some(403));
    assert_eq!(dashboard.snapshot_state, SnapshotState::RouteMissing);
    assert_eq!(dashboard.stats.project_count, 0);
    assert_eq!(dashboard.payout, PayoutView::Unavailable);
    assert!(dashboard.wallet_warning);
}

#[tokio::test]
async fn test_dashboard_falls_back_to_profile_balance() {
    let source = FakeSource {
        me: Ok(user(json!({ "balance": "4.5", "payout_wallet": "paypal" }))),
        by_id: Outcome::Found(user(Value::Null)),
        projects: Ok(Vec::new()),
        balance: Err(502),
        history: Ok(Outcome::RouteMissing),
    };

    let dashboard = load_dashboard(&source, Metric::Downloads).await.unwrap();
    assert_eq!(dashboard.snapshot_state, SnapshotState::Failed);
    let summary = dashboard.payout.summary().unwrap();
    assert_eq!(summary.wallet_balance, 4.5);
    assert_eq!(summary.source, PayoutSource::Profile);
    assert!(!dashboard.wallet_warning);
}

#[tokio::test]
async fn test_dashboard_requires_current_user() {
    let source = FakeSource {
        me: Err(401),
        by_id: Outcome::Status(401),
        projects: Ok(Vec::new()),
        balance: Ok(Outcome::Status(401)),
        history: Ok(Outcome::RouteMissing),
    };

    let err = load_dashboard(&source, Metric::Downloads).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn test_render_projects_lists_titles() {
    let projects = vec![project("a", 1234, 5, &["fabric"])];
    let text = render_projects(&projects, Metric::Downloads, &Theme::from_settings("light", "#000000"));
    assert!(text.contains("Project a"));
}

#[tokio::test]
async fn test_payout_history_failure_reads_as_none() {
    let mut source = FakeSource {
        me: Ok(user(Value::Null)),
        by_id: Outcome::Status(404),
        projects: Ok(Vec::new()),
        balance: Ok(Outcome::RouteMissing),
        history: Err(500),
    };
    assert_eq!(load_payout_history(&source, "u1").await, None);

    source.history = Ok(Outcome::Status(403));
    assert_eq!(
        load_payout_history(&source, "u1").await,
        Some(Outcome::Status(403))
    );

    let text = rinth::presentation::render::render_payout_history(
        None,
        &Theme::from_settings("dark", "#30B27C"),
    );
    assert!(text.contains("could not be loaded"));
}
