use crate::domain::error::RinthError;
use crate::domain::model::{Outcome, PayoutHistory, Project, User};
use crate::domain::payout::{reconcile, wallet_warning, PayoutInputs, PayoutView};
use crate::domain::traits::DashboardSource;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

const TOP_PROJECTS: usize = 10;
const TOP_CATEGORIES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Downloads,
    Followers,
}

impl Metric {
    pub fn of(&self, project: &Project) -> u64 {
        match self {
            Metric::Downloads => project.downloads,
            Metric::Followers => project.followers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProject {
    pub id: String,
    pub title: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    pub project_count: usize,
    pub total_downloads: u64,
    pub total_followers: u64,
    pub avg_downloads: f64,
    /// Most used categories with their project counts.
    pub top_categories: Vec<(String, usize)>,
    pub metric: Metric,
    pub top_projects: Vec<RankedProject>,
}

pub fn compute_stats(projects: &[Project], metric: Metric) -> ProjectStats {
    let total_downloads: u64 = projects.iter().map(|p| p.downloads).sum();
    let total_followers: u64 = projects.iter().map(|p| p.followers).sum();
    let avg_downloads = if projects.is_empty() {
        0.0
    } else {
        total_downloads as f64 / projects.len() as f64
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for category in projects.iter().flat_map(|p| p.categories.iter()) {
        *counts.entry(category.as_str()).or_default() += 1;
    }
    let mut top_categories: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    top_categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_categories.truncate(TOP_CATEGORIES);

    let mut ranked: Vec<&Project> = projects.iter().collect();
    ranked.sort_by(|a, b| metric.of(b).cmp(&metric.of(a)));
    let top_projects = ranked
        .into_iter()
        .take(TOP_PROJECTS)
        .map(|p| RankedProject {
            id: p.id.clone(),
            title: p.title.clone(),
            value: metric.of(p),
        })
        .collect();

    ProjectStats {
        project_count: projects.len(),
        total_downloads,
        total_followers,
        avg_downloads,
        top_categories,
        metric,
        top_projects,
    }
}

/// How the balance snapshot request went.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "status", rename_all = "snake_case")]
pub enum SnapshotState {
    Loaded,
    RouteMissing,
    Status(u16),
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: User,
    /// Status of the `/user/{id}` refresh; `None` when it could not be made.
    pub profile_status: Option<u16>,
    pub stats: ProjectStats,
    pub payout: PayoutView,
    pub snapshot_state: SnapshotState,
    pub wallet_warning: bool,
}

/// Gather everything the analytics view shows.
///
/// Only the current-user lookup is fatal. The other reads degrade to empty
/// or unavailable data.
pub async fn load_dashboard<S>(source: &S, metric: Metric) -> Result<Dashboard, RinthError>
where
    S: DashboardSource + ?Sized,
{
    let user = source.current_user().await?;

    let (projects, refreshed, balance) = tokio::join!(
        source.user_projects(&user.id),
        source.user_by_id(&user.id),
        source.payout_balance(),
    );

    let projects = projects.unwrap_or_else(|e| {
        warn!(error = %e, "failed to load projects for analytics");
        Vec::new()
    });

    let (user, profile_status) = match refreshed {
        Ok(Outcome::Found(fresh)) => (user.refreshed_with(fresh), Some(200)),
        Ok(Outcome::Status(status)) => (user, Some(status)),
        Ok(Outcome::RouteMissing) => (user, None),
        Err(e) => {
            warn!(error = %e, "failed to refresh profile");
            (user, None)
        }
    };

    let (snapshot, snapshot_state): (Option<Value>, SnapshotState) = match balance {
        Ok(Outcome::Found(body)) => (Some(body), SnapshotState::Loaded),
        Ok(Outcome::RouteMissing) => (None, SnapshotState::RouteMissing),
        Ok(Outcome::Status(status)) => (None, SnapshotState::Status(status)),
        Err(e) => {
            warn!(error = %e, "failed to load payout balance");
            (None, SnapshotState::Failed)
        }
    };

    let inputs = PayoutInputs {
        profile: &user,
        profile_status,
        snapshot: snapshot.as_ref(),
    };
    let payout = reconcile(&inputs);
    let wallet_warning = wallet_warning(&inputs);

    Ok(Dashboard {
        stats: compute_stats(&projects, metric),
        payout,
        snapshot_state,
        wallet_warning,
        profile_status,
        user,
    })
}

/// Payout history for the payouts view.
///
/// A failed read is logged and comes back as `None` so the rest of the view
/// still renders.
pub async fn load_payout_history<S>(source: &S, user_id: &str) -> Option<Outcome<PayoutHistory>>
where
    S: DashboardSource + ?Sized,
{
    match source.payout_history(user_id).await {
        Ok(history) => Some(history),
        Err(e) => {
            warn!(error = %e, user_id, "failed to load payout history");
            None
        }
    }
}
