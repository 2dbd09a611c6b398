use crate::domain::model::{Outcome, PayoutHistory, Project, User};
use crate::infrastructure::storage::cache::SingleFlightCache;
use dashmap::DashSet;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Endpoints that some API deployments do not serve at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalRoute {
    /// v3 `/payout/balance`
    PayoutBalance,
    /// v2 `/user/{id}/payouts`
    PayoutHistory,
}

impl fmt::Display for OptionalRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionalRoute::PayoutBalance => write!(f, "payout balance"),
            OptionalRoute::PayoutHistory => write!(f, "payout history"),
        }
    }
}

/// Per-process state shared by every clone of an `ApiClient`.
///
/// Holds the read caches and what the session has learned about the
/// deployment: routes that do not exist, and resources that answered 404.
pub struct Session {
    pub current_user: SingleFlightCache<User>,
    pub users: SingleFlightCache<Outcome<User>>,
    pub user_projects: SingleFlightCache<Vec<Project>>,
    pub payout_balance: SingleFlightCache<Outcome<Value>>,
    pub payout_history: SingleFlightCache<Outcome<PayoutHistory>>,
    missing_routes: DashSet<OptionalRoute>,
    unavailable: DashSet<(OptionalRoute, String)>,
}

impl Session {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current_user: SingleFlightCache::new("current_user", ttl),
            users: SingleFlightCache::new("users", ttl),
            user_projects: SingleFlightCache::new("user_projects", ttl),
            payout_balance: SingleFlightCache::new("payout_balance", ttl),
            payout_history: SingleFlightCache::new("payout_history", ttl),
            missing_routes: DashSet::new(),
            unavailable: DashSet::new(),
        }
    }

    pub fn is_route_missing(&self, route: OptionalRoute) -> bool {
        self.missing_routes.contains(&route)
    }

    pub fn mark_route_missing(&self, route: OptionalRoute) {
        if self.missing_routes.insert(route) {
            info!(%route, "route does not exist on this deployment, disabling for the session");
        }
    }

    pub fn is_unavailable(&self, route: OptionalRoute, key: &str) -> bool {
        self.unavailable.contains(&(route, key.to_string()))
    }

    pub fn mark_unavailable(&self, route: OptionalRoute, key: &str) {
        self.unavailable.insert((route, key.to_string()));
    }

    /// Drop cached reads; learned route facts are kept.
    pub fn clear_cached_reads(&self) {
        self.current_user.clear();
        self.users.clear();
        self.user_projects.clear();
        self.payout_balance.clear();
        self.payout_history.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.current_user.len()
            + self.users.len()
            + self.user_projects.len()
            + self.payout_balance.len()
            + self.payout_history.len()
    }
}
