use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// 用户资料
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub payout_data: PayoutConfig,
    /// Fields the client does not model are kept so payloads pass through intact.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Overlay a newer copy of the same profile on this one.
    ///
    /// Fields from `fresh` win, except that a payout block missing from
    /// `fresh` does not erase the one already known.
    pub fn refreshed_with(self, fresh: User) -> User {
        let mut extra = self.extra;
        extra.extend(fresh.extra);
        User {
            id: fresh.id,
            username: fresh.username,
            avatar_url: fresh.avatar_url.or(self.avatar_url),
            bio: fresh.bio.or(self.bio),
            role: fresh.role,
            payout_data: fresh.payout_data.or(self.payout_data),
            extra,
        }
    }
}

/// The private payout block of a profile.
///
/// `/user` returns it for the token owner, `/user/{id}` may omit it or send
/// `null`; both of those deserialize to `Absent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Option<PayoutData>", into = "Option<PayoutData>")]
pub enum PayoutConfig {
    #[default]
    Absent,
    Present(PayoutData),
}

impl PayoutConfig {
    pub fn as_present(&self) -> Option<&PayoutData> {
        match self {
            PayoutConfig::Present(data) => Some(data),
            PayoutConfig::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, PayoutConfig::Present(_))
    }

    /// Keep `self` when present, otherwise fall back to `other`.
    pub fn or(self, other: PayoutConfig) -> PayoutConfig {
        match self {
            PayoutConfig::Present(_) => self,
            PayoutConfig::Absent => other,
        }
    }
}

impl From<Option<PayoutData>> for PayoutConfig {
    fn from(value: Option<PayoutData>) -> Self {
        value.map_or(PayoutConfig::Absent, PayoutConfig::Present)
    }
}

impl From<PayoutConfig> for Option<PayoutData> {
    fn from(value: PayoutConfig) -> Self {
        match value {
            PayoutConfig::Present(data) => Some(data),
            PayoutConfig::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PayoutData {
    /// Number or numeric string depending on the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_balance: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_wallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_wallet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PayoutData {
    /// A wallet counts as configured when any field besides `balance` and
    /// `currency` is set.
    pub fn wallet_configured(&self) -> bool {
        let named = [
            &self.payout_wallet,
            &self.payout_wallet_type,
            &self.payout_address,
        ]
        .into_iter()
        .flatten()
        .any(|s| !s.trim().is_empty());

        named
            || self.payout_balance.as_ref().is_some_and(truthy)
            || self.extra.values().any(truthy)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// 单笔提现记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoutTransaction {
    pub created: DateTime<Utc>,
    pub amount: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoutHistory {
    #[serde(default)]
    pub balance_all_time: f64,
    #[serde(default)]
    pub last_30_days: f64,
    #[serde(default)]
    pub payouts: Vec<PayoutTransaction>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Approved,
    Archived,
    Rejected,
    Draft,
    Unlisted,
    Processing,
    Withheld,
    Scheduled,
    Private,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Approved => "approved",
            ProjectStatus::Archived => "archived",
            ProjectStatus::Rejected => "rejected",
            ProjectStatus::Draft => "draft",
            ProjectStatus::Unlisted => "unlisted",
            ProjectStatus::Processing => "processing",
            ProjectStatus::Withheld => "withheld",
            ProjectStatus::Scheduled => "scheduled",
            ProjectStatus::Private => "private",
            ProjectStatus::Unknown => "unknown",
        }
    }

    /// Statuses a project owner may request directly.
    pub fn is_owner_settable(&self) -> bool {
        matches!(
            self,
            ProjectStatus::Draft | ProjectStatus::Archived | ProjectStatus::Unlisted
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct License {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryImage {
    pub url: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ordering: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub team: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub client_side: Option<String>,
    #[serde(default)]
    pub server_side: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub requested_status: Option<String>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub issues_url: Option<String>,
    #[serde(default)]
    pub wiki_url: Option<String>,
    #[serde(default)]
    pub discord_url: Option<String>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDependency {
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub dependency_type: DependencyType,
    // 以下两项由客户端补全，不属于 API 字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileHashes {
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub sha512: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionFile {
    pub hashes: FileHashes,
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Version {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub author_id: String,
    pub name: String,
    pub version_number: String,
    #[serde(default)]
    pub version_type: String,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<ProjectDependency>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMember {
    pub user: User,
    pub team_id: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Option<u64>,
    #[serde(default)]
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub read: bool,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub actions: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationFilter {
    Read,
    #[default]
    Unread,
    All,
}

impl NotificationFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationFilter::Read => "read",
            NotificationFilter::Unread => "unread",
            NotificationFilter::All => "all",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSearchResult {
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub role: String,
}

impl From<User> for UserSearchResult {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            avatar_url: user.avatar_url,
            role: user.role,
        }
    }
}

/// Result of a read whose callers need the HTTP status instead of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Found(T),
    /// Non-success response from the server.
    Status(u16),
    /// The route does not exist on this deployment.
    RouteMissing,
}

impl<T> Outcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Outcome::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Outcome::Found(value) => Some(value),
            _ => None,
        }
    }
}
