use crate::domain::model::{ProjectDependency, ProjectStatus};
use serde::Serialize;
use serde_json::{Map, Value};

/// Editable project metadata. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub client_side: Option<String>,
    pub server_side: Option<String>,
    pub license_id: Option<String>,
    pub license_url: Option<String>,
    pub issues_url: Option<String>,
    pub source_url: Option<String>,
    pub wiki_url: Option<String>,
    pub discord_url: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    /// Build the PATCH body the API accepts.
    ///
    /// Empty link strings clear the link. Statuses that only moderation can
    /// assign are dropped.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();

        let plain = [
            ("title", &self.title),
            ("description", &self.description),
            ("body", &self.body),
            ("client_side", &self.client_side),
            ("server_side", &self.server_side),
        ];
        for (key, value) in plain {
            if let Some(v) = value {
                payload.insert(key.to_string(), Value::String(v.clone()));
            }
        }

        if let Some(id) = self.license_id.as_deref().filter(|id| !id.is_empty()) {
            payload.insert("license_id".to_string(), Value::String(id.to_string()));
            payload.insert(
                "license_url".to_string(),
                self.license_url
                    .as_deref()
                    .filter(|url| !url.is_empty())
                    .map_or(Value::Null, |url| Value::String(url.to_string())),
            );
        }

        let links = [
            ("issues_url", &self.issues_url),
            ("source_url", &self.source_url),
            ("wiki_url", &self.wiki_url),
            ("discord_url", &self.discord_url),
        ];
        for (key, value) in links {
            if let Some(v) = value {
                let v = if v.is_empty() {
                    Value::Null
                } else {
                    Value::String(v.clone())
                };
                payload.insert(key.to_string(), v);
            }
        }

        if let Some(status) = self.status.filter(ProjectStatus::is_owner_settable) {
            payload.insert(
                "status".to_string(),
                Value::String(status.as_str().to_string()),
            );
        }

        payload
    }

    pub fn is_empty(&self) -> bool {
        self.to_payload().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct VersionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_versions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<ProjectDependency>>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ModifyUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Query options sent alongside a gallery image upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryUpload {
    pub featured: bool,
    pub title: Option<String>,
    pub description: Option<String>,
}
