use crate::domain::error::RinthError;
use crate::domain::model::{
    Notification, NotificationFilter, Outcome, PayoutHistory, Project, ProjectDependency,
    ProjectMember, User, UserSearchResult, Version,
};
use crate::domain::patch::{GalleryUpload, ModifyUser, ProjectPatch, VersionPatch};
use crate::domain::traits::DashboardSource;
use crate::infrastructure::config::ApiConfig;
use crate::infrastructure::network::http::{
    create_client, file_extension, image_content_type, is_route_missing, normalize_authorization,
};
use crate::infrastructure::session::{OptionalRoute, Session};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use urlencoding::encode;

const SELF_KEY: &str = "me";

/// Gateway to the Modrinth REST API.
///
/// Cloning is cheap and every clone shares the same `Session`, so the caches
/// and route facts live exactly as long as the process keeps a client around.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    base_url_v3: String,
    authorization: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(api: &ApiConfig, token: Option<&str>) -> Result<Self, RinthError> {
        Ok(Self::with_client(create_client(api)?, api, token))
    }

    pub fn with_client(http: Client, api: &ApiConfig, token: Option<&str>) -> Self {
        Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            base_url_v3: api.base_url_v3.trim_end_matches('/').to_string(),
            authorization: normalize_authorization(token.unwrap_or("")),
            session: Arc::new(Session::new(Duration::from_millis(api.cache_ttl_ms))),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        !self.authorization.is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_v3(&self, path: &str) -> String {
        format!("{}{}", self.base_url_v3, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");
        if self.authorization.is_empty() {
            builder
        } else {
            builder.header(AUTHORIZATION, &self.authorization)
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, RinthError> {
        let response = builder.send().await?;
        ensure_success(response, what).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, RinthError> {
        let response = self.send(self.request(Method::GET, url), what).await?;
        Ok(response.json::<T>().await?)
    }

    // --- Profiles ---

    /// The token owner's profile, refreshed through `/user/{id}`.
    ///
    /// `/user/{id}` may drop private fields, so the payout block from `/user`
    /// survives when the refresh lacks one. If the refresh fails the `/user`
    /// payload is returned as is.
    pub async fn fetch_current_user(&self) -> Result<User, RinthError> {
        let this = self.clone();
        self.session
            .current_user
            .get_or_fetch(SELF_KEY, move || async move { this.load_current_user().await })
            .await
    }

    async fn load_current_user(&self) -> Result<User, RinthError> {
        let me: User = self.get_json(&self.url("/user"), "fetch user").await?;
        debug!(
            id = %me.id,
            username = %me.username,
            has_payout_data = me.payout_data.is_present(),
            "GET /user"
        );

        let response = match self
            .request(Method::GET, &self.url(&format!("/user/{}", encode(&me.id))))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "GET /user/{{id}} failed, keeping /user payload");
                return Ok(me);
            }
        };
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "GET /user/{{id}} non-OK, keeping /user payload");
            return Ok(me);
        }

        match response.json::<User>().await {
            Ok(full) => {
                debug!(has_payout_data = full.payout_data.is_present(), "GET /user/{{id}}");
                Ok(me.refreshed_with(full))
            }
            Err(e) => {
                debug!(error = %e, "GET /user/{{id}} unreadable, keeping /user payload");
                Ok(me)
            }
        }
    }

    /// Profile by id. Non-success answers are returned as `Outcome::Status`.
    pub async fn fetch_user_by_id_with_status(
        &self,
        user_id: &str,
    ) -> Result<Outcome<User>, RinthError> {
        let this = self.clone();
        let url = self.url(&format!("/user/{}", encode(user_id)));
        self.session
            .users
            .get_or_fetch(user_id, move || async move {
                let response = this.request(Method::GET, &url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    debug!(status = status.as_u16(), %url, "profile fetch non-OK");
                    return Ok(Outcome::Status(status.as_u16()));
                }
                Ok(Outcome::Found(response.json::<User>().await?))
            })
            .await
    }

    pub async fn fetch_user_projects(&self, user_id: &str) -> Result<Vec<Project>, RinthError> {
        let this = self.clone();
        let url = self.url(&format!("/user/{}/projects", encode(user_id)));
        self.session
            .user_projects
            .get_or_fetch(user_id, move || async move {
                this.get_json(&url, "fetch projects").await
            })
            .await
    }

    pub async fn modify_user(&self, user_id: &str, data: &ModifyUser) -> Result<(), RinthError> {
        let url = self.url(&format!("/user/{}", encode(user_id)));
        self.send(
            self.request(Method::PATCH, &url).json(data),
            "update profile",
        )
        .await?;
        Ok(())
    }

    /// Exact-username lookup. Any failure reads as "no match".
    pub async fn search_user(&self, username: &str) -> Vec<UserSearchResult> {
        let username = username.trim();
        if username.is_empty() {
            return Vec::new();
        }

        let url = self.url(&format!("/user/{}", encode(username)));
        let response = match self.request(Method::GET, &url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, username, "user search failed");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            return Vec::new();
        }

        match response.json::<User>().await {
            Ok(user) => vec![UserSearchResult::from(user)],
            Err(e) => {
                warn!(error = %e, username, "user search returned an unreadable profile");
                Vec::new()
            }
        }
    }

    // --- Payouts ---

    /// Raw v3 balance snapshot.
    ///
    /// Once the deployment reports the route as nonexistent, or the resource
    /// as 404, later calls answer from the session without a request.
    pub async fn fetch_payout_balance(&self) -> Result<Outcome<Value>, RinthError> {
        let route = OptionalRoute::PayoutBalance;
        if let Some(known) = self.known_outcome(route, SELF_KEY) {
            return Ok(known);
        }

        let this = self.clone();
        let url = self.url_v3("/payout/balance");
        self.session
            .payout_balance
            .get_or_fetch(SELF_KEY, move || async move {
                this.load_optional::<Value>(route, SELF_KEY, &url).await
            })
            .await
    }

    /// v2 payout history for a user. Same route handling as the balance.
    pub async fn fetch_payout_history(
        &self,
        user_id: &str,
    ) -> Result<Outcome<PayoutHistory>, RinthError> {
        let route = OptionalRoute::PayoutHistory;
        if let Some(known) = self.known_outcome(route, user_id) {
            return Ok(known);
        }

        let this = self.clone();
        let key = user_id.to_string();
        let url = self.url(&format!("/user/{}/payouts", encode(user_id)));
        self.session
            .payout_history
            .get_or_fetch(user_id, move || async move {
                this.load_optional::<PayoutHistory>(route, &key, &url).await
            })
            .await
    }

    fn known_outcome<T>(&self, route: OptionalRoute, key: &str) -> Option<Outcome<T>> {
        if self.session.is_route_missing(route) {
            return Some(Outcome::RouteMissing);
        }
        if self.session.is_unavailable(route, key) {
            return Some(Outcome::Status(404));
        }
        None
    }

    async fn load_optional<T: DeserializeOwned>(
        &self,
        route: OptionalRoute,
        key: &str,
        url: &str,
    ) -> Result<Outcome<T>, RinthError> {
        let response = self.request(Method::GET, url).send().await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%route, status, body = %preview(&body), "non-OK answer");

            if is_route_missing(status, &body) {
                self.session.mark_route_missing(route);
                return Ok(Outcome::RouteMissing);
            }
            if status == 404 {
                self.session.mark_unavailable(route, key);
            }
            return Ok(Outcome::Status(status));
        }

        let data = response.json::<T>().await?;
        debug!(%route, status, "OK");
        Ok(Outcome::Found(data))
    }

    // --- Projects ---

    pub async fn fetch_project(&self, project_id: &str) -> Result<Project, RinthError> {
        self.get_json(&self.url(&format!("/project/{}", encode(project_id))), "fetch project")
            .await
    }

    /// Several projects in one request. A non-success answer yields nothing.
    pub async fn get_projects(&self, ids: &[String]) -> Result<Vec<Project>, RinthError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids_param = serde_json::to_string(ids)?;
        let response = self
            .request(Method::GET, &self.url("/projects"))
            .query(&[("ids", ids_param)])
            .send()
            .await?;
        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "bulk project fetch failed");
            return Ok(Vec::new());
        }
        Ok(response.json().await?)
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> Result<(), RinthError> {
        let url = self.url(&format!("/project/{}", encode(project_id)));
        self.send(
            self.request(Method::PATCH, &url).json(&patch.to_payload()),
            "update project",
        )
        .await?;
        Ok(())
    }

    // --- Icon & Gallery ---

    pub async fn change_project_icon(&self, project_id: &str, file: &Path) -> Result<(), RinthError> {
        let bytes = tokio::fs::read(file).await?;
        let ext = file_extension(file).unwrap_or_else(|| "png".to_string());
        let url = self.url(&format!("/project/{}/icon", encode(project_id)));
        self.send(
            self.request(Method::PATCH, &url)
                .query(&[("ext", ext.as_str())])
                .header(CONTENT_TYPE, image_content_type(&ext))
                .body(bytes),
            "upload icon",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_project_icon(&self, project_id: &str) -> Result<(), RinthError> {
        let url = self.url(&format!("/project/{}/icon", encode(project_id)));
        self.send(self.request(Method::DELETE, &url), "delete icon")
            .await?;
        Ok(())
    }

    pub async fn add_gallery_image(
        &self,
        project_id: &str,
        file: &Path,
        upload: &GalleryUpload,
    ) -> Result<(), RinthError> {
        let bytes = tokio::fs::read(file).await?;
        let ext = file_extension(file).unwrap_or_else(|| "png".to_string());

        let mut query = vec![
            ("ext", ext.clone()),
            ("featured", upload.featured.to_string()),
        ];
        if let Some(title) = upload.title.as_ref().filter(|t| !t.is_empty()) {
            query.push(("title", title.clone()));
        }
        if let Some(desc) = upload.description.as_ref().filter(|d| !d.is_empty()) {
            query.push(("description", desc.clone()));
        }

        let url = self.url(&format!("/project/{}/gallery", encode(project_id)));
        self.send(
            self.request(Method::POST, &url)
                .query(&query)
                .header(CONTENT_TYPE, image_content_type(&ext))
                .body(bytes),
            "upload gallery image",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_gallery_image(
        &self,
        project_id: &str,
        image_url: &str,
    ) -> Result<(), RinthError> {
        let url = self.url(&format!("/project/{}/gallery", encode(project_id)));
        self.send(
            self.request(Method::DELETE, &url)
                .query(&[("url", image_url)]),
            "delete image",
        )
        .await?;
        Ok(())
    }

    // --- Versions ---

    pub async fn fetch_project_versions(&self, project: &str) -> Result<Vec<Version>, RinthError> {
        self.get_json(&self.url(&format!("/project/{}/version", encode(project))), "fetch versions")
            .await
    }

    /// Dependencies of the newest version, with titles and icons filled in
    /// from the referenced projects.
    pub async fn fetch_project_dependencies(
        &self,
        project_id: &str,
    ) -> Result<Vec<ProjectDependency>, RinthError> {
        let url = self.url(&format!("/project/{}/version", encode(project_id)));
        let response = self.request(Method::GET, &url).send().await?;
        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let versions: Vec<Version> = response.json().await?;
        let Some(latest) = versions.into_iter().next() else {
            return Ok(Vec::new());
        };
        let dependencies = latest.dependencies;

        let project_ids: Vec<String> = dependencies
            .iter()
            .filter_map(|d| d.project_id.clone())
            .collect();
        if project_ids.is_empty() {
            return Ok(dependencies);
        }

        match self.get_projects(&project_ids).await {
            Ok(projects) => Ok(enrich_dependencies(dependencies, &projects)),
            Err(e) => {
                warn!(error = %e, "failed to fetch dependency details");
                Ok(dependencies)
            }
        }
    }

    pub async fn modify_version(&self, version_id: &str, patch: &VersionPatch) -> Result<(), RinthError> {
        let url = self.url(&format!("/version/{}", encode(version_id)));
        self.send(
            self.request(Method::PATCH, &url).json(patch),
            "modify version",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_version(&self, version_id: &str) -> Result<(), RinthError> {
        let url = self.url(&format!("/version/{}", encode(version_id)));
        self.send(self.request(Method::DELETE, &url), "delete version")
            .await?;
        Ok(())
    }

    // --- Team members ---

    pub async fn fetch_project_members(&self, project: &str) -> Result<Vec<ProjectMember>, RinthError> {
        self.get_json(&self.url(&format!("/project/{}/members", encode(project))), "fetch members")
            .await
    }

    /// Invite a user to a team as a contributor.
    pub async fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<(), RinthError> {
        let url = self.url(&format!("/team/{}/members", encode(team_id)));
        self.send(
            self.request(Method::POST, &url)
                .json(&json!({ "user_id": user_id, "role": "Contributor" })),
            "invite member",
        )
        .await?;
        Ok(())
    }

    pub async fn update_team_member(
        &self,
        team_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<(), RinthError> {
        let url = self.url(&format!("/team/{}/members/{}", encode(team_id), encode(user_id)));
        self.send(
            self.request(Method::PATCH, &url).json(&json!({ "role": role })),
            "update member",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_team_member(&self, team_id: &str, user_id: &str) -> Result<(), RinthError> {
        let url = self.url(&format!("/team/{}/members/{}", encode(team_id), encode(user_id)));
        self.send(self.request(Method::DELETE, &url), "remove member")
            .await?;
        Ok(())
    }

    // --- Notifications ---

    pub async fn fetch_notifications(
        &self,
        user_id: &str,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, RinthError> {
        let url = self.url(&format!("/user/{}/notifications", encode(user_id)));
        let response = self
            .send(
                self.request(Method::GET, &url)
                    .query(&[("status", filter.as_str())]),
                "fetch notifications",
            )
            .await?;
        Ok(response.json().await?)
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), RinthError> {
        let url = self.url(&format!("/notification/{}", encode(notification_id)));
        self.send(
            self.request(Method::PATCH, &url).json(&json!({ "read": true })),
            "read notification",
        )
        .await?;
        Ok(())
    }

    /// One PATCH per notification, issued concurrently.
    pub async fn mark_notifications_read(&self, ids: &[String]) -> Result<(), RinthError> {
        if ids.is_empty() {
            return Ok(());
        }
        try_join_all(ids.iter().map(|id| self.mark_notification_read(id))).await?;
        Ok(())
    }

    /// Deleting an already deleted notification succeeds.
    pub async fn delete_notification(&self, notification_id: &str) -> Result<(), RinthError> {
        let url = self.url(&format!("/notification/{}", encode(notification_id)));
        let response = self.request(Method::DELETE, &url).send().await?;
        if response.status().as_u16() == 404 {
            return Ok(());
        }
        ensure_success(response, "delete notification").await?;
        Ok(())
    }
}

#[async_trait]
impl DashboardSource for ApiClient {
    async fn current_user(&self) -> Result<User, RinthError> {
        self.fetch_current_user().await
    }

    async fn user_by_id(&self, user_id: &str) -> Result<Outcome<User>, RinthError> {
        self.fetch_user_by_id_with_status(user_id).await
    }

    async fn user_projects(&self, user_id: &str) -> Result<Vec<Project>, RinthError> {
        self.fetch_user_projects(user_id).await
    }

    async fn payout_balance(&self) -> Result<Outcome<Value>, RinthError> {
        self.fetch_payout_balance().await
    }

    async fn payout_history(&self, user_id: &str) -> Result<Outcome<PayoutHistory>, RinthError> {
        self.fetch_payout_history(user_id).await
    }
}

/// Fill dependency titles and icons from the projects they reference.
pub fn enrich_dependencies(
    dependencies: Vec<ProjectDependency>,
    projects: &[Project],
) -> Vec<ProjectDependency> {
    dependencies
        .into_iter()
        .map(|mut dep| {
            let project = dep
                .project_id
                .as_deref()
                .and_then(|id| projects.iter().find(|p| p.id == id));
            dep.title = project.map(|p| p.title.clone());
            dep.icon_url = project.and_then(|p| p.icon_url.clone());
            dep
        })
        .collect()
}

async fn ensure_success(response: Response, what: &str) -> Result<Response, RinthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %preview(&body), "{} failed", what);
    Err(RinthError::Status {
        status: status.as_u16(),
        body,
    })
}

fn preview(text: &str) -> &str {
    text.char_indices()
        .nth(400)
        .map_or(text, |(idx, _)| &text[..idx])
}
