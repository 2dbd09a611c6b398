use crate::domain::error::RinthError;
use crate::infrastructure::config::Config;
use crate::infrastructure::network::client::ApiClient;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, RinthError> {
        let token = config.resolve_token();
        let api = ApiClient::new(&config.api, token.as_deref())?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            api,
        })
    }
}
