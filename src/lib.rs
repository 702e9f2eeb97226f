pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod forms;
pub mod models;
pub mod queries;
pub mod routes;
pub mod session;
pub mod theme;
pub mod tracking;

use std::sync::Arc;

use crate::api::{ApiClient, ClientError};
use crate::cache::QueryCache;
use crate::config::Config;
use crate::session::SessionContext;
use crate::theme::{PreferenceStore, ThemeContext};

/// Everything a front end needs to talk to the platform
pub struct Portal {
    pub config: Config,
    pub session: Arc<SessionContext>,
    pub client: ApiClient,
    pub cache: Arc<QueryCache>,
    pub theme: ThemeContext,
}

impl Portal {
    /// Wire up the session, client, cache and theme from configuration.
    ///
    /// With a token the session starts in the loading state until
    /// [`Portal::restore_session`] resolves the profile.
    pub fn new(config: Config, token: Option<String>) -> Result<Self, ClientError> {
        let session = Arc::new(match token {
            Some(token) => SessionContext::with_token(token),
            None => SessionContext::new(),
        });
        let client = ApiClient::from_config(&config.api, session.clone())?;
        let cache = Arc::new(QueryCache::from_config(&config.cache));
        let theme = ThemeContext::load(PreferenceStore::new(&config.storage.state_dir));

        Ok(Self {
            config,
            session,
            client,
            cache,
            theme,
        })
    }
}
