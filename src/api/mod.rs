//! Authenticated client for the order platform REST API.
//!
//! Every request carries `Authorization: Bearer <token>` when the session has
//! a token. A 401 or 403 answer tears the session down on the spot and fails
//! the call with [`ClientError::Unauthorized`]; subscribers of the session are
//! told to redirect to the login page. There is no retry or backoff.

mod dashboard;
pub mod error;
mod orders;
mod payments;
mod products;
mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ClientError, ErrorKind};

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::session::{LogoutReason, SessionContext};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionContext>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("garmentflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientError::request_failed(format!("Invalid API base URL: {}", base_url)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn from_config(config: &ApiConfig, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        Self::new(config.resolved_base_url(), config.timeout(), session)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }
        url
    }

    /// Build a request with the current session's bearer token attached
    fn request(&self, method: Method, path: &[&str]) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and check the status, ending the session on 401/403
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_status(status, &body);
        if err.is_unauthorized() {
            self.session.logout(LogoutReason::Unauthorized);
        } else {
            warn!(status = status.as_u16(), error = %err, "Server returned an error");
        }
        Err(err)
    }

    async fn execute_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.execute(builder).await?;
        response.json::<T>().await.map_err(ClientError::from)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        debug!(path = %path.join("/"), "GET");
        self.execute_json(self.request(Method::GET, path).query(query))
            .await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path = %path.join("/"), "POST");
        self.execute_json(self.request(Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path = %path.join("/"), "PATCH");
        self.execute_json(self.request(Method::PATCH, path).json(body))
            .await
    }

    /// POST where only the status matters
    pub(crate) async fn post_ack<B: Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<(), ClientError> {
        debug!(path = %path.join("/"), "POST");
        self.execute(self.request(Method::POST, path).json(body))
            .await
            .map(|_| ())
    }

    /// PATCH where only the status matters
    pub(crate) async fn patch_ack<B: Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<(), ClientError> {
        debug!(path = %path.join("/"), "PATCH");
        self.execute(self.request(Method::PATCH, path).json(body))
            .await
            .map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &[&str]) -> Result<(), ClientError> {
        debug!(path = %path.join("/"), "DELETE");
        self.execute(self.request(Method::DELETE, path))
            .await
            .map(|_| ())
    }
}
