use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{ApiClient, ClientError};
use crate::forms;
use crate::models::{Role, User, UserFilter, UserStatusUpdate};
use crate::session::LogoutReason;

#[derive(Serialize)]
struct RoleUpdate {
    role: Role,
}

impl ApiClient {
    /// Profile of the token's owner
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.get(&["users", "me"], &[]).await
    }

    /// Resolve the profile for the session's token and finish loading.
    ///
    /// Returns `None` for an anonymous session, or when the session moved on
    /// to another token before the profile arrived. Any failure ends the
    /// session so it never stays loading.
    pub async fn restore_session(&self) -> Result<Option<User>, ClientError> {
        let Some(token) = self.session().token() else {
            return Ok(None);
        };

        let user = match self.current_user().await {
            Ok(user) => user,
            Err(err) => {
                // 401/403 already ended the session
                if !err.is_unauthorized() && self.session().end(&token, LogoutReason::ProfileUnavailable) {
                    warn!(error = %err, "Could not load the profile");
                }
                return Err(err);
            }
        };

        if !self.session().establish(&token, user.clone()) {
            return Ok(None);
        }
        info!(email = %user.email, "Session restored");
        Ok(Some(user))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, ClientError> {
        self.get(&["users"], &filter.query_pairs()).await
    }

    #[instrument(skip(self))]
    pub async fn update_role(&self, id: &str, role: Role) -> Result<(), ClientError> {
        self.patch_ack(&["users", id, "role"], &RoleUpdate { role })
            .await
    }

    /// Suspend with the reason and feedback shown to the user
    #[instrument(skip(self, feedback))]
    pub async fn suspend_user(&self, id: &str, reason: &str, feedback: &str) -> Result<(), ClientError> {
        forms::validate_suspension(reason, feedback)?;
        self.update_status(id, &UserStatusUpdate::suspend(reason.trim(), feedback.trim()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn activate_user(&self, id: &str) -> Result<(), ClientError> {
        self.update_status(id, &UserStatusUpdate::activate()).await
    }

    async fn update_status(&self, id: &str, update: &UserStatusUpdate) -> Result<(), ClientError> {
        self.patch_ack(&["users", id, "status"], update)
            .await
    }
}
