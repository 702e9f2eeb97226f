use tracing::instrument;

use super::{ApiClient, ClientError};
use crate::models::{DashboardStats, Role};

impl ApiClient {
    /// Counters for the given role's dashboard home
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self, role: Role) -> Result<DashboardStats, ClientError> {
        self.get(&["dashboard", role.as_str(), "stats"], &[]).await
    }
}
