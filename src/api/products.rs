use tracing::instrument;

use super::{ApiClient, ClientError};
use crate::forms;
use crate::models::{Product, ProductFilter, ProductInput, ProductPage};

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowOnHome {
    show_on_home: bool,
}

impl ApiClient {
    /// One page of the public catalogue
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, ClientError> {
        self.get(&["products"], &filter.query_pairs()).await
    }

    /// Products flagged for the home page
    #[instrument(skip(self))]
    pub async fn home_products(&self) -> Result<Vec<Product>, ClientError> {
        self.get(&["products", "home"], &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Product, ClientError> {
        self.get(&["products", id], &[]).await
    }

    /// Products owned by one manager
    #[instrument(skip(self))]
    pub async fn manager_products(&self, manager_email: &str) -> Result<Vec<Product>, ClientError> {
        self.get(
            &["products", "manager"],
            &[("email", manager_email.to_string())],
        )
        .await
    }

    /// Runs the product form checks before anything is sent
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        forms::validate_product(input)?;
        self.post(&["products"], input).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, ClientError> {
        forms::validate_product(input)?;
        self.patch(&["products", id], input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&["products", id]).await
    }

    #[instrument(skip(self))]
    pub async fn set_show_on_home(&self, id: &str, show_on_home: bool) -> Result<(), ClientError> {
        self.patch_ack(
            &["products", id, "show-on-home"],
            &ShowOnHome { show_on_home },
        )
        .await
    }
}
