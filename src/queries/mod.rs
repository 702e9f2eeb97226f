//! Cached reads and invalidating writes over the API client.
//!
//! Reads go through the query cache keyed by resource name and parameters.
//! Writes run through [`QueryCache::mutate`], which drops the affected
//! resources once the server accepted the change, so open live queries
//! refetch.

use tracing::{info, instrument};

use crate::api::ClientError;
use crate::cache::{LiveQuery, QueryKey};
use crate::forms::{self, BookingForm};
use crate::models::{
    CheckoutRequest, CheckoutSession, DashboardStats, Order, OrderStatus, PaymentConfirmation,
    Product, ProductFilter, ProductInput, ProductPage, Role, TrackingEvent, User, UserFilter,
};
use crate::session::LogoutReason;
use crate::tracking::Timeline;
use crate::Portal;

pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";
pub const USERS: &str = "users";
pub const DASHBOARD: &str = "dashboard";

/// Outcome of submitting the booking form
#[derive(Debug, Clone, PartialEq)]
pub enum Booking {
    /// Cash on delivery: the order exists now
    Placed(Order),
    /// Pay first: the order is created once the payment is confirmed
    Checkout(CheckoutSession),
}

impl Portal {
    /// Resolve the profile behind the token, finishing the loading state.
    ///
    /// Cached results belong to whoever was logged in before and are dropped.
    pub async fn restore_session(&self) -> Result<Option<User>, ClientError> {
        self.cache.clear();
        self.client.restore_session().await
    }

    /// Start a session with a freshly issued token
    pub async fn login(&self, token: impl Into<String>) -> Result<User, ClientError> {
        self.session.begin(token);
        self.restore_session()
            .await?
            .ok_or(ClientError::Unauthorized { status: 401 })
    }

    /// User-requested logout; cached data of the old session is dropped
    pub fn logout(&self) {
        self.session.logout(LogoutReason::UserRequested);
        self.cache.clear();
    }

    fn require_email(&self) -> Result<String, ClientError> {
        self.session
            .email()
            .ok_or(ClientError::Unauthorized { status: 401 })
    }

    fn require_role(&self) -> Result<Role, ClientError> {
        self.session
            .role()
            .ok_or(ClientError::Unauthorized { status: 401 })
    }

    // Reads

    pub async fn products(&self, filter: &ProductFilter) -> Result<ProductPage, ClientError> {
        let client = self.client.clone();
        let filter = filter.clone();
        let key = QueryKey::new(PRODUCTS).with_all(filter.key_params());
        self.cache
            .query(key, move || async move { client.list_products(&filter).await })
            .await
    }

    /// Product listing that refetches whenever products are invalidated
    pub fn live_products(&self, filter: &ProductFilter) -> LiveQuery<ProductPage> {
        let client = self.client.clone();
        let filter = filter.clone();
        let key = QueryKey::new(PRODUCTS).with_all(filter.key_params());
        LiveQuery::new(self.cache.clone(), key, move || {
            let client = client.clone();
            let filter = filter.clone();
            async move { client.list_products(&filter).await }
        })
    }

    pub async fn home_products(&self) -> Result<Vec<Product>, ClientError> {
        let client = self.client.clone();
        self.cache
            .query(QueryKey::new(PRODUCTS).with("home"), move || async move {
                client.home_products().await
            })
            .await
    }

    pub async fn product(&self, id: &str) -> Result<Product, ClientError> {
        let client = self.client.clone();
        let id = id.to_string();
        self.cache
            .query(
                QueryKey::new(PRODUCTS).with("detail").with(&id),
                move || async move { client.get_product(&id).await },
            )
            .await
    }

    /// Products owned by the logged-in manager
    pub async fn my_products(&self) -> Result<Vec<Product>, ClientError> {
        let email = self.require_email()?;
        let client = self.client.clone();
        self.cache
            .query(
                QueryKey::new(PRODUCTS).with("manager").with(&email),
                move || async move { client.manager_products(&email).await },
            )
            .await
    }

    pub async fn my_orders(&self) -> Result<Vec<Order>, ClientError> {
        let email = self.require_email()?;
        let client = self.client.clone();
        self.cache
            .query(
                QueryKey::new(ORDERS).with("mine").with(&email),
                move || async move { client.my_orders(&email).await },
            )
            .await
    }

    pub async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, ClientError> {
        let client = self.client.clone();
        let key = QueryKey::new(ORDERS)
            .with("all")
            .with(status.map_or("any", |s| s.as_str()));
        self.cache
            .query(key, move || async move { client.list_orders(status).await })
            .await
    }

    pub async fn order(&self, id: &str) -> Result<Order, ClientError> {
        let client = self.client.clone();
        let id = id.to_string();
        self.cache
            .query(
                QueryKey::new(ORDERS).with("detail").with(&id),
                move || async move { client.get_order(&id).await },
            )
            .await
    }

    /// Merged status and tracking feed of one order
    pub async fn timeline(&self, order_id: &str) -> Result<Timeline, ClientError> {
        let order = self.order(order_id).await?;
        Ok(Timeline::from_order(&order))
    }

    pub async fn users(&self, filter: &UserFilter) -> Result<Vec<User>, ClientError> {
        let client = self.client.clone();
        let filter = filter.clone();
        let key = QueryKey::new(USERS).with_all(filter.key_params());
        self.cache
            .query(key, move || async move { client.list_users(&filter).await })
            .await
    }

    /// Statistics for the logged-in user's role
    pub async fn dashboard(&self) -> Result<DashboardStats, ClientError> {
        let role = self.require_role()?;
        let client = self.client.clone();
        self.cache
            .query(QueryKey::new(DASHBOARD).with(role), move || async move {
                client.dashboard_stats(role).await
            })
            .await
    }

    // Writes

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        self.cache
            .mutate(&[PRODUCTS, DASHBOARD], self.client.create_product(input))
            .await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, ClientError> {
        self.cache
            .mutate(&[PRODUCTS], self.client.update_product(id, input))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        self.cache
            .mutate(&[PRODUCTS, DASHBOARD], self.client.delete_product(id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_show_on_home(&self, id: &str, show_on_home: bool) -> Result<(), ClientError> {
        self.cache
            .mutate(&[PRODUCTS], self.client.set_show_on_home(id, show_on_home))
            .await
    }

    /// Submit the booking form for a product.
    ///
    /// Pay-first products open a checkout session instead of creating the
    /// order; [`Portal::confirm_payment`] finishes those.
    #[instrument(skip(self, form))]
    pub async fn book(&self, product_id: &str, form: &BookingForm) -> Result<Booking, ClientError> {
        let email = self.require_email()?;
        let product = self.product(product_id).await?;
        let order = forms::build_order(form, &product, &email)?;

        if forms::needs_checkout(&order) {
            let request = CheckoutRequest {
                product_id: order.product_id.clone(),
                product_name: order.product_name.clone(),
                buyer_email: order.buyer_email.clone(),
                quantity: order.quantity,
                order_price: order.order_price,
            };
            let session = self.client.create_checkout_session(&request).await?;
            info!(product = %product.id, "Checkout session opened");
            return Ok(Booking::Checkout(session));
        }

        let placed = self
            .cache
            .mutate(&[ORDERS, PRODUCTS, DASHBOARD], self.client.create_order(&order))
            .await?;
        info!(order = %placed.id, tracking = %placed.tracking_id, "Order placed");
        Ok(Booking::Placed(placed))
    }

    pub async fn confirm_payment(&self, session_id: &str) -> Result<PaymentConfirmation, ClientError> {
        self.cache
            .mutate(
                &[ORDERS, PRODUCTS, DASHBOARD],
                self.client.confirm_payment(session_id),
            )
            .await
    }

    pub async fn approve_order(&self, id: &str) -> Result<(), ClientError> {
        self.cache
            .mutate(&[ORDERS, DASHBOARD], self.client.approve_order(id))
            .await
    }

    pub async fn reject_order(&self, id: &str) -> Result<(), ClientError> {
        self.cache
            .mutate(&[ORDERS, DASHBOARD], self.client.reject_order(id))
            .await
    }

    pub async fn add_tracking(&self, id: &str, event: &TrackingEvent) -> Result<(), ClientError> {
        self.cache
            .mutate(&[ORDERS], self.client.add_tracking(id, event))
            .await
    }

    pub async fn cancel_order(&self, id: &str) -> Result<(), ClientError> {
        self.cache
            .mutate(&[ORDERS, DASHBOARD], self.client.cancel_order(id))
            .await
    }

    pub async fn update_role(&self, user_id: &str, role: Role) -> Result<(), ClientError> {
        self.cache
            .mutate(&[USERS, DASHBOARD], self.client.update_role(user_id, role))
            .await
    }

    pub async fn suspend_user(&self, user_id: &str, reason: &str, feedback: &str) -> Result<(), ClientError> {
        self.cache
            .mutate(&[USERS], self.client.suspend_user(user_id, reason, feedback))
            .await
    }

    pub async fn activate_user(&self, user_id: &str) -> Result<(), ClientError> {
        self.cache
            .mutate(&[USERS], self.client.activate_user(user_id))
            .await
    }
}
