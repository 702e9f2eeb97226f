//! Navigation targets of the portal and how a session resolves them.

mod guard;

pub use guard::{Gate, Guard, GuardDecision};

use serde::Serialize;

use crate::models::Role;
use crate::session::SessionState;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", content = "id", rename_all = "kebab-case")]
pub enum Route {
    Home,
    Products,
    ProductDetail(String),
    Booking(String),
    PaymentSuccess,
    Login,
    Register,
    Contact,
    About,
    Dashboard,
    // admin
    ManageUsers,
    AllProducts,
    AllOrders,
    // manager
    AddProduct,
    ManageProducts,
    PendingOrders,
    ApprovedOrders,
    // buyer
    MyOrders,
    TrackOrder(String),
    Profile,
}

/// Who may open a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any logged-in user
    Private,
    Guarded(Guard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    /// Session still loading; show a placeholder
    Pending,
    Forbidden(Route),
    RedirectToLogin { return_to: String },
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["products"] | ["all-products"] => Route::Products,
            ["products", id] | ["product-details", id] => Route::ProductDetail(id.to_string()),
            ["booking", id] => Route::Booking(id.to_string()),
            ["payment-success"] => Route::PaymentSuccess,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["contact"] => Route::Contact,
            ["about"] => Route::About,
            ["dashboard"] => Route::Dashboard,
            ["dashboard", "manage-users"] => Route::ManageUsers,
            ["dashboard", "all-products"] => Route::AllProducts,
            ["dashboard", "all-orders"] => Route::AllOrders,
            ["dashboard", "add-product"] => Route::AddProduct,
            ["dashboard", "manage-products"] => Route::ManageProducts,
            ["dashboard", "pending-orders"] => Route::PendingOrders,
            ["dashboard", "approved-orders"] => Route::ApprovedOrders,
            ["dashboard", "my-orders"] => Route::MyOrders,
            ["dashboard", "track-order", id] => Route::TrackOrder(id.to_string()),
            ["dashboard", "profile"] => Route::Profile,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Products => "/products".to_string(),
            Route::ProductDetail(id) => format!("/products/{}", id),
            Route::Booking(id) => format!("/booking/{}", id),
            Route::PaymentSuccess => "/payment-success".to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => "/register".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::About => "/about".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::ManageUsers => "/dashboard/manage-users".to_string(),
            Route::AllProducts => "/dashboard/all-products".to_string(),
            Route::AllOrders => "/dashboard/all-orders".to_string(),
            Route::AddProduct => "/dashboard/add-product".to_string(),
            Route::ManageProducts => "/dashboard/manage-products".to_string(),
            Route::PendingOrders => "/dashboard/pending-orders".to_string(),
            Route::ApprovedOrders => "/dashboard/approved-orders".to_string(),
            Route::MyOrders => "/dashboard/my-orders".to_string(),
            Route::TrackOrder(id) => format!("/dashboard/track-order/{}", id),
            Route::Profile => "/dashboard/profile".to_string(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home
            | Route::Products
            | Route::Login
            | Route::Register
            | Route::Contact
            | Route::About => Access::Public,
            Route::ProductDetail(_)
            | Route::Booking(_)
            | Route::PaymentSuccess
            | Route::Dashboard
            | Route::Profile => Access::Private,
            Route::ManageUsers | Route::AllProducts | Route::AllOrders => {
                Access::Guarded(Guard::AdminOnly)
            }
            Route::AddProduct
            | Route::ManageProducts
            | Route::PendingOrders
            | Route::ApprovedOrders => Access::Guarded(Guard::ManagerOrAdmin),
            Route::MyOrders | Route::TrackOrder(_) => Access::Guarded(Guard::BuyerOnly),
        }
    }

    /// Decide what the session sees for this route, evaluated fresh each call
    pub fn resolve(self, state: SessionState) -> Resolution {
        match (self.access(), state) {
            (Access::Public, _) => Resolution::Render(self),
            (_, SessionState::Loading) => Resolution::Pending,
            (_, SessionState::Anonymous) => Resolution::RedirectToLogin {
                return_to: self.path(),
            },
            (Access::Private, SessionState::Authenticated(_)) => Resolution::Render(self),
            (Access::Guarded(guard), state) => match guard.evaluate(state) {
                GuardDecision::Authorized => Resolution::Render(self),
                GuardDecision::Pending => Resolution::Pending,
                GuardDecision::Forbidden => Resolution::Forbidden(self),
            },
        }
    }
}

/// Resolve a raw path against the session
pub fn resolve(path: &str, state: SessionState) -> Resolution {
    match Route::parse(path) {
        Some(route) => route.resolve(state),
        None => Resolution::NotFound,
    }
}

/// Dashboard entries shown in the side menu for a role
pub fn dashboard_menu(state: SessionState) -> Vec<Route> {
    let role = match state {
        SessionState::Authenticated(role) => role,
        SessionState::Loading | SessionState::Anonymous => return Vec::new(),
    };
    match role {
        Role::Admin => vec![Route::ManageUsers, Route::AllProducts, Route::AllOrders],
        Role::Manager => vec![
            Route::AddProduct,
            Route::ManageProducts,
            Route::PendingOrders,
            Route::ApprovedOrders,
            Route::Profile,
        ],
        Role::Buyer => vec![Route::MyOrders, Route::Profile],
    }
}
