//! In-process stand-in for the platform API, used by client and cache tests.
//!
//! Tokens are fixed: `admin-token`, `manager-token` and `buyer-token` map to
//! the three seeded users; anything else is answered with 401.

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::models::{
    Order, OrderInput, OrderStatus, PaymentOption, PaymentStatus, Product, ProductInput, Role,
    StatusChange, TrackingEvent, User, UserStatus, UserStatusUpdate,
};

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Default)]
struct Data {
    users: Vec<(String, User)>,
    products: Vec<Product>,
    orders: Vec<Order>,
    hits: HashMap<String, usize>,
    tokens: Vec<Option<String>>,
    profile_delays: HashMap<String, Duration>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    data: Arc<Mutex<Data>>,
    product_delay_ms: Arc<AtomicU64>,
}

fn user(id: &str, name: &str, email: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        display_name: name.to_string(),
        email: email.to_string(),
        role,
        status: UserStatus::Active,
        suspend_reason: None,
        suspend_feedback: None,
        photo_url: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    category: &str,
    price: f64,
    available: u32,
    moq: u32,
    payment_option: PaymentOption,
    show_on_home: bool,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} for bulk orders", name),
        category: category.to_string(),
        price,
        available_quantity: available,
        moq,
        images: vec![format!("https://cdn.example.com/{}.jpg", id)],
        demo_video: None,
        payment_option,
        show_on_home,
        manager_email: "manager@example.com".to_string(),
        created_at: Some("2026-02-01T08:00:00Z".to_string()),
    }
}

impl FakeBackend {
    pub(crate) fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut data = backend.data.lock();
            data.users = vec![
                (
                    "admin-token".to_string(),
                    user("u1", "Admin", "admin@example.com", Role::Admin),
                ),
                (
                    "manager-token".to_string(),
                    user("u2", "Manager", "manager@example.com", Role::Manager),
                ),
                (
                    "buyer-token".to_string(),
                    user("u3", "Buyer", "buyer@example.com", Role::Buyer),
                ),
            ];
            data.products = vec![
                product("p1", "Denim Jacket", "Jacket", 42.5, 500, 50, PaymentOption::PayFirst, true),
                product("p2", "Polo Shirt", "Shirt", 8.5, 1000, 100, PaymentOption::PayOnDelivery, true),
                product("p3", "Cargo Pants", "Pants", 15.0, 400, 40, PaymentOption::PayOnDelivery, false),
            ];
            data.orders = vec![Order {
                id: "o1".to_string(),
                tracking_id: "TRK-0001".to_string(),
                buyer_email: "buyer@example.com".to_string(),
                product_id: Some("p2".to_string()),
                product_name: Some("Polo Shirt".to_string()),
                products: Vec::new(),
                quantity: 150,
                order_price: 1275.0,
                payment_option: PaymentOption::PayOnDelivery,
                payment_status: PaymentStatus::Pending,
                status: OrderStatus::Pending,
                status_history: vec![StatusChange {
                    status: "pending".to_string(),
                    date: Some("2026-03-01T09:00:00Z".to_string()),
                }],
                tracking: Vec::new(),
                delivery_address: "Gazipur".to_string(),
                additional_notes: String::new(),
                first_name: Some("Nadia".to_string()),
                last_name: Some("Islam".to_string()),
                contact_number: Some("01711000000".to_string()),
                created_at: Some("2026-03-01T09:00:00Z".to_string()),
            }];
            data.next_id = 100;
        }
        backend
    }

    /// Delay every product listing response
    pub(crate) fn set_product_delay(&self, delay: Duration) {
        self.product_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Delay `/users/me` for one token
    pub(crate) fn set_profile_delay(&self, token: &str, delay: Duration) {
        self.data
            .lock()
            .profile_delays
            .insert(token.to_string(), delay);
    }

    /// Number of requests seen for an exact path
    pub(crate) fn hits(&self, path: &str) -> usize {
        self.data.lock().hits.get(path).copied().unwrap_or(0)
    }

    pub(crate) fn seen_tokens(&self) -> Vec<Option<String>> {
        self.data.lock().tokens.clone()
    }

    pub(crate) fn product_count(&self) -> usize {
        self.data.lock().products.len()
    }

    /// Remove a product behind the client's back
    pub(crate) fn remove_product(&self, id: &str) {
        self.data.lock().products.retain(|p| p.id != id);
    }

    fn caller(&self, headers: &HeaderMap) -> Result<User, (StatusCode, Json<Value>)> {
        let token = bearer(headers).ok_or_else(|| unauthorized("unauthorized access"))?;
        let data = self.data.lock();
        data.users
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, u)| u.clone())
            .ok_or_else(|| unauthorized("unauthorized access"))
    }

    fn require(&self, headers: &HeaderMap, roles: &[Role]) -> Result<User, (StatusCode, Json<Value>)> {
        let user = self.caller(headers)?;
        if roles.contains(&user.role) {
            Ok(user)
        } else {
            Err(error(StatusCode::FORBIDDEN, "forbidden access"))
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut data = self.data.lock();
        data.next_id += 1;
        format!("{}{}", prefix, data.next_id)
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn unauthorized(message: &str) -> (StatusCode, Json<Value>) {
    error(StatusCode::UNAUTHORIZED, message)
}

fn not_found(what: &str) -> (StatusCode, Json<Value>) {
    error(StatusCode::NOT_FOUND, &format!("{} not found", what))
}

fn to_json<T: serde::Serialize>(value: &T) -> Reply {
    Ok(Json(serde_json::to_value(value).unwrap()))
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

async fn record(State(b): State<FakeBackend>, req: Request, next: Next) -> Response {
    {
        let mut data = b.data.lock();
        *data.hits.entry(req.uri().path().to_string()).or_default() += 1;
        data.tokens.push(bearer(req.headers()));
    }
    next.run(req).await
}

#[derive(Deserialize)]
struct ProductQuery {
    page: Option<usize>,
    limit: Option<usize>,
    search: Option<String>,
    category: Option<String>,
}

async fn list_products(State(b): State<FakeBackend>, Query(q): Query<ProductQuery>) -> Reply {
    let delay = b.product_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let data = b.data.lock();
    let matching: Vec<&Product> = data
        .products
        .iter()
        .filter(|p| {
            q.search
                .as_ref()
                .map_or(true, |s| p.name.to_lowercase().contains(&s.to_lowercase()))
        })
        .filter(|p| q.category.as_ref().map_or(true, |c| &p.category == c))
        .collect();
    let limit = q.limit.unwrap_or(9).max(1);
    let page = q.page.unwrap_or(1).max(1);
    let products: Vec<&Product> = matching.iter().skip((page - 1) * limit).take(limit).copied().collect();
    Ok(Json(json!({ "products": products, "total": matching.len() })))
}

async fn home_products(State(b): State<FakeBackend>) -> Reply {
    let data = b.data.lock();
    let home: Vec<&Product> = data.products.iter().filter(|p| p.show_on_home).collect();
    to_json(&home)
}

#[derive(Deserialize)]
struct EmailQuery {
    email: String,
}

async fn manager_products(State(b): State<FakeBackend>, Query(q): Query<EmailQuery>) -> Reply {
    let data = b.data.lock();
    let mine: Vec<&Product> = data
        .products
        .iter()
        .filter(|p| p.manager_email == q.email)
        .collect();
    to_json(&mine)
}

async fn get_product(State(b): State<FakeBackend>, Path(id): Path<String>) -> Reply {
    let data = b.data.lock();
    match data.products.iter().find(|p| p.id == id) {
        Some(p) => to_json(p),
        None => Err(not_found("Product")),
    }
}

async fn create_product(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Json(input): Json<ProductInput>,
) -> Reply {
    let manager = b.require(&headers, &[Role::Manager])?;
    let id = b.next_id("p");
    let product = Product {
        id,
        name: input.name,
        description: input.description,
        category: input.category,
        price: input.price,
        available_quantity: input.available_quantity,
        moq: input.moq,
        images: input.images,
        demo_video: input.demo_video,
        payment_option: input.payment_option,
        show_on_home: input.show_on_home,
        manager_email: manager.email,
        created_at: Some(now()),
    };
    b.data.lock().products.push(product.clone());
    to_json(&product)
}

async fn update_product(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Reply {
    b.require(&headers, &[Role::Manager, Role::Admin])?;
    let mut data = b.data.lock();
    let product = data
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| not_found("Product"))?;
    product.name = input.name;
    product.description = input.description;
    product.category = input.category;
    product.price = input.price;
    product.available_quantity = input.available_quantity;
    product.moq = input.moq;
    product.images = input.images;
    product.demo_video = input.demo_video;
    product.payment_option = input.payment_option;
    product.show_on_home = input.show_on_home;
    to_json(product)
}

async fn delete_product(State(b): State<FakeBackend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.require(&headers, &[Role::Manager, Role::Admin])?;
    let mut data = b.data.lock();
    let before = data.products.len();
    data.products.retain(|p| p.id != id);
    if data.products.len() == before {
        return Err(not_found("Product"));
    }
    Ok(Json(json!({ "deletedCount": 1 })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowOnHomeBody {
    show_on_home: bool,
}

async fn show_on_home(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ShowOnHomeBody>,
) -> Reply {
    b.require(&headers, &[Role::Admin])?;
    let mut data = b.data.lock();
    let product = data
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| not_found("Product"))?;
    product.show_on_home = body.show_on_home;
    Ok(Json(json!({ "modifiedCount": 1 })))
}

async fn me(State(b): State<FakeBackend>, headers: HeaderMap) -> Reply {
    let user = b.caller(&headers)?;
    let delay = bearer(&headers)
        .and_then(|token| b.data.lock().profile_delays.get(&token).copied());
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    to_json(&user)
}

#[derive(Deserialize)]
struct UserQuery {
    search: Option<String>,
    role: Option<Role>,
}

async fn list_users(State(b): State<FakeBackend>, headers: HeaderMap, Query(q): Query<UserQuery>) -> Reply {
    b.require(&headers, &[Role::Admin])?;
    let data = b.data.lock();
    let users: Vec<&User> = data
        .users
        .iter()
        .map(|(_, u)| u)
        .filter(|u| q.role.map_or(true, |r| u.role == r))
        .filter(|u| {
            q.search
                .as_ref()
                .map_or(true, |s| u.email.contains(s.as_str()) || u.display_name.contains(s.as_str()))
        })
        .collect();
    to_json(&users)
}

#[derive(Deserialize)]
struct RoleBody {
    role: Role,
}

async fn update_role(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RoleBody>,
) -> Reply {
    b.require(&headers, &[Role::Admin])?;
    let mut data = b.data.lock();
    let (_, user) = data
        .users
        .iter_mut()
        .find(|(_, u)| u.id == id)
        .ok_or_else(|| not_found("User"))?;
    user.role = body.role;
    Ok(Json(json!({ "modifiedCount": 1 })))
}

async fn update_status(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UserStatusUpdate>,
) -> Reply {
    b.require(&headers, &[Role::Admin])?;
    let mut data = b.data.lock();
    let (_, user) = data
        .users
        .iter_mut()
        .find(|(_, u)| u.id == id)
        .ok_or_else(|| not_found("User"))?;
    user.status = body.status;
    user.suspend_reason = body.suspend_reason;
    user.suspend_feedback = body.suspend_feedback;
    Ok(Json(json!({ "modifiedCount": 1 })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderQuery {
    buyer_email: Option<String>,
    status: Option<OrderStatus>,
}

async fn list_orders(State(b): State<FakeBackend>, headers: HeaderMap, Query(q): Query<OrderQuery>) -> Reply {
    let caller = b.caller(&headers)?;
    let buyer_email = match caller.role {
        Role::Buyer => Some(caller.email),
        _ => q.buyer_email,
    };
    let data = b.data.lock();
    let orders: Vec<&Order> = data
        .orders
        .iter()
        .filter(|o| buyer_email.as_ref().map_or(true, |e| &o.buyer_email == e))
        .filter(|o| q.status.map_or(true, |s| o.status == s))
        .collect();
    to_json(&orders)
}

async fn get_order(State(b): State<FakeBackend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.caller(&headers)?;
    let data = b.data.lock();
    match data.orders.iter().find(|o| o.id == id) {
        Some(o) => to_json(o),
        None => Err(not_found("Order")),
    }
}

async fn create_order(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Json(input): Json<OrderInput>,
) -> Reply {
    b.require(&headers, &[Role::Buyer])?;
    let id = b.next_id("o");
    let created = now();
    let order = Order {
        tracking_id: format!("TRK-{}", id),
        id,
        buyer_email: input.buyer_email,
        product_id: Some(input.product_id),
        product_name: Some(input.product_name),
        products: Vec::new(),
        quantity: input.quantity,
        order_price: input.order_price,
        payment_option: input.payment_option,
        payment_status: PaymentStatus::Pending,
        status: OrderStatus::Pending,
        status_history: vec![StatusChange {
            status: "pending".to_string(),
            date: Some(created.clone()),
        }],
        tracking: Vec::new(),
        delivery_address: input.delivery_address,
        additional_notes: input.additional_notes,
        first_name: Some(input.first_name),
        last_name: Some(input.last_name),
        contact_number: Some(input.contact_number),
        created_at: Some(created),
    };
    b.data.lock().orders.push(order.clone());
    to_json(&order)
}

#[derive(Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn update_order_status(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Reply {
    b.require(&headers, &[Role::Manager, Role::Admin])?;
    let mut data = b.data.lock();
    let order = data
        .orders
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| not_found("Order"))?;
    order.status = body.status;
    order.status_history.push(StatusChange {
        status: body.status.to_string(),
        date: Some(now()),
    });
    Ok(Json(json!({ "modifiedCount": 1 })))
}

async fn add_tracking(
    State(b): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(event): Json<TrackingEvent>,
) -> Reply {
    b.require(&headers, &[Role::Manager, Role::Admin])?;
    let mut data = b.data.lock();
    let order = data
        .orders
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| not_found("Order"))?;
    order.tracking.push(event);
    Ok(Json(json!({ "modifiedCount": 1 })))
}

async fn cancel_order(State(b): State<FakeBackend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.caller(&headers)?;
    let mut data = b.data.lock();
    let order = data
        .orders
        .iter()
        .find(|o| o.id == id)
        .ok_or_else(|| not_found("Order"))?;
    if order.status != OrderStatus::Pending {
        return Err(error(StatusCode::CONFLICT, "Only pending orders can be cancelled"));
    }
    data.orders.retain(|o| o.id != id);
    Ok(Json(json!({ "deletedCount": 1 })))
}

async fn dashboard_stats(State(b): State<FakeBackend>, headers: HeaderMap, Path(role): Path<Role>) -> Reply {
    let caller = b.require(&headers, &[role])?;
    let data = b.data.lock();
    let orders: Vec<&Order> = data
        .orders
        .iter()
        .filter(|o| caller.role != Role::Buyer || o.buyer_email == caller.email)
        .collect();
    let pending = orders.iter().filter(|o| o.status == OrderStatus::Pending).count();
    let mut stats = json!({
        "totalOrders": orders.len(),
        "pendingOrders": pending,
        "chart": [{ "label": "Mar", "value": orders.len() }],
    });
    if caller.role != Role::Buyer {
        stats["totalProducts"] = json!(data.products.len());
    }
    if caller.role == Role::Admin {
        stats["totalUsers"] = json!(data.users.len());
    }
    Ok(Json(stats))
}

async fn checkout(State(b): State<FakeBackend>, headers: HeaderMap) -> Reply {
    b.require(&headers, &[Role::Buyer])?;
    let session_id = b.next_id("cs_");
    Ok(Json(json!({
        "url": format!("https://checkout.example.com/pay/{}", session_id),
        "sessionId": session_id,
    })))
}

#[derive(Deserialize)]
struct PaymentQuery {
    session_id: String,
}

async fn payment_success(State(b): State<FakeBackend>, headers: HeaderMap, Query(q): Query<PaymentQuery>) -> Reply {
    b.caller(&headers)?;
    let tracking = b.next_id("TRK-");
    Ok(Json(json!({
        "transactionId": format!("txn_{}", q.session_id),
        "trackingId": tracking,
    })))
}

pub(crate) fn router(backend: FakeBackend) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/home", get(home_products))
        .route("/products/manager", get(manager_products))
        .route(
            "/products/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/products/:id/show-on-home", patch(show_on_home))
        .route("/users", get(list_users))
        .route("/users/me", get(me))
        .route("/users/:id/role", patch(update_role))
        .route("/users/:id/status", patch(update_status))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).delete(cancel_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/orders/:id/tracking", post(add_tracking))
        .route("/dashboard/:role/stats", get(dashboard_stats))
        .route("/create-checkout-session", post(checkout))
        .route("/payment-success", patch(payment_success))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

/// Serve the fake API on an ephemeral port and return its base URL
pub(crate) async fn spawn_backend(backend: FakeBackend) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(backend);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}", addr), handle)
}
