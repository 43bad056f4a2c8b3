//! Integration tests for Shopfront.
//!
//! Tests run the storefront library against [`MockApi`], an in-process axum
//! server that speaks the storefront REST API and keeps its state in memory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - Catalog, orders and admin calls over HTTP
//! - `cart_sync` - Cart store against the server cart and the guest file store
//! - `checkout` - Order placement end to end

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;

use shopfront_core::{Cart, LineId, NewLine, OrderId, OrderStatus, ProductId};
use shopfront_storefront::api::{
    AddItemRequest, Category, DashboardStats, Order, OrderItem, OrderRequest, Product,
    ProductInput, ProductQuery, ProductSort, TrackingEvent, TrackingInfo, UpdateItemRequest,
};
use shopfront_storefront::config::ApiConfig;

/// Token the mock accepts as a signed-in shopper.
pub const TOKEN: &str = "mock-shopper-token-Zq9xA7";

// =============================================================================
// State
// =============================================================================

#[derive(Default)]
struct Data {
    products: Vec<Product>,
    categories: Vec<Category>,
    cart: Cart,
    orders: Vec<Order>,
    tracking: HashMap<String, TrackingInfo>,
    next_id: i64,
    cart_unavailable: bool,
    hits: HashMap<String, usize>,
}

impl Data {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    fn order_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id.as_str() == id)
    }
}

#[derive(Default)]
struct MockState {
    data: Mutex<Data>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type Shared = Arc<MockState>;

/// Error response with a `{"message": ...}` body.
struct MockError(StatusCode, &'static str);

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

type MockResult<T> = Result<Json<T>, MockError>;

// =============================================================================
// MockApi
// =============================================================================

/// An in-process storefront API on an ephemeral port.
///
/// The server stops when the value is dropped.
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Start a server seeded with a small catalog.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(MockState::default());
        seed(&mut state.lock());

        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock api");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client config for a guest session.
    #[must_use]
    pub fn guest_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url()).unwrap()
    }

    /// Client config for a signed-in session.
    #[must_use]
    pub fn signed_in_config(&self) -> ApiConfig {
        self.guest_config()
            .with_token(SecretString::from(TOKEN.to_string()))
    }

    /// Number of requests seen for `"<METHOD> <path>"`, e.g. `"GET /api/products/1"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.state.lock().hits.get(route).copied().unwrap_or(0)
    }

    /// Make every cart route answer 503.
    pub fn set_cart_unavailable(&self, unavailable: bool) {
        self.state.lock().cart_unavailable = unavailable;
    }

    #[must_use]
    pub fn server_cart(&self) -> Cart {
        self.state.lock().cart.clone()
    }

    /// Put `quantity` units of a catalog product in the server cart.
    pub fn seed_cart(&self, product_id: &str, quantity: u32) {
        let mut data = self.state.lock();
        let product = data.product(&ProductId::new(product_id)).unwrap().clone();
        let id = data.next_id();
        data.cart = data
            .cart
            .with_added(&NewLine::from(&product), quantity, || LineId::from(id));
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().orders.clone()
    }

    /// Move an order along and record a tracking event for it.
    pub fn advance_order(&self, id: &OrderId, status: OrderStatus, description: &str) {
        let mut data = self.state.lock();
        data.order_mut(id.as_str()).unwrap().status = status.clone();
        data.tracking
            .entry(id.to_string())
            .or_default()
            .events
            .push(TrackingEvent {
                status,
                timestamp: Utc::now(),
                description: description.to_string(),
            });
    }

    /// Change a product's price directly in the catalog.
    pub fn set_price(&self, product_id: &str, price: Decimal) {
        let mut data = self.state.lock();
        let id = ProductId::new(product_id);
        if let Some(product) = data.products.iter_mut().find(|p| p.id == id) {
            product.price = price;
        }
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn seed(data: &mut Data) {
    let product = |id: i64, name: &str, cents: i64, category: &str, stock: u32| Product {
        id: ProductId::from(id),
        name: name.to_string(),
        description: format!("{name} from the mock catalog"),
        price: Decimal::new(cents, 2),
        category: category.to_string(),
        image: None,
        stock,
    };

    data.products = vec![
        product(1, "Ceramic Mug", 1250, "Kitchen", 10),
        product(2, "Notebook", 500, "Stationery", 100),
        product(3, "Desk Lamp", 4500, "Home", 0),
        product(4, "Tea Sampler", 1000, "Kitchen", 3),
    ];
    data.categories = ["Kitchen", "Stationery", "Home"]
        .iter()
        .zip(1_i64..)
        .map(|(name, id)| Category {
            id: id.into(),
            name: (*name).to_string(),
            description: None,
            image: None,
        })
        .collect();
    data.next_id = 100;
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories))
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_cart_item))
        .route(
            "/cart/items/{id}",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/tracking", get(track_order))
        .route("/orders/{id}/cancel", put(cancel_order))
        .route("/admin/stats", get(stats));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record_hit))
        .with_state(state)
}

async fn record_hit(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let key = format!("{} {}", request.method(), request.uri().path());
    *state.lock().hits.entry(key).or_default() += 1;
    next.run(request).await
}

fn authorize(headers: &HeaderMap) -> Result<(), MockError> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(MockError(StatusCode::UNAUTHORIZED, "Authentication required")),
    }
}

fn cart_available(data: &Data) -> Result<(), MockError> {
    if data.cart_unavailable {
        Err(MockError(
            StatusCode::SERVICE_UNAVAILABLE,
            "Cart service unavailable",
        ))
    } else {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

async fn list_products(
    State(state): State<Shared>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    let data = state.lock();
    let search = query.search.as_deref().map(str::to_lowercase);

    let mut products: Vec<Product> = data
        .products
        .iter()
        .filter(|p| {
            search.as_deref().is_none_or(|s| {
                p.name.to_lowercase().contains(s) || p.description.to_lowercase().contains(s)
            })
        })
        .filter(|p| {
            query
                .category
                .as_deref()
                .is_none_or(|c| p.category.eq_ignore_ascii_case(c))
        })
        .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
        .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
        .cloned()
        .collect();

    match query.sort_by.unwrap_or_default() {
        ProductSort::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        ProductSort::Price => products.sort_by(|a, b| a.price.cmp(&b.price)),
        ProductSort::Newest => products.sort_by_key(|p| std::cmp::Reverse(numeric(p.id.as_str()))),
    }
    if let Some(limit) = query.limit {
        products.truncate(limit as usize);
    }

    Json(products)
}

fn numeric(id: &str) -> i64 {
    id.parse().unwrap_or_default()
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> MockResult<Product> {
    state
        .lock()
        .product(&ProductId::new(id))
        .cloned()
        .map(Json)
        .ok_or(MockError(StatusCode::NOT_FOUND, "Product not found"))
}

async fn list_categories(State(state): State<Shared>) -> Json<Vec<Category>> {
    Json(state.lock().categories.clone())
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>), MockError> {
    authorize(&headers)?;
    let mut data = state.lock();
    if data.products.iter().any(|p| p.name == input.name) {
        return Err(MockError(
            StatusCode::CONFLICT,
            "A product with this name already exists",
        ));
    }

    let id = data.next_id();
    let product = product_from_input(ProductId::from(id), input);
    data.products.push(product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> MockResult<Product> {
    authorize(&headers)?;
    let mut data = state.lock();
    let id = ProductId::new(id);
    let product = data
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(MockError(StatusCode::NOT_FOUND, "Product not found"))?;
    *product = product_from_input(id, input);
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, MockError> {
    authorize(&headers)?;
    let mut data = state.lock();
    let before = data.products.len();
    data.products.retain(|p| p.id.as_str() != id);
    if data.products.len() == before {
        return Err(MockError(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn product_from_input(id: ProductId, input: ProductInput) -> Product {
    Product {
        id,
        name: input.name,
        description: input.description,
        price: input.price,
        category: input.category,
        image: input.image,
        stock: input.stock,
    }
}

// -----------------------------------------------------------------------------
// Cart
// -----------------------------------------------------------------------------

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Result<Response, MockError> {
    authorize(&headers)?;
    let data = state.lock();
    cart_available(&data)?;
    Ok(Json(json!({ "items": data.cart })).into_response())
}

async fn add_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddItemRequest>,
) -> Result<StatusCode, MockError> {
    authorize(&headers)?;
    let mut data = state.lock();
    cart_available(&data)?;

    let product = data
        .product(&body.product_id)
        .cloned()
        .ok_or(MockError(StatusCode::NOT_FOUND, "Product not found"))?;
    let id = data.next_id();
    data.cart = data
        .cart
        .with_added(&NewLine::from(&product), body.quantity, || LineId::from(id));
    Ok(StatusCode::CREATED)
}

async fn update_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<StatusCode, MockError> {
    authorize(&headers)?;
    let mut data = state.lock();
    cart_available(&data)?;

    let id = LineId::new(id);
    if data.cart.line(&id).is_none() {
        return Err(MockError(StatusCode::NOT_FOUND, "Cart item not found"));
    }
    data.cart = data.cart.with_quantity(&id, body.quantity);
    Ok(StatusCode::OK)
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, MockError> {
    authorize(&headers)?;
    let mut data = state.lock();
    cart_available(&data)?;

    let id = LineId::new(id);
    if data.cart.line(&id).is_none() {
        return Err(MockError(StatusCode::NOT_FOUND, "Cart item not found"));
    }
    data.cart = data.cart.without_line(&id);
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Result<StatusCode, MockError> {
    authorize(&headers)?;
    let mut data = state.lock();
    cart_available(&data)?;
    data.cart = Cart::new();
    Ok(StatusCode::NO_CONTENT)
}

// -----------------------------------------------------------------------------
// Orders
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct OrdersQuery {
    limit: Option<usize>,
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderRequest>,
) -> Result<(StatusCode, Response), MockError> {
    authorize(&headers)?;
    let mut data = state.lock();
    if body.items.is_empty() {
        return Err(MockError(StatusCode::BAD_REQUEST, "Order has no items"));
    }

    let mut items = Vec::with_capacity(body.items.len());
    for line in &body.items {
        let product = data
            .product(&line.product_id)
            .ok_or(MockError(StatusCode::NOT_FOUND, "Product not found"))?;
        if product.stock < line.quantity {
            return Err(MockError(StatusCode::CONFLICT, "Insufficient stock"));
        }
        items.push(OrderItem {
            product_id: line.product_id.clone(),
            name: product.name.clone(),
            quantity: line.quantity,
            price: line.price,
            image: product.image.clone(),
        });
    }

    let id = data.next_id();
    let order = Order {
        id: OrderId::from(id),
        status: OrderStatus::Pending,
        items,
        shipping_address: Some(body.shipping_address),
        shipping_method: body.shipping_method,
        subtotal: body.totals.subtotal,
        shipping: body.totals.shipping,
        tax: body.totals.tax,
        total: body.totals.total,
        created_at: Some(Utc::now()),
    };
    data.tracking.insert(
        order.id.to_string(),
        TrackingInfo {
            events: vec![TrackingEvent {
                status: OrderStatus::Pending,
                timestamp: Utc::now(),
                description: "Order received".to_string(),
            }],
        },
    );
    data.orders.push(order);

    // Numeric id, the way the real API answers
    Ok((StatusCode::CREATED, Json(json!({ "id": id })).into_response()))
}

async fn list_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<OrdersQuery>,
) -> MockResult<Vec<Order>> {
    authorize(&headers)?;
    let data = state.lock();
    let mut orders: Vec<Order> = data.orders.iter().rev().cloned().collect();
    if let Some(limit) = query.limit {
        orders.truncate(limit);
    }
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<Order> {
    authorize(&headers)?;
    let data = state.lock();
    data.orders
        .iter()
        .find(|o| o.id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or(MockError(StatusCode::NOT_FOUND, "Order not found"))
}

async fn track_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<TrackingInfo> {
    authorize(&headers)?;
    let data = state.lock();
    data.tracking
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(MockError(StatusCode::NOT_FOUND, "Order not found"))
}

async fn cancel_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<Order> {
    authorize(&headers)?;
    let mut data = state.lock();
    let order = data
        .order_mut(&id)
        .ok_or(MockError(StatusCode::NOT_FOUND, "Order not found"))?;
    if order.status != OrderStatus::Pending {
        return Err(MockError(
            StatusCode::CONFLICT,
            "Order can no longer be cancelled",
        ));
    }
    order.status = OrderStatus::Cancelled;
    Ok(Json(order.clone()))
}

// -----------------------------------------------------------------------------
// Admin
// -----------------------------------------------------------------------------

async fn stats(State(state): State<Shared>, headers: HeaderMap) -> MockResult<DashboardStats> {
    authorize(&headers)?;
    let data = state.lock();
    Ok(Json(DashboardStats {
        total_orders: data.orders.len() as u64,
        total_users: 1,
        total_products: data.products.len() as u64,
        total_revenue: data
            .orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .map(|o| o.total)
            .sum(),
    }))
}
