//! Integration tests for the Everything Store client.
//!
//! The tests run the real [`ApiClient`] and [`AppState`] against
//! [`FakeBackend`], an in-memory `axum` implementation of the store's REST
//! surface bound to `127.0.0.1:0`. No external services are needed:
//!
//! ```bash
//! cargo test -p everything-store-integration-tests
//! ```
//!
//! The fake deliberately speaks the backend's inconsistent dialects: the
//! product list uses `_id`/`product_name`, search uses `Product_ID` with a
//! rating, detail uses `id`/`name`, an empty cart is `null`, and addresses
//! come back with `address_id`/`pin_code`.
//!
//! [`ApiClient`]: everything_store_client::api::ApiClient

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;

use everything_store_client::api::ApiClient;
use everything_store_client::config::{ApiConfig, ClientConfig};
use everything_store_client::pages::LoginForm;
use everything_store_client::session::{FileSessionStore, SessionMarker, SessionStore};
use everything_store_client::{AppError, AppState};

// =============================================================================
// Backend data
// =============================================================================

/// A catalog entry held by the fake.
#[derive(Debug, Clone)]
pub struct FakeProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub rating: u8,
}

#[derive(Debug, Clone)]
struct FakeUser {
    id: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Clone)]
struct FakeAddress {
    id: String,
    kind: String,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

#[derive(Debug, Default)]
struct BackendData {
    users: Vec<FakeUser>,
    products: Vec<FakeProduct>,
    /// Cart lines per user id, in insertion order.
    carts: HashMap<String, Vec<(String, u32)>>,
    addresses: HashMap<String, Vec<FakeAddress>>,
    next_id: u32,
    /// Every request as `METHOD path`.
    requests: Vec<String>,
    /// Message returned by the next checkout or buy, as a 400.
    order_failure: Option<String>,
}

impl BackendData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn product(&self, id: &str) -> Option<&FakeProduct> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// In-memory store backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    data: Arc<Mutex<BackendData>>,
}

impl FakeBackend {
    /// Backend with the default catalog: a Widget at 9.99 and a Gadget at 24.50.
    #[must_use]
    pub fn new() -> Self {
        let backend = Self::default();
        backend.add_product(FakeProduct {
            id: "p1".to_string(),
            name: "Widget".to_string(),
            description: "A blue widget".to_string(),
            price: 9.99,
            image: "https://img.example.com/widget.png".to_string(),
            rating: 4,
        });
        backend.add_product(FakeProduct {
            id: "p2".to_string(),
            name: "Gadget".to_string(),
            description: "A shiny gadget".to_string(),
            price: 24.50,
            image: String::new(),
            rating: 5,
        });
        backend
    }

    fn data(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_product(&self, product: FakeProduct) {
        self.data().products.push(product);
    }

    /// Register an account directly, bypassing `/signup`.
    pub fn add_user(&self, email: &str, password: &str) {
        let mut data = self.data();
        let id = data.next_id("u");
        data.users.push(FakeUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Test".to_string(),
            last_name: "Shopper".to_string(),
        });
    }

    /// Make the next checkout or buy fail with this message.
    pub fn fail_next_order(&self, message: &str) {
        self.data().order_failure = Some(message.to_string());
    }

    /// Put a line in a user's cart directly.
    pub fn put_in_cart(&self, email: &str, product_id: &str, quantity: u32) {
        let mut data = self.data();
        let Some(user_id) = data
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id.clone())
        else {
            return;
        };
        data.carts
            .entry(user_id)
            .or_default()
            .push((product_id.to_string(), quantity));
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.data().products.len()
    }

    /// Every request received so far, as `METHOD path`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.data().requests.clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.data().requests.len()
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/signup", post(signup))
            .route("/login", post(login))
            .route("/users/productview", get(list_products).post(create_product))
            .route("/users/productview/buy", get(buy))
            .route("/users/productview/{id}", get(product_detail))
            .route("/users/search", get(search))
            .route("/cart", get(get_cart))
            .route("/cart/add/{product_id}", get(add_to_cart))
            .route("/cart/remove/{product_id}", get(remove_from_cart))
            .route("/cart/checkout", get(checkout))
            .route("/address", post(add_address))
            .route("/address/{id}", get(delete_address))
            .route("/address/{kind}/{id}", put(edit_address))
            .route("/addresses", get(list_addresses))
            .with_state(self.clone())
    }

    /// Serve on an ephemeral local port.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot bind.
    pub async fn spawn(&self) -> std::io::Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });
        Ok(addr)
    }
}

// =============================================================================
// Test context
// =============================================================================

/// A running fake backend plus a private session directory.
pub struct TestContext {
    pub backend: FakeBackend,
    pub base_url: String,
    session_dir: TempDir,
}

impl TestContext {
    /// Start a backend with the default catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot bind or the temp dir cannot be
    /// created.
    pub async fn start() -> std::io::Result<Self> {
        let backend = FakeBackend::new();
        let addr = backend.spawn().await?;
        Ok(Self {
            backend,
            base_url: format!("http://{addr}"),
            session_dir: tempfile::tempdir()?,
        })
    }

    /// Client configuration pointing at the fake, with the marker in the
    /// context's temp dir.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse.
    pub fn config(&self) -> Result<ClientConfig, AppError> {
        let api = ApiConfig::parse(&self.base_url)?;
        Ok(ClientConfig::new(api, self.session_file()))
    }

    #[must_use]
    pub fn session_file(&self) -> std::path::PathBuf {
        self.session_dir.path().join("session.json")
    }

    /// A bare API client.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built.
    pub fn api(&self) -> Result<ApiClient, AppError> {
        Ok(ApiClient::new(&self.config()?.api)?)
    }

    /// Application state as the binary would create it. Calling this again
    /// simulates a restart.
    ///
    /// # Errors
    ///
    /// Returns error if the state cannot be created.
    pub async fn app(&self) -> Result<AppState, AppError> {
        AppState::new(self.config()?).await
    }

    /// Marker store over the context's session file.
    #[must_use]
    pub fn session_store(&self) -> FileSessionStore {
        FileSessionStore::new(self.session_file())
    }

    /// Register an account, log it in on a bare client and save the marker,
    /// then start the application the way a restart would.
    ///
    /// The returned state has its cart loaded and no background refresh
    /// pending, so request counts taken afterwards are exact.
    ///
    /// # Errors
    ///
    /// Returns error if the login or the marker write fails.
    pub async fn returning_shopper(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AppState, AppError> {
        self.backend.add_user(email, password);
        let credentials = LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
        .validate()?;
        let session = self.api()?.login(&credentials).await?;
        self.session_store()
            .save(&SessionMarker::new(session.user, session.token))?;
        self.app().await
    }
}

// =============================================================================
// Handlers
// =============================================================================

type Shared = State<FakeBackend>;

fn error(status: StatusCode, body: &Value) -> Response {
    (status, Json(body.clone())).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, &json!({"error": "unauthorized"}))
}

/// Resolve the `token` header to a user id and log the request.
fn authenticate(data: &BackendData, headers: &HeaderMap) -> Option<String> {
    let token = headers.get("token")?.to_str().ok()?;
    let user_id = token.strip_prefix("tok-")?;
    data.users
        .iter()
        .any(|u| u.id == user_id)
        .then(|| user_id.to_string())
}

fn record(data: &mut BackendData, method: &str, path: &str) {
    data.requests.push(format!("{method} {path}"));
}

fn product_json(product: &FakeProduct, style: &str) -> Value {
    match style {
        "list" => json!({
            "_id": product.id,
            "product_name": product.name,
            "description": product.description,
            "price": product.price,
            "image": product.image,
        }),
        "search" => json!({
            "Product_ID": product.id,
            "product_name": product.name,
            "description": product.description,
            "price": product.price,
            "rating": product.rating,
            "image": product.image,
        }),
        _ => json!({
            "id": product.id,
            "name": product.name,
            "description": product.description,
            "price": product.price,
            "image": product.image,
        }),
    }
}

#[derive(Deserialize)]
struct SignupBody {
    email: String,
    password: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

async fn signup(State(backend): Shared, Json(body): Json<SignupBody>) -> Response {
    let mut data = backend.data();
    record(&mut data, "POST", "/signup");

    if data.users.iter().any(|u| u.email == body.email) {
        return error(
            StatusCode::BAD_REQUEST,
            &json!({"error": "email already exists"}),
        );
    }
    let id = data.next_id("u");
    data.users.push(FakeUser {
        id: id.clone(),
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
    });
    Json(json!({"message": "Successfully signed up", "token": format!("tok-{id}")}))
        .into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(backend): Shared, Json(body): Json<LoginBody>) -> Response {
    let mut data = backend.data();
    record(&mut data, "POST", "/login");

    let Some(user) = data
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
    else {
        return error(
            StatusCode::UNAUTHORIZED,
            &json!({"error": "invalid email or password"}),
        );
    };
    Json(json!({
        "user": {
            "_id": user.id,
            "email": user.email,
            "first_name": user.first_name,
            "last_name": user.last_name,
        },
        "token": format!("tok-{}", user.id),
    }))
    .into_response()
}

async fn list_products(State(backend): Shared) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", "/users/productview");
    let products: Vec<Value> = data
        .products
        .iter()
        .map(|p| product_json(p, "list"))
        .collect();
    Json(products).into_response()
}

#[derive(Deserialize)]
struct NewProductBody {
    name: String,
    description: String,
    price: f64,
    image: String,
}

async fn create_product(
    State(backend): Shared,
    headers: HeaderMap,
    Json(body): Json<NewProductBody>,
) -> Response {
    let mut data = backend.data();
    record(&mut data, "POST", "/users/productview");
    if authenticate(&data, &headers).is_none() {
        return unauthorized();
    }
    let id = data.next_id("p");
    data.products.push(FakeProduct {
        id,
        name: body.name,
        description: body.description,
        price: body.price,
        image: body.image,
        rating: 0,
    });
    Json(json!({"message": "Product added"})).into_response()
}

async fn product_detail(State(backend): Shared, Path(id): Path<String>) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", &format!("/users/productview/{id}"));
    match data.product(&id) {
        Some(product) => Json(product_json(product, "detail")).into_response(),
        None => error(StatusCode::NOT_FOUND, &json!({"message": "not found"})),
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    name: String,
}

async fn search(State(backend): Shared, Query(query): Query<SearchQuery>) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", &format!("/users/search?name={}", query.name));
    let needle = query.name.to_lowercase();
    let products: Vec<Value> = data
        .products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .map(|p| product_json(p, "search"))
        .collect();
    if products.is_empty() {
        return Json(Value::Null).into_response();
    }
    Json(products).into_response()
}

async fn get_cart(State(backend): Shared, headers: HeaderMap) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", "/cart");
    let Some(user_id) = authenticate(&data, &headers) else {
        return unauthorized();
    };

    let lines = data.carts.get(&user_id).cloned().unwrap_or_default();
    if lines.is_empty() {
        return Json(Value::Null).into_response();
    }
    let items: Vec<Value> = lines
        .iter()
        .filter_map(|(product_id, quantity)| {
            let product = data.product(product_id)?;
            Some(json!({
                "_id": format!("line-{product_id}"),
                "productId": product_id,
                "product": product_json(product, "list"),
                "quantity": quantity,
            }))
        })
        .collect();
    Json(items).into_response()
}

#[derive(Deserialize)]
struct QuantityQuery {
    quantity: Option<u32>,
}

async fn add_to_cart(
    State(backend): Shared,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Query(query): Query<QuantityQuery>,
) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", &format!("/cart/add/{product_id}"));
    let Some(user_id) = authenticate(&data, &headers) else {
        return unauthorized();
    };
    if data.product(&product_id).is_none() {
        return error(
            StatusCode::NOT_FOUND,
            &json!({"message": "product not found"}),
        );
    }
    let quantity = query.quantity.unwrap_or(1);

    let lines = data.carts.entry(user_id).or_default();
    match lines.iter_mut().find(|(id, _)| *id == product_id) {
        Some((_, q)) => *q += quantity,
        None => lines.push((product_id, quantity)),
    }
    Json(json!("Successfully added to the cart")).into_response()
}

async fn remove_from_cart(
    State(backend): Shared,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", &format!("/cart/remove/{product_id}"));
    let Some(user_id) = authenticate(&data, &headers) else {
        return unauthorized();
    };
    data.carts
        .entry(user_id)
        .or_default()
        .retain(|(id, _)| *id != product_id);
    Json(json!("Successfully removed from the cart")).into_response()
}

fn place_order(backend: &FakeBackend, headers: &HeaderMap, path: &str, done: &str) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", path);
    let Some(user_id) = authenticate(&data, headers) else {
        return unauthorized();
    };
    if let Some(message) = data.order_failure.take() {
        return error(StatusCode::BAD_REQUEST, &json!({"message": message}));
    }
    let lines = data.carts.entry(user_id).or_default();
    if lines.is_empty() {
        return error(StatusCode::BAD_REQUEST, &json!({"error": "cart is empty"}));
    }
    lines.clear();
    Json(json!({"message": done})).into_response()
}

async fn checkout(State(backend): Shared, headers: HeaderMap) -> Response {
    place_order(&backend, &headers, "/cart/checkout", "Order placed")
}

async fn buy(State(backend): Shared, headers: HeaderMap) -> Response {
    place_order(
        &backend,
        &headers,
        "/users/productview/buy",
        "Purchase complete",
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressBody {
    #[serde(rename = "type")]
    kind: String,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

impl AddressBody {
    fn into_address(self, id: String) -> FakeAddress {
        FakeAddress {
            id,
            kind: self.kind,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
        }
    }
}

async fn add_address(
    State(backend): Shared,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> Response {
    let mut data = backend.data();
    record(&mut data, "POST", "/address");
    let Some(user_id) = authenticate(&data, &headers) else {
        return unauthorized();
    };
    let id = data.next_id("a");
    data.addresses
        .entry(user_id)
        .or_default()
        .push(body.into_address(id));
    Json(json!({"message": "Address added"})).into_response()
}

async fn edit_address(
    State(backend): Shared,
    headers: HeaderMap,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<AddressBody>,
) -> Response {
    let mut data = backend.data();
    record(&mut data, "PUT", &format!("/address/{kind}/{id}"));
    let Some(user_id) = authenticate(&data, &headers) else {
        return unauthorized();
    };
    let addresses = data.addresses.entry(user_id).or_default();
    let Some(existing) = addresses.iter_mut().find(|a| a.id == id) else {
        return error(StatusCode::NOT_FOUND, &json!({"error": "address not found"}));
    };
    if existing.kind != kind {
        return error(
            StatusCode::BAD_REQUEST,
            &json!({"error": format!("address {id} is not a {kind} address")}),
        );
    }
    *existing = body.into_address(id);
    Json(json!({"message": format!("{kind} address updated")})).into_response()
}

async fn delete_address(
    State(backend): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", &format!("/address/{id}"));
    let Some(user_id) = authenticate(&data, &headers) else {
        return unauthorized();
    };
    data.addresses
        .entry(user_id)
        .or_default()
        .retain(|a| a.id != id);
    Json(json!("Address deleted")).into_response()
}

async fn list_addresses(State(backend): Shared, headers: HeaderMap) -> Response {
    let mut data = backend.data();
    record(&mut data, "GET", "/addresses");
    let Some(user_id) = authenticate(&data, &headers) else {
        return unauthorized();
    };
    let addresses: Vec<Value> = data
        .addresses
        .get(&user_id)
        .map(|list| {
            list.iter()
                .map(|a| {
                    json!({
                        "address_id": a.id,
                        "type": a.kind,
                        "street": a.street,
                        "city": a.city,
                        "state": a.state,
                        "pin_code": a.zip_code,
                        "country": a.country,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Json(addresses).into_response()
}
