//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! The tests need no external services: [`FakeBackend`] serves the REST cart
//! resource from memory on an ephemeral local port.
//!
//! Its responses are deliberately inconsistent in the same way a real
//! backend's are: the add-item response embeds product details without a
//! price (only the line-level `unit_price` carries it), and removals answer
//! `204 No Content`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

/// A catalog product the fake backend knows about.
struct CatalogEntry {
    id: u64,
    name: &'static str,
    slug: &'static str,
    price_cents: i64,
    sizes: &'static [(u64, &'static str)],
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: 7,
        name: "Linen Shirt",
        slug: "linen-shirt",
        price_cents: 4500,
        sizes: &[(1, "S"), (2, "M"), (3, "L")],
    },
    CatalogEntry {
        id: 9,
        name: "Wool Socks",
        slug: "wool-socks",
        price_cents: 1250,
        sizes: &[(5, "One Size")],
    },
];

#[derive(Debug, Clone)]
struct ServerLine {
    id: u64,
    product_id: u64,
    size_id: u64,
    quantity: u32,
}

/// Mutable backend state, inspectable from tests.
#[derive(Debug, Default)]
pub struct BackendState {
    lines: Vec<ServerLine>,
    next_line_id: u64,
    /// Number of product lookups served.
    pub product_hits: u64,
    /// When set, every cart request answers with this status.
    pub fail_status: Option<u16>,
    /// When set, every request is rate limited with this `Retry-After`.
    pub rate_limit: Option<u64>,
    /// Leave `Retry-After` off rate-limited responses.
    pub omit_retry_after: bool,
    /// `Authorization` header of the last request.
    pub last_authorization: Option<String>,
}

type SharedState = Arc<Mutex<BackendState>>;

/// In-memory REST backend served on `127.0.0.1:<ephemeral>`.
pub struct FakeBackend {
    addr: SocketAddr,
    state: SharedState,
}

impl FakeBackend {
    /// Start serving. The server task lives as long as the test runtime.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = SharedState::default();

        let router = Router::new()
            .route("/api/cart/", get(get_cart).delete(clear_cart))
            .route("/api/cart/items/", axum::routing::post(add_item))
            .route("/api/cart/items/{id}/", patch(update_item).delete(remove_item))
            .route("/api/products/{slug}/", get(get_product))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// Lock the backend state.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }
}

fn lock(state: &SharedState) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn catalog_by_id(id: u64) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|p| p.id == id)
}

fn money(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Common request bookkeeping; returns an early response when the backend
/// is configured to fail.
fn intercept(state: &mut BackendState, headers: &HeaderMap) -> Option<Response> {
    state.last_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if let Some(retry_after) = state.rate_limit {
        let response = if state.omit_retry_after {
            (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
        } else {
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.to_string())],
                "slow down",
            )
                .into_response()
        };
        return Some(response);
    }
    state.fail_status.map(|status| {
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "backend exploded",
        )
            .into_response()
    })
}

/// Full cart document. With `embed_price == false` the product detail omits
/// its price, as the add-item endpoint does.
fn cart_json(state: &BackendState, embed_price: bool) -> Value {
    let mut total_cents = 0;
    let mut total_items = 0;
    let items: Vec<Value> = state
        .lines
        .iter()
        .filter_map(|line| {
            let product = catalog_by_id(line.product_id)?;
            let size_name = product
                .sizes
                .iter()
                .find(|(id, _)| *id == line.size_id)
                .map_or("", |(_, name)| *name);
            let subtotal = product.price_cents * i64::from(line.quantity);
            total_cents += subtotal;
            total_items += line.quantity;

            let mut detail = json!({
                "id": product.id,
                "name": product.name,
                "slug": product.slug,
                "image": format!("https://cdn.example.com/{}.jpg", product.slug),
            });
            if embed_price {
                detail["price"] = json!(money(product.price_cents));
            }

            Some(json!({
                "id": line.id,
                "product": product.id,
                "product_detail": detail,
                "size": line.size_id,
                "size_detail": { "id": line.size_id, "name": size_name },
                "quantity": line.quantity,
                "unit_price": money(product.price_cents),
                "subtotal": money(subtotal),
            }))
        })
        .collect();

    json!({
        "id": 1,
        "items": items,
        "total": money(total_cents),
        "total_items": total_items,
    })
}

async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if let Some(response) = intercept(&mut state, &headers) {
        return response;
    }
    Json(cart_json(&state, true)).into_response()
}

#[derive(Deserialize)]
struct AddBody {
    product_id: String,
    size_id: String,
    quantity: u32,
}

async fn add_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    let mut state = lock(&state);
    if let Some(response) = intercept(&mut state, &headers) {
        return response;
    }

    let (Ok(product_id), Ok(size_id)) =
        (body.product_id.parse::<u64>(), body.size_id.parse::<u64>())
    else {
        return (StatusCode::BAD_REQUEST, "ids must be numeric").into_response();
    };
    let known =
        catalog_by_id(product_id).is_some_and(|p| p.sizes.iter().any(|(id, _)| *id == size_id));
    if !known {
        return (StatusCode::BAD_REQUEST, "unknown product or size").into_response();
    }

    if let Some(line) = state
        .lines
        .iter_mut()
        .find(|l| l.product_id == product_id && l.size_id == size_id)
    {
        line.quantity += body.quantity;
    } else {
        state.next_line_id += 1;
        let id = state.next_line_id + 100;
        state.lines.push(ServerLine {
            id,
            product_id,
            size_id,
            quantity: body.quantity,
        });
    }

    (StatusCode::CREATED, Json(cart_json(&state, false))).into_response()
}

#[derive(Deserialize)]
struct UpdateBody {
    quantity: u32,
}

async fn update_item(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    let mut state = lock(&state);
    if let Some(response) = intercept(&mut state, &headers) {
        return response;
    }

    let Some(line) = state.lines.iter_mut().find(|l| l.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    line.quantity = body.quantity;
    state.lines.retain(|l| l.quantity > 0);

    Json(cart_json(&state, true)).into_response()
}

async fn remove_item(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    if let Some(response) = intercept(&mut state, &headers) {
        return response;
    }
    state.lines.retain(|l| l.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn clear_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if let Some(response) = intercept(&mut state, &headers) {
        return response;
    }
    state.lines.clear();
    StatusCode::NO_CONTENT.into_response()
}

async fn get_product(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    if let Some(response) = intercept(&mut state, &headers) {
        return response;
    }
    state.product_hits += 1;

    let Some(product) = CATALOG.iter().find(|p| p.slug == slug) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response();
    };
    let sizes: Vec<Value> = product
        .sizes
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();

    Json(json!({
        "id": product.id,
        "name": product.name,
        "slug": product.slug,
        "price": money(product.price_cents),
        "image": format!("https://cdn.example.com/{}.jpg", product.slug),
        "sizes": sizes,
    }))
    .into_response()
}
