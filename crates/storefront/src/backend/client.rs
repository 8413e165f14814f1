//! REST client for the server-confirmed cart and catalog lookups.
//!
//! Uses `reqwest` for HTTP. Products are cached using `moka` (5-minute TTL).
//! No retries: a failed request is returned to the caller, which decides
//! whether to try again.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use shopfront_core::{Cart, LineItemId, ProductId, SizeId};
use tracing::{debug, instrument};
use url::Url;

use crate::backend::ApiError;
use crate::backend::cache::{CacheKey, CacheValue};
use crate::backend::conversions::{CatalogProduct, normalize_cart_json, normalize_product};
use crate::backend::payload::{AddItemRequest, ServerProduct, UpdateItemRequest};
use crate::config::ApiConfig;

const ERROR_BODY_LIMIT: usize = 200;

/// Reported in [`ApiError::RateLimited`] when a 429 carries no usable
/// `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

// =============================================================================
// CartApiClient
// =============================================================================

/// Client for the REST cart resource.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct CartApiClient {
    inner: Arc<CartApiClientInner>,
}

struct CartApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    authorization: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CartApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CartApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(CartApiClientInner {
                client,
                base_url: config.base_url.clone(),
                authorization: config.authorization.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `<base>/<segments...>/`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        match &self.inner.authorization {
            Some(value) => builder.header(header::AUTHORIZATION, value.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                path = %path,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(body)
    }

    /// Normalize a mutation response, re-fetching the cart when the backend
    /// answered without a body.
    async fn cart_from_mutation(&self, body: &str) -> Result<Cart, ApiError> {
        if body.trim().is_empty() {
            debug!("Mutation returned no body, re-fetching cart");
            return self.get_cart().await;
        }
        Ok(normalize_cart_json(body))
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Fetch the server-confirmed cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with an error status.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["cart"])?;
        let body = self.send(self.request(Method::GET, url)).await?;
        Ok(normalize_cart_json(&body))
    }

    /// Add `quantity` units of a product size to the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with an error status.
    #[instrument(skip(self), fields(product = %product, size = %size))]
    pub async fn add_item(
        &self,
        product: &ProductId,
        size: &SizeId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["cart", "items"])?;
        let body = AddItemRequest {
            product_id: product.as_str(),
            size_id: size.as_str(),
            quantity,
        };
        let response = self.send(self.request(Method::POST, url).json(&body)).await?;
        self.cart_from_mutation(&response).await
    }

    /// Set the quantity of a server cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with an error status.
    #[instrument(skip(self), fields(item = %item_id))]
    pub async fn update_item(&self, item_id: &LineItemId, quantity: u32) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["cart", "items", item_id.as_str()])?;
        let response = self
            .send(
                self.request(Method::PATCH, url)
                    .json(&UpdateItemRequest { quantity }),
            )
            .await?;
        self.cart_from_mutation(&response).await
    }

    /// Remove a line from the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with an error status.
    #[instrument(skip(self), fields(item = %item_id))]
    pub async fn remove_item(&self, item_id: &LineItemId) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["cart", "items", item_id.as_str()])?;
        let response = self.send(self.request(Method::DELETE, url)).await?;
        self.cart_from_mutation(&response).await
    }

    /// Empty the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with an error status.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["cart"])?;
        let response = self.send(self.request(Method::DELETE, url)).await?;
        self.cart_from_mutation(&response).await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product(&self, slug: &str) -> Result<CatalogProduct, ApiError> {
        let cache_key = CacheKey::Product(slug.to_string());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", slug])?;
        let body = self.send(self.request(Method::GET, url)).await?;

        let raw = match serde_json::from_str::<Value>(&body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value::<ServerProduct>(value).ok(),
            _ => None,
        };
        let product = raw
            .map(normalize_product)
            .filter(|p| !p.snapshot.id.is_empty())
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {slug}")))?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Drop every cached product.
    pub fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
    }
}
