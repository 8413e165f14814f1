//! Tests for the REST cart client against an in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use secrecy::SecretString;
use shopfront_core::{Cart, LineItemId, Price, ProductId, SizeId};
use shopfront_integration_tests::FakeBackend;
use shopfront_storefront::{ApiConfig, ApiError, CartApiClient, CartStore, JsonFileStorage};

fn client_for(backend: &FakeBackend) -> CartApiClient {
    let config = ApiConfig::with_base_url(&backend.base_url()).unwrap();
    CartApiClient::new(&config).unwrap()
}

async fn add(client: &CartApiClient, product: &str, size: &str, quantity: u32) -> Cart {
    client
        .add_item(&ProductId::from(product), &SizeId::from(size), quantity)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_fresh_cart_is_empty() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    let cart = client.get_cart().await.unwrap();

    assert_eq!(cart.id.as_str(), "1");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, Price::ZERO);
    assert_eq!(cart.item_count, 0);
}

#[tokio::test]
async fn test_add_item_falls_back_to_unit_price() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    // The add response embeds product details without a price
    let cart = add(&client, "7", "2", 2).await;

    assert_eq!(cart.items.len(), 1);
    let line = &cart.items[0];
    assert_eq!(line.id.as_str(), "101");
    assert_eq!(line.product.id.as_str(), "7");
    assert_eq!(line.product.name, "Linen Shirt");
    assert_eq!(line.product.price, Price::from_cents(4500));
    assert_eq!(line.size.name, "M");
    assert_eq!(line.quantity, 2);
    assert_eq!(line.subtotal, Some(Price::from_cents(9000)));
    assert_eq!(cart.total, Price::from_cents(9000));
    assert_eq!(cart.item_count, 2);
}

#[tokio::test]
async fn test_add_same_product_and_size_merges_on_server() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    add(&client, "7", "2", 1).await;
    add(&client, "9", "5", 3).await;
    let cart = add(&client, "7", "2", 2).await;

    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.item_count, 6);
    assert_eq!(cart.total, Price::from_cents(3 * 4500 + 3 * 1250));
}

#[tokio::test]
async fn test_update_item_replaces_quantity() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    add(&client, "7", "1", 4).await;
    let cart = client.update_item(&LineItemId::from("101"), 1).await.unwrap();

    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.total, Price::from_cents(4500));
}

#[tokio::test]
async fn test_remove_item_refetches_after_no_content() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    add(&client, "7", "1", 1).await;
    add(&client, "9", "5", 2).await;
    let cart = client.remove_item(&LineItemId::from("101")).await.unwrap();

    assert_eq!(cart.id.as_str(), "1");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product.id.as_str(), "9");
    assert_eq!(cart.items[0].product.price, Price::from_cents(1250));
    assert_eq!(cart.item_count, 2);
}

#[tokio::test]
async fn test_clear_cart() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    add(&client, "7", "1", 1).await;
    let cart = client.clear_cart().await.unwrap();

    assert!(cart.items.is_empty());
    assert_eq!(cart.total, Price::ZERO);
    assert_eq!(cart.item_count, 0);
}

#[tokio::test]
async fn test_product_lookups_are_cached() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    let first = client.get_product("linen-shirt").await.unwrap();
    let second = client.get_product("linen-shirt").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.snapshot.id.as_str(), "7");
    assert_eq!(first.sizes.len(), 3);
    assert_eq!(backend.state().product_hits, 1);

    client.invalidate_products();
    client.get_product("linen-shirt").await.unwrap();
    assert_eq!(backend.state().product_hits, 2);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    let err = client.get_product("silk-scarf").await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_server_error_status() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);
    backend.state().fail_status = Some(500);

    let err = client.get_cart().await.unwrap_err();

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);
    backend.state().rate_limit = Some(7);

    let err = client.get_cart().await.unwrap_err();

    assert!(matches!(err, ApiError::RateLimited(7)), "got {err:?}");
}

#[tokio::test]
async fn test_rate_limited_without_retry_after_defaults_to_one_second() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);
    {
        let mut state = backend.state();
        state.rate_limit = Some(30);
        state.omit_retry_after = true;
    }

    let err = client.get_cart().await.unwrap_err();

    assert!(matches!(err, ApiError::RateLimited(1)), "got {err:?}");
}

#[tokio::test]
async fn test_authorization_header_is_forwarded() {
    let backend = FakeBackend::start().await;
    let mut config = ApiConfig::with_base_url(&backend.base_url()).unwrap();
    config.authorization = Some(SecretString::from("Token abc123".to_string()));
    let client = CartApiClient::new(&config).unwrap();

    client.get_cart().await.unwrap();

    assert_eq!(
        backend.state().last_authorization.as_deref(),
        Some("Token abc123")
    );
}

#[tokio::test]
async fn test_no_authorization_header_by_default() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);

    client.get_cart().await.unwrap();

    assert_eq!(backend.state().last_authorization, None);
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiConfig::with_base_url(&format!("http://{addr}/api/")).unwrap();
    let client = CartApiClient::new(&config).unwrap();

    let err = client.get_cart().await.unwrap_err();

    assert!(matches!(err, ApiError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn test_catalog_product_into_local_cart() {
    let backend = FakeBackend::start().await;
    let client = client_for(&backend);
    let dir = tempfile::tempdir().unwrap();

    let shirt = client.get_product("linen-shirt").await.unwrap();
    let socks = client.get_product("wool-socks").await.unwrap();

    {
        let mut store = CartStore::open(JsonFileStorage::new(dir.path(), "cart-storage"));
        let medium = shirt.size("m").unwrap();
        store.add_item(shirt.line_item(medium, 1));
        store.add_item(shirt.line_item(medium, 2));
        store.add_item(socks.line_item(socks.size("One Size").unwrap(), 1));

        assert_eq!(store.items().len(), 2);
        assert_eq!(store.items_count(), 4);
        assert_eq!(store.total(), Price::from_cents(3 * 4500 + 1250));
    }

    // A new store over the same slot sees the persisted lines
    let mut store = CartStore::open(JsonFileStorage::new(dir.path(), "cart-storage"));
    assert_eq!(store.items().len(), 2);
    assert_eq!(store.get(&LineItemId::from("7-2")).unwrap().quantity, 3);

    store.update_quantity(&LineItemId::from("7-2"), 0);
    assert_eq!(store.items_count(), 1);
    assert_eq!(store.total(), Price::from_cents(1250));

    // The server cart is untouched by local mutations
    let remote = client.get_cart().await.unwrap();
    assert!(remote.items.is_empty());
}
