//! Integration tests for the cart store.
//!
//! Signed-in sessions talk to the mock API over HTTP; guest sessions persist
//! to a file store in a temporary directory.
//!
//! Run with: cargo test -p shopfront-integration-tests --test cart_sync

use std::sync::Arc;

use rust_decimal::Decimal;
use shopfront_core::{NewLine, ProductId};
use shopfront_integration_tests::MockApi;
use shopfront_storefront::identity::{AuthSignal, IdentityProvider};
use shopfront_storefront::notify::CollectingSink;
use shopfront_storefront::storage::FileStore;
use shopfront_storefront::{ApiClient, CartSource, CartStore};
use tempfile::TempDir;

struct Session {
    store: CartStore,
    source: CartSource,
    sink: Arc<CollectingSink>,
}

async fn open(api: &MockApi, dir: &TempDir, auth: AuthSignal) -> Session {
    let client = ApiClient::new(&api.signed_in_config()).expect("Failed to build client");
    let sink = Arc::new(CollectingSink::new());
    let (store, source) = CartStore::open(
        Arc::new(client),
        Arc::new(FileStore::new(dir.path())),
        sink.clone(),
        auth,
    )
    .await;
    Session {
        store,
        source,
        sink,
    }
}

async fn product(api: &MockApi, id: &str) -> NewLine {
    let client = ApiClient::new(&api.guest_config()).unwrap();
    let product = client.get_product(&ProductId::new(id)).await.unwrap();
    NewLine::from(&product)
}

// ============================================================================
// Guest sessions
// ============================================================================

#[tokio::test]
async fn test_guest_cart_persists_to_file_store() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    let mug = product(&api, "1").await;

    let mut first = open(&api, &dir, AuthSignal::fixed(false)).await;
    assert_eq!(first.source, CartSource::Guest);
    first.store.add_line(&mug, 2).await.unwrap();
    drop(first);

    assert!(dir.path().join("guest_cart.json").exists());

    let second = open(&api, &dir, AuthSignal::fixed(false)).await;
    assert_eq!(second.store.quantity_of(&mug.product_id), 2);

    let totals = second.store.totals();
    assert_eq!(totals.subtotal, Decimal::new(2500, 2));
    assert_eq!(totals.shipping_cost, Decimal::new(599, 2));
    assert_eq!(totals.tax, Decimal::new(200, 2));
    assert_eq!(totals.grand_total, Decimal::new(3299, 2));
}

#[tokio::test]
async fn test_guest_session_never_calls_cart_api() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    let mug = product(&api, "1").await;

    let mut session = open(&api, &dir, AuthSignal::fixed(false)).await;
    session.store.add_line(&mug, 1).await.unwrap();
    let line = session.store.cart().lines().first().unwrap().id.clone();
    session.store.set_quantity(&line, 3).await.unwrap();
    session.store.clear().await.unwrap();

    assert_eq!(api.hits("GET /api/cart"), 0);
    assert_eq!(api.hits("POST /api/cart/items"), 0);
    assert!(api.server_cart().is_empty());
    assert!(!dir.path().join("guest_cart.json").exists());
}

// ============================================================================
// Signed-in sessions
// ============================================================================

#[tokio::test]
async fn test_signed_in_session_loads_server_cart() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    api.seed_cart("2", 4);

    let session = open(&api, &dir, AuthSignal::fixed(true)).await;

    assert_eq!(session.source, CartSource::Remote);
    assert_eq!(session.store.cart(), &api.server_cart());
    assert_eq!(session.store.totals().item_count, 4);
    assert_eq!(session.store.totals().subtotal, Decimal::new(2000, 2));
}

#[tokio::test]
async fn test_signed_in_add_merges_with_server_line() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    api.seed_cart("1", 1);
    let mug = product(&api, "1").await;

    let mut session = open(&api, &dir, AuthSignal::fixed(true)).await;
    session.store.add_line(&mug, 2).await.unwrap();

    assert_eq!(session.store.cart().len(), 1);
    assert_eq!(session.store.quantity_of(&mug.product_id), 3);
    assert_eq!(session.store.cart(), &api.server_cart());
    assert_eq!(session.sink.messages(), ["Ceramic Mug added to cart!"]);
    // Mutation plus re-fetch
    assert_eq!(api.hits("GET /api/cart"), 2);
}

#[tokio::test]
async fn test_signed_in_zero_quantity_removes_server_line() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    api.seed_cart("1", 1);
    api.seed_cart("2", 1);

    let mut session = open(&api, &dir, AuthSignal::fixed(true)).await;
    let mug_line = session
        .store
        .cart()
        .line_for_product(&ProductId::new("1"))
        .unwrap()
        .id
        .clone();
    session.store.set_quantity(&mug_line, 0).await.unwrap();

    assert_eq!(session.store.cart().len(), 1);
    assert_eq!(api.server_cart().len(), 1);
    assert!(api.server_cart().line(&mug_line).is_none());
    assert_eq!(session.sink.messages(), ["Item removed from cart"]);
}

#[tokio::test]
async fn test_signed_in_clear_empties_server_cart() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    api.seed_cart("4", 2);

    let mut session = open(&api, &dir, AuthSignal::fixed(true)).await;
    session.store.clear().await.unwrap();

    assert!(session.store.cart().is_empty());
    assert!(api.server_cart().is_empty());
    assert_eq!(session.store.totals().grand_total, Decimal::ZERO);
}

#[tokio::test]
async fn test_unavailable_cart_api_falls_back_to_guest_cart() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    let notebook = product(&api, "2").await;

    let mut guest = open(&api, &dir, AuthSignal::fixed(false)).await;
    guest.store.add_line(&notebook, 1).await.unwrap();
    drop(guest);

    api.set_cart_unavailable(true);
    let session = open(&api, &dir, AuthSignal::fixed(true)).await;

    assert_eq!(session.source, CartSource::GuestFallback);
    assert_eq!(session.store.quantity_of(&notebook.product_id), 1);
}

#[tokio::test]
async fn test_failed_mutation_leaves_cart_unchanged() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    api.seed_cart("2", 1);
    let mug = product(&api, "1").await;

    let mut session = open(&api, &dir, AuthSignal::fixed(true)).await;
    let before = session.store.cart().clone();

    api.set_cart_unavailable(true);
    let result = session.store.add_line(&mug, 1).await;

    assert!(result.is_err());
    assert_eq!(session.store.cart(), &before);
    assert_eq!(session.sink.messages(), ["Failed to add item to cart"]);
    assert!(session.sink.drain().iter().all(|n| n.is_error()));
    assert!(!session.store.is_busy());
}

// ============================================================================
// Identity transitions
// ============================================================================

#[tokio::test]
async fn test_sign_in_switches_to_server_cart_and_back() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    api.seed_cart("4", 1);
    let notebook = product(&api, "2").await;

    let identity = IdentityProvider::new(false);
    let mut session = open(&api, &dir, identity.signal()).await;
    session.store.add_line(&notebook, 3).await.unwrap();
    let guest_cart = session.store.cart().clone();

    identity.sign_in();
    let source = session.store.follow_identity().await;
    assert_eq!(source, Some(CartSource::Remote));
    assert_eq!(session.store.cart(), &api.server_cart());
    assert_eq!(session.store.quantity_of(&notebook.product_id), 0);

    identity.sign_out();
    let source = session.store.follow_identity().await;
    assert_eq!(source, Some(CartSource::Guest));
    assert_eq!(session.store.cart(), &guest_cart);

    // The guest cart is not merged into the server cart
    assert_eq!(api.server_cart().quantity_of(&notebook.product_id), 0);
}
