mod common;

use chrono::Duration;
use common::{pickup, Harness};
use order_engine::cart::{CartManager, RemovalReason};
use order_engine::cart_actor::CartError;
use order_engine::clock::Clock;
use order_engine::config::EngineConfig;
use order_engine::error::EngineError;
use order_engine::model::{CartItem, CustomerId, Product, ProductStatus};
use order_engine::notify::TracingSink;
use order_engine::product_actor::ProductAction;
use std::sync::Arc;

#[tokio::test]
async fn test_cart_editing_flow() {
    let h = Harness::start(10).await;
    let customer = CustomerId::new();
    let cart = h.engine.carts.get_or_create(customer).await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.expires_at, cart.created_at + Duration::hours(24));

    // Same key merges.
    h.engine
        .carts
        .add_item(customer, cart.id, h.item(&h.tacos, 2))
        .await
        .unwrap();
    let cart = h
        .engine
        .carts
        .add_item(customer, cart.id, h.item(&h.tacos, 3))
        .await
        .unwrap();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 5);

    // A different pickup time is a separate line.
    let later = h.item(&h.tacos, 1).at(pickup());
    let cart = h.engine.carts.add_item(customer, cart.id, later.clone()).await.unwrap();
    assert_eq!(cart.items().len(), 2);
    assert_eq!(CartManager::compute_item_count(&cart), 6);
    assert_eq!(CartManager::compute_total(&cart), 9_000);

    let cart = h
        .engine
        .carts
        .update_quantity(customer, cart.id, later.key(), 0)
        .await
        .unwrap();
    assert_eq!(cart.items().len(), 1);

    let cart = h
        .engine
        .carts
        .remove_item(customer, cart.id, h.item(&h.tacos, 1).key())
        .await
        .unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_quantity_limits_are_enforced() {
    let h = Harness::start(10).await;
    let (customer, cart) = h.customer_with(vec![h.item(&h.tacos, 60)]).await;

    let err = h
        .engine
        .carts
        .add_item(customer, cart.id, h.item(&h.tacos, 41))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Cart(CartError::ItemLimitExceeded { requested: 101, max: 100, .. })
    ));

    let err = h
        .engine
        .carts
        .update_quantity(customer, cart.id, h.item(&h.agua, 1).key(), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Cart(CartError::ItemNotFound(_))));

    let stored = h.engine.carts.get_or_create(customer).await.unwrap();
    assert_eq!(stored.items()[0].quantity, 60);
}

#[tokio::test]
async fn test_merge_is_all_or_nothing() {
    let h = Harness::start(10).await;
    let (customer, cart) = h.customer_with(vec![h.item(&h.tacos, 1)]).await;

    let err = h
        .engine
        .carts
        .merge_items(customer, cart.id, vec![h.item(&h.agua, 2), h.item(&h.agua, 0)])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Cart(CartError::InvalidQuantity {
            quantity: 0,
            max: 100
        })
    );

    let stored = h.engine.carts.get_or_create(customer).await.unwrap();
    assert_eq!(stored.items(), cart.items());
}

#[tokio::test]
async fn test_expired_cart_is_never_returned() {
    let h = Harness::start(10).await;
    let (customer, stale) = h.customer_with(vec![h.item(&h.tacos, 1)]).await;

    h.clock.advance(Duration::hours(24));
    let err = h
        .engine
        .carts
        .add_item(customer, stale.id, h.item(&h.agua, 1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Cart(CartError::CartExpired(stale.id)));

    let fresh = h.engine.carts.get_or_create(customer).await.unwrap();
    assert_ne!(fresh.id, stale.id);
    assert!(fresh.is_empty());
    assert!(!fresh.is_expired(h.clock.now()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_lose_nothing() {
    const WRITERS: usize = 20;
    let config = EngineConfig {
        write_retries: WRITERS as u32 + 1,
        ..EngineConfig::default()
    };
    let h = Harness::start_with(10, config, Arc::new(TracingSink)).await;
    let (customer, cart) = h.customer_with(Vec::new()).await;
    let cart_id = cart.id;

    let products: Vec<Product> = (0..WRITERS)
        .map(|n| Product::new(h.stall.id, format!("Tamal #{n}"), 400, 20))
        .collect();

    let tasks: Vec<_> = products
        .iter()
        .map(|product| {
            let carts = h.engine.carts.clone();
            let item = CartItem::new(product.id, product.stall_id, 1, product.unit_price);
            tokio::spawn(async move { carts.add_item(customer, cart_id, item).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = h.engine.carts.get_or_create(customer).await.unwrap();
    assert_eq!(stored.items().len(), WRITERS);
    for product in &products {
        assert!(stored.items().iter().any(|item| item.product_id == product.id));
    }
}

#[tokio::test]
async fn test_reconcile_drops_what_can_no_longer_be_ordered() {
    let h = Harness::start(10).await;
    let gone = Product::new(h.stall.id, "Never stocked", 100, 1);
    let (customer, cart) = h
        .customer_with(vec![
            h.item(&h.tacos, 1),
            h.item(&h.agua, 1),
            CartItem::new(gone.id, gone.stall_id, 1, gone.unit_price),
        ])
        .await;
    h.engine
        .products
        .update_product(h.agua.id, ProductAction::SetStatus(ProductStatus::Inactive))
        .await
        .unwrap();

    let report = h.engine.carts.reconcile(customer, cart.id).await.unwrap();

    let mut reasons: Vec<_> = report.removed.iter().map(|r| r.reason.clone()).collect();
    reasons.sort_by_key(|r| r.to_string());
    assert_eq!(
        reasons,
        vec![
            RemovalReason::ProductUnavailable(ProductStatus::Inactive),
            RemovalReason::ProductNotFound,
        ]
    );
    assert_eq!(report.cart.items().len(), 1);
    assert_eq!(report.cart.items()[0].product_id, h.tacos.id);

    // Persisted, not just reported.
    let stored = h.engine.carts.get_or_create(customer).await.unwrap();
    assert_eq!(stored.items(), report.cart.items());

    let again = h.engine.carts.reconcile(customer, cart.id).await.unwrap();
    assert!(again.removed.is_empty());
}
