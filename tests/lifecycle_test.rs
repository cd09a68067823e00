mod common;

use chrono::Duration;
use common::{pickup, Harness};
use order_engine::config::EngineConfig;
use order_engine::error::EngineError;
use order_engine::model::{Order, OrderStatus, ValidationIssue};
use order_engine::notify::ChannelSink;
use order_engine::order_actor::OrderError;
use order_engine::orders::OrderPlacement;
use std::sync::Arc;

/// Transitions that take a fresh `pending` order to `status`.
fn path_to(status: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match status {
        Pending => &[],
        Confirmed => &[Confirmed],
        InPreparation => &[Confirmed, InPreparation],
        Ready => &[Confirmed, InPreparation, Ready],
        Completed => &[Confirmed, InPreparation, Completed],
        Cancelled => &[Cancelled],
    }
}

async fn order_in(h: &Harness, status: OrderStatus) -> Order {
    let mut order = h.placed_order().await;
    for step in path_to(status) {
        order = h.engine.orders.transition_order(order.id, *step).await.unwrap();
    }
    assert_eq!(order.status(), status);
    order
}

#[tokio::test]
async fn test_every_status_pair_follows_the_table() {
    // Unlimited capacity: this test places one order per pair.
    let h = Harness::start(0).await;

    for from in OrderStatus::ALL {
        for to in OrderStatus::ALL {
            let order = order_in(&h, from).await;
            let before = order.history().len();
            let result = h.engine.orders.transition_order(order.id, to).await;

            if from.can_transition_to(to) {
                let moved = result.unwrap_or_else(|e| panic!("{from} -> {to} failed: {e}"));
                assert_eq!(moved.status(), to);
                assert_eq!(moved.history().len(), before + 1);
                assert_eq!(moved.history().last().unwrap().status, to);
            } else {
                let err = result.expect_err("illegal transition succeeded");
                assert_eq!(
                    err,
                    EngineError::Order(OrderError::IllegalTransition {
                        order_id: order.id,
                        from,
                        to,
                    })
                );
                let stored = h.engine.orders.get_order(order.id).await.unwrap().unwrap();
                assert_eq!(stored.history().len(), before);
                assert_eq!(stored.status(), from);
            }
        }
    }
}

#[tokio::test]
async fn test_history_is_stamped_by_the_clock() {
    let h = Harness::start(10).await;
    let order = h.placed_order().await;
    let created = order.created_at;

    h.clock.advance(Duration::minutes(5));
    let confirmed = h
        .engine
        .orders
        .transition_order(order.id, OrderStatus::Confirmed)
        .await
        .unwrap();

    let stamps: Vec<_> = confirmed.history().iter().map(|e| e.at).collect();
    assert_eq!(stamps, vec![created, created + Duration::minutes(5)]);
}

#[tokio::test]
async fn test_backdated_transition_is_rejected() {
    let h = Harness::start(10).await;
    let order = h.placed_order().await;

    h.clock.advance(-Duration::minutes(1));
    let err = h
        .engine
        .orders
        .transition_order(order.id, OrderStatus::Confirmed)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Order(OrderError::HistoryOutOfOrder { .. })
    ));
}

#[tokio::test]
async fn test_expected_status_guards_concurrent_staff() {
    let h = Harness::start(10).await;
    let order = h.placed_order().await;

    // Two staff members act on the same pending order.
    h.engine
        .orders
        .transition_order_from(order.id, OrderStatus::Pending, OrderStatus::Confirmed)
        .await
        .unwrap();
    let err = h
        .engine
        .orders
        .transition_order_from(order.id, OrderStatus::Pending, OrderStatus::Cancelled)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Order(OrderError::StaleStatus {
            order_id: order.id,
            expected: OrderStatus::Pending,
            actual: OrderStatus::Confirmed,
        })
    );
    let stored = h.engine.orders.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status(), OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let h = Harness::start(10).await;
    let missing = order_engine::model::OrderId::new();

    let err = h
        .engine
        .orders
        .transition_order(missing, OrderStatus::Confirmed)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Order(OrderError::NotFound(_))));
}

#[tokio::test]
async fn test_cancellation_frees_the_day() {
    let h = Harness::start(1).await;
    let first = h.placed_order().await;

    let (customer, cart) = h.customer_with(vec![h.item(&h.agua, 1)]).await;
    let placement = h.place(customer, &cart, pickup()).await;
    assert!(placement
        .rejection()
        .unwrap()
        .errors
        .contains(&ValidationIssue::AtCapacity { capacity: 1 }));

    h.engine
        .orders
        .transition_order(first.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let placement = h.place(customer, &cart, pickup()).await;
    assert!(matches!(placement, OrderPlacement::Created { .. }));

    let day = pickup().with_timezone(&common::TZ).date_naive();
    let booked = h.engine.orders.orders_for_stall_day(h.stall.id, day).await.unwrap();
    assert_eq!(booked.len(), 1);
    assert_ne!(booked[0].id, first.id);
}

#[tokio::test]
async fn test_creation_and_transitions_are_announced() {
    let (sink, mut events) = ChannelSink::new(16);
    let h = Harness::start_with(10, EngineConfig::default(), Arc::new(sink)).await;

    let order = h.placed_order().await;
    let created = events.recv().await.unwrap();
    assert_eq!(created.order_id, order.id);
    assert_eq!(created.customer_id, order.customer_id);
    assert_eq!(created.new_status, OrderStatus::Pending);

    h.engine
        .orders
        .transition_order(order.id, OrderStatus::Confirmed)
        .await
        .unwrap();
    let confirmed = events.recv().await.unwrap();
    assert_eq!(confirmed.order_id, order.id);
    assert_eq!(confirmed.new_status, OrderStatus::Confirmed);
}
