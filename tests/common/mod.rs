//! Shared fixtures for the engine-level tests.
#![allow(dead_code)]

use chrono::{DateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::America::Mexico_City;
use chrono_tz::Tz;
use order_engine::clock::ManualClock;
use order_engine::config::EngineConfig;
use order_engine::lifecycle::OrderEngine;
use order_engine::model::{
    Cart, CartItem, CustomerId, DayHours, Order, Product, Stall, WeeklyHours,
};
use order_engine::notify::{NotificationSink, TracingSink};
use order_engine::orders::OrderPlacement;
use std::sync::Arc;

pub const TZ: Tz = Mexico_City;

/// Stall-local wall time in March 2026. The 3rd is a Tuesday.
pub fn local(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    TZ.with_ymd_and_hms(2026, 3, day, hour, minute, 0)
        .single()
        .expect("unambiguous local time")
        .with_timezone(&Utc)
}

/// Tuesday morning, before opening.
pub fn now() -> DateTime<Utc> {
    local(3, 8, 0)
}

/// Wednesday lunchtime, inside opening hours.
pub fn pickup() -> DateTime<Utc> {
    local(4, 12, 0)
}

/// Open 09:00 to 18:00, closed on Mondays.
pub fn hours() -> WeeklyHours {
    WeeklyHours::every_day(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    )
    .with_day(Weekday::Mon, DayHours::Closed)
}

pub struct Harness {
    pub engine: OrderEngine,
    pub clock: ManualClock,
    pub stall: Stall,
    /// 1500 cents, 50 in stock.
    pub tacos: Product,
    /// 800 cents, 50 in stock.
    pub agua: Product,
}

impl Harness {
    pub async fn start(capacity: u32) -> Self {
        Self::start_with(capacity, EngineConfig::default(), Arc::new(TracingSink)).await
    }

    pub async fn start_with(capacity: u32, config: EngineConfig, sink: Arc<dyn NotificationSink>) -> Self {
        let clock = ManualClock::new(now());
        let engine = OrderEngine::start(config, Arc::new(clock.clone()), sink);

        let stall = Stall::new("Fonda Doña Lupe", TZ, hours(), capacity);
        engine.stalls.create_stall(stall.clone()).await.unwrap();

        let tacos = Product::new(stall.id, "Tacos de canasta", 1_500, 50);
        let agua = Product::new(stall.id, "Agua de jamaica", 800, 50);
        engine.products.create_product(tacos.clone()).await.unwrap();
        engine.products.create_product(agua.clone()).await.unwrap();

        Self {
            engine,
            clock,
            stall,
            tacos,
            agua,
        }
    }

    pub fn item(&self, product: &Product, quantity: u32) -> CartItem {
        CartItem::new(product.id, product.stall_id, quantity, product.unit_price)
    }

    /// A fresh customer whose cart holds `items`.
    pub async fn customer_with(&self, items: Vec<CartItem>) -> (CustomerId, Cart) {
        let customer = CustomerId::new();
        let cart = self.engine.carts.get_or_create(customer).await.unwrap();
        let cart = self
            .engine
            .carts
            .merge_items(customer, cart.id, items)
            .await
            .unwrap();
        (customer, cart)
    }

    pub async fn place(&self, customer: CustomerId, cart: &Cart, at: DateTime<Utc>) -> OrderPlacement {
        self.engine
            .orders
            .validate_and_create_order(customer, cart.id, self.stall.id, at, None)
            .await
            .unwrap()
    }

    /// Places a one-taco order at the default pickup time and returns it.
    pub async fn placed_order(&self) -> Order {
        let (customer, cart) = self.customer_with(vec![self.item(&self.tacos, 1)]).await;
        self.place(customer, &cart, pickup())
            .await
            .into_order()
            .expect("order should be created")
    }
}
