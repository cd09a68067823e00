use crate::cart::CartManager;
use crate::clients::{CatalogGateway, ProductClient, StallClient, StoreCatalog};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::notify::{NotificationSink, Notifier};
use crate::orders::OrderService;
use crate::validation::{AvailabilityValidator, SchedulingValidator};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info};

/// The running engine: store actors plus the services built on them.
///
/// # Architecture
///
/// Five store actors run in their own Tokio tasks:
/// - **Carts**, keyed by customer
/// - **Orders**
/// - **Capacity ledgers**, keyed by (stall, local day)
/// - **Products** and **Stalls**, which back the in-process catalog
///
/// [`CartManager`] and [`OrderService`] are the caller-facing API. The
/// product and stall clients are exposed for seeding and maintaining the
/// catalog.
///
/// # Example
///
/// ```ignore
/// let engine = OrderEngine::start(EngineConfig::from_env(), Arc::new(SystemClock), Arc::new(TracingSink));
///
/// let cart = engine.carts.get_or_create(customer_id).await?;
/// engine.carts.add_item(customer_id, cart.id, item).await?;
/// let placement = engine
///     .orders
///     .validate_and_create_order(customer_id, cart.id, stall_id, pickup_at, None)
///     .await?;
///
/// engine.shutdown().await?;
/// ```
pub struct OrderEngine {
    pub carts: CartManager,
    pub orders: OrderService,
    pub products: ProductClient,
    pub stalls: StallClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderEngine {
    /// Spawns the store actors and wires the services. Must be called from
    /// within a Tokio runtime. Out-of-range durations in `config` are
    /// replaced with their defaults.
    pub fn start(config: EngineConfig, clock: Arc<dyn Clock>, sink: Arc<dyn NotificationSink>) -> Self {
        let config = config.sanitized();
        let buffer = config.store_buffer.max(1);
        let config = Arc::new(config);

        let (cart_actor, cart_client) = crate::cart_actor::new(buffer);
        let (order_actor, order_client) = crate::order_actor::new(buffer);
        let (ledger_actor, ledger_client) = crate::ledger_actor::new(buffer);
        let (product_actor, product_client) = crate::product_actor::new(buffer);
        let (stall_actor, stall_client) = crate::stall_actor::new(buffer);

        let handles = vec![
            tokio::spawn(cart_actor.run()),
            tokio::spawn(order_actor.run()),
            tokio::spawn(ledger_actor.run()),
            tokio::spawn(product_actor.run()),
            tokio::spawn(stall_actor.run()),
        ];

        let catalog: Arc<dyn CatalogGateway> =
            Arc::new(StoreCatalog::new(product_client.clone(), stall_client.clone()));

        let carts = CartManager::new(cart_client, catalog.clone(), clock.clone(), config.clone());
        let availability = AvailabilityValidator::new(catalog.clone(), config.clone());
        let scheduling = SchedulingValidator::new(
            catalog,
            ledger_client.clone(),
            order_client.clone(),
            clock.clone(),
            config.clone(),
        );
        let orders = OrderService::new(
            carts.clone(),
            availability,
            scheduling,
            order_client,
            ledger_client,
            Notifier::new(sink),
            clock,
            config,
        );

        info!(stores = handles.len(), "Order engine started");
        Self {
            carts,
            orders,
            products: product_client,
            stalls: stall_client,
            handles,
        }
    }

    /// Gracefully shuts down the engine.
    ///
    /// Dropping the services closes the store channels, and each actor exits
    /// its loop once its last client is gone. Clones of the services held
    /// elsewhere keep their stores alive, so drop them first.
    ///
    /// Returns the first actor task failure, if any.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down order engine...");

        let Self {
            carts,
            orders,
            products,
            stalls,
            handles,
        } = self;
        drop(orders);
        drop(carts);
        drop(products);
        drop(stalls);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(e);
            }
        }

        info!("Order engine shutdown complete.");
        Ok(())
    }
}
