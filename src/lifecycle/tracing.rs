//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden (`with_target(false)`); log lines
//! carry structured fields such as `entity_type`, `%order_id` and `%slot`
//! instead.
//!
//! ```bash
//! RUST_LOG=info cargo test   # lifecycle, creations, transitions
//! RUST_LOG=debug cargo test  # every store request and retry
//! ```
//!
//! With `RUST_LOG=info`, a successful placement reads roughly:
//!
//! ```text
//! INFO Actor started entity_type="Order"
//! INFO validate_and_create_order: Order created order_id=ord_… total=3596
//! INFO Order event order_id=ord_… status=pending
//! ```
//!
//! At `debug`, the span shows each store round trip: the cart read, the
//! ledger reservation (`Slot reserved`), the conditional cart clear and the
//! order insert.

/// Installs the global subscriber. Later calls are ignored.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths - we use entity_type instead
        .compact()
        .try_init();
}
