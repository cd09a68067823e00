//! # Order Engine
//!
//! > **Carts in, schedulable orders out.**
//!
//! This crate turns a customer's mutable cart into an immutable order for a
//! market stall. Along the way it enforces inventory, pricing, opening hours
//! and per-day capacity, flags congested time slots, and then drives the order
//! through its status lifecycle.
//!
//! ## Core Concepts
//!
//! ### Versioned record stores
//! Every record type lives in its own `ResourceActor<T>` task. The actor
//! processes one request at a time, which makes its conditional writes atomic:
//! put-if-not-exists, put-if-version-matches, and record-specific actions
//! (see [`framework`]).
//!
//! ### Optimistic carts
//! Cart edits are read, edit, conditional write. A write that loses a race is
//! retried from a fresh read a bounded number of times, then surfaces as
//! [`EngineError::Contention`](error::EngineError::Contention).
//!
//! ### Capacity ledgers
//! Each (stall, local day) has a ledger of admitted orders. Admission is a
//! single check-and-insert action, so concurrent checkouts can never overbook
//! a day. Cancelling an order frees its slot.
//!
//! ### Findings, not failures
//! Validation problems come back as structured [`ValidationResult`](model::ValidationResult)
//! findings: blocking errors stop the order, warnings ride along with it.
//! [`EngineError`](error::EngineError) is kept for requests the engine could
//! not carry out.
//!
//! ## Module Tour
//!
//! - [`framework`]: the generic actor store, its client, and test mocks.
//! - [`model`]: carts, catalog records, orders, ledgers, validation findings.
//! - [`cart_actor`], [`order_actor`], [`ledger_actor`], [`product_actor`],
//!   [`stall_actor`]: per-record store setup, errors and actions.
//! - [`clients`]: typed wrappers over the stores, plus the catalog gateway.
//! - [`cart`]: the cart manager.
//! - [`validation`]: availability and scheduling validators.
//! - [`orders`]: order assembly, placement and status transitions.
//! - [`notify`]: best-effort order event delivery.
//! - [`lifecycle`]: [`OrderEngine`](lifecycle::OrderEngine) start/shutdown and tracing setup.
//!
//! ## Running Tests
//!
//! ```bash
//! RUST_LOG=debug cargo test
//! ```

pub mod cart;
pub mod cart_actor;
pub mod clients;
pub mod clock;
pub mod config;
pub mod error;
pub mod framework;
pub mod ledger_actor;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod orders;
pub mod product_actor;
pub mod stall_actor;
pub mod validation;
