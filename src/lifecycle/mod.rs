//! Runtime orchestration and lifecycle management.
//!
//! - [`OrderEngine`] starts the store actors, wires the services on top of
//!   them, and shuts everything down again.
//! - [`setup_tracing`] initializes logging.

pub mod engine;
pub mod tracing;

pub use engine::*;
pub use self::tracing::setup_tracing;
