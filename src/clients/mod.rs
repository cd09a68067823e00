//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod cart_client;
pub mod catalog;
pub mod ledger_client;
pub mod order_client;
pub mod product_client;
pub mod stall_client;

pub use cart_client::*;
pub use catalog::*;
pub use ledger_client::*;
pub use order_client::*;
pub use product_client::*;
pub use stall_client::*;
