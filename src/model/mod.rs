//! Plain records managed by the stores, plus the validation findings the
//! engine reports about them.

pub mod cart;
pub mod catalog;
pub mod ids;
pub mod ledger;
pub mod order;
pub mod validation;

pub use cart::*;
pub use catalog::*;
pub use ids::*;
pub use ledger::*;
pub use order::*;
pub use validation::*;

/// Money amounts in integer minor units (cents).
pub type Cents = i64;
