//! ActorEntity implementation for [`Cart`].
//!
//! Carts are keyed by their owning customer, so the store itself guarantees at
//! most one cart per customer. Carts have no in-store actions; every change is
//! a versioned `Put` issued by the cart manager.

use super::CartError;
use crate::framework::ActorEntity;
use crate::model::{Cart, CustomerId};
use std::convert::Infallible;

impl ActorEntity for Cart {
    type Id = CustomerId;
    type Action = Infallible;
    type ActionResult = Infallible;
    type Error = CartError;

    fn id(&self) -> CustomerId {
        self.customer_id
    }

    fn handle_action(&mut self, action: Infallible) -> Result<Infallible, CartError> {
        match action {}
    }
}
