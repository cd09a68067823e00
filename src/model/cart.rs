//! The mutable pre-order basket.
//!
//! All mutations here are pure edits on an owned `Cart`. Persisting them is the
//! cart manager's job, which wraps each edit in a versioned write.

use super::{CartId, Cents, CustomerId, ProductId, StallId};
use crate::cart_actor::CartError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a line in the cart. Adding an item with an existing key merges
/// into that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub product_id: ProductId,
    pub stall_id: StallId,
    pub requested_time: Option<DateTime<Utc>>,
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.product_id, self.stall_id)?;
        if let Some(at) = self.requested_time {
            write!(f, "@{}", at.to_rfc3339())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub stall_id: StallId,
    pub quantity: u32,
    /// Unit price at the time the item was added.
    pub unit_price: Cents,
    pub requested_time: Option<DateTime<Utc>>,
    pub instructions: Option<String>,
}

impl CartItem {
    pub fn new(product_id: ProductId, stall_id: StallId, quantity: u32, unit_price: Cents) -> Self {
        Self {
            product_id,
            stall_id,
            quantity,
            unit_price,
            requested_time: None,
            instructions: None,
        }
    }

    pub fn at(mut self, requested_time: DateTime<Utc>) -> Self {
        self.requested_time = Some(requested_time);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn key(&self) -> ItemKey {
        ItemKey {
            product_id: self.product_id,
            stall_id: self.stall_id,
            requested_time: self.requested_time,
        }
    }

    pub fn line_total(&self) -> Cents {
        Cents::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
    items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(customer_id: CustomerId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: CartId::new(),
            customer_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn find(&self, key: &ItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.key() == *key)
    }

    /// Σ quantity × unit price over all lines.
    pub fn total(&self) -> Cents {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ quantity over all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Adds `item`, merging into an existing line with the same key.
    ///
    /// A merged line keeps its position, takes the newer unit price, and keeps
    /// its old instructions unless the new item carries some.
    pub fn add_item(&mut self, item: CartItem, max_quantity: u32, now: DateTime<Utc>) -> Result<(), CartError> {
        if item.quantity == 0 || item.quantity > max_quantity {
            return Err(CartError::InvalidQuantity {
                quantity: i64::from(item.quantity),
                max: max_quantity,
            });
        }
        if item.unit_price < 0 {
            return Err(CartError::InvalidPrice(item.unit_price));
        }

        let key = item.key();
        match self.items.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => {
                let requested = existing.quantity.saturating_add(item.quantity);
                if requested > max_quantity {
                    return Err(CartError::ItemLimitExceeded {
                        key,
                        requested,
                        max: max_quantity,
                    });
                }
                existing.quantity = requested;
                existing.unit_price = item.unit_price;
                if item.instructions.is_some() {
                    existing.instructions = item.instructions;
                }
            }
            None => self.items.push(item),
        }
        self.updated_at = now;
        Ok(())
    }

    /// Removes the line with `key`. Returns whether a line was removed.
    pub fn remove_item(&mut self, key: &ItemKey, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != *key);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Sets the quantity of the line with `key`. Zero or below removes it.
    pub fn update_quantity(
        &mut self,
        key: &ItemKey,
        quantity: i64,
        max_quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(key, now);
            return Ok(());
        }
        if quantity > i64::from(max_quantity) {
            return Err(CartError::ItemLimitExceeded {
                key: *key,
                requested: u32::try_from(quantity).unwrap_or(u32::MAX),
                max: max_quantity,
            });
        }
        let line = self
            .items
            .iter_mut()
            .find(|item| item.key() == *key)
            .ok_or(CartError::ItemNotFound(*key))?;
        // Bounded by max_quantity above.
        line.quantity = quantity as u32;
        self.updated_at = now;
        Ok(())
    }

    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.updated_at = now;
    }

    /// Puts checked-out lines back. An empty cart takes them as they were;
    /// otherwise each line is merged and the ones that no longer fit are
    /// returned with the reason.
    pub(crate) fn restore_items(
        &mut self,
        items: Vec<CartItem>,
        max_quantity: u32,
        now: DateTime<Utc>,
    ) -> Vec<(ItemKey, CartError)> {
        if self.items.is_empty() {
            self.items = items;
            self.updated_at = now;
            return Vec::new();
        }
        items
            .into_iter()
            .filter_map(|item| {
                let key = item.key();
                self.add_item(item, max_quantity, now).err().map(|e| (key, e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn cart() -> Cart {
        Cart::new(CustomerId::new(), now(), Duration::hours(24))
    }

    #[test]
    fn same_key_merges_into_one_line() {
        let mut cart = cart();
        let item = CartItem::new(ProductId::new(), StallId::new(), 2, 800);
        cart.add_item(item.clone(), 100, now()).unwrap();
        cart.add_item(CartItem { quantity: 3, ..item.clone() }, 100, now()).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn different_requested_time_is_a_separate_line() {
        let mut cart = cart();
        let item = CartItem::new(ProductId::new(), StallId::new(), 1, 800);
        cart.add_item(item.clone(), 100, now()).unwrap();
        cart.add_item(item.at(now() + Duration::hours(2)), 100, now()).unwrap();

        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn merge_beyond_cap_fails_and_leaves_line_untouched() {
        let mut cart = cart();
        let item = CartItem::new(ProductId::new(), StallId::new(), 60, 800);
        cart.add_item(item.clone(), 100, now()).unwrap();

        let err = cart.add_item(CartItem { quantity: 41, ..item }, 100, now()).unwrap_err();
        assert!(matches!(err, CartError::ItemLimitExceeded { requested: 101, max: 100, .. }));
        assert_eq!(cart.items()[0].quantity, 60);
    }

    #[test]
    fn zero_quantity_add_is_rejected() {
        let mut cart = cart();
        let err = cart
            .add_item(CartItem::new(ProductId::new(), StallId::new(), 0, 800), 100, now())
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { quantity: 0, .. }));
    }

    #[test]
    fn merge_refreshes_instructions_only_when_supplied() {
        let mut cart = cart();
        let item = CartItem::new(ProductId::new(), StallId::new(), 1, 800);
        cart.add_item(item.clone().with_instructions("no onion"), 100, now()).unwrap();
        cart.add_item(item.clone(), 100, now()).unwrap();
        assert_eq!(cart.items()[0].instructions.as_deref(), Some("no onion"));

        cart.add_item(item.with_instructions("extra salsa"), 100, now()).unwrap();
        assert_eq!(cart.items()[0].instructions.as_deref(), Some("extra salsa"));
    }

    #[test]
    fn update_to_zero_removes_and_absent_remove_is_noop() {
        let mut cart = cart();
        let item = CartItem::new(ProductId::new(), StallId::new(), 4, 800);
        let key = item.key();
        cart.add_item(item, 100, now()).unwrap();

        cart.update_quantity(&key, 0, 100, now()).unwrap();
        assert!(cart.is_empty());
        assert!(!cart.remove_item(&key, now()));
        cart.update_quantity(&key, -3, 100, now()).unwrap();
    }

    #[test]
    fn restore_reports_lines_that_no_longer_fit() {
        let mut cart = cart();
        let stall = StallId::new();
        let crowded = CartItem::new(ProductId::new(), stall, 70, 800);
        let other = CartItem::new(ProductId::new(), stall, 2, 500);
        cart.add_item(crowded.clone(), 100, now()).unwrap();

        let items = vec![CartItem { quantity: 40, ..crowded.clone() }, other.clone()];
        let dropped = cart.restore_items(items, 100, now());

        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].0, crowded.key());
        assert!(matches!(dropped[0].1, CartError::ItemLimitExceeded { requested: 110, .. }));
        assert_eq!(cart.items()[0].quantity, 70);
        assert_eq!(cart.find(&other.key()).map(|i| i.quantity), Some(2));
    }

    #[test]
    fn restore_into_empty_cart_keeps_lines_verbatim() {
        let mut cart = cart();
        let items = vec![
            CartItem::new(ProductId::new(), StallId::new(), 3, 800).with_instructions("no onion"),
            CartItem::new(ProductId::new(), StallId::new(), 1, 500),
        ];
        assert!(cart.restore_items(items.clone(), 100, now()).is_empty());
        assert_eq!(cart.items(), &items[..]);
    }

    #[test]
    fn clear_keeps_identity_and_expiry() {
        let mut cart = cart();
        let (id, expires_at) = (cart.id, cart.expires_at);
        cart.add_item(CartItem::new(ProductId::new(), StallId::new(), 1, 100), 100, now()).unwrap();
        cart.clear(now() + Duration::minutes(5));

        assert!(cart.is_empty());
        assert_eq!(cart.id, id);
        assert_eq!(cart.expires_at, expires_at);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add { product: usize, quantity: u32, price: Cents },
        Update { product: usize, quantity: i64 },
        Remove { product: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..4usize, 1..=30u32, 1..5_000i64).prop_map(|(product, quantity, price)| Op::Add { product, quantity, price }),
            (0..4usize, -5..=120i64).prop_map(|(product, quantity)| Op::Update { product, quantity }),
            (0..4usize).prop_map(|product| Op::Remove { product }),
        ]
    }

    proptest! {
        #[test]
        fn total_matches_independent_model(ops in proptest::collection::vec(op(), 0..40)) {
            let stall = StallId::new();
            let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
            let key = |p: usize| ItemKey { product_id: products[p], stall_id: stall, requested_time: None };
            let mut cart = cart();
            let mut model: HashMap<usize, (u32, Cents)> = HashMap::new();

            for op in ops {
                match op {
                    Op::Add { product, quantity, price } => {
                        let added = cart.add_item(CartItem::new(products[product], stall, quantity, price), 100, now());
                        let merged = model.get(&product).map_or(quantity, |(q, _)| q + quantity);
                        prop_assert_eq!(added.is_ok(), merged <= 100);
                        if merged <= 100 {
                            model.insert(product, (merged, price));
                        }
                    }
                    Op::Update { product, quantity } => {
                        let updated = cart.update_quantity(&key(product), quantity, 100, now());
                        if quantity <= 0 {
                            model.remove(&product);
                        } else if updated.is_ok() {
                            if let Some(line) = model.get_mut(&product) {
                                line.0 = quantity as u32;
                            }
                        }
                    }
                    Op::Remove { product } => {
                        cart.remove_item(&key(product), now());
                        model.remove(&product);
                    }
                }
            }

            let expected: Cents = model.values().map(|(q, p)| Cents::from(*q) * p).sum();
            let count: u64 = model.values().map(|(q, _)| u64::from(*q)).sum();
            prop_assert_eq!(cart.total(), expected);
            prop_assert_eq!(cart.item_count(), count);
            prop_assert_eq!(cart.items().len(), model.len());
            let keys: HashSet<ItemKey> = cart.items().iter().map(CartItem::key).collect();
            prop_assert_eq!(keys.len(), cart.items().len());
        }
    }
}
