//! The per-visitor shopping cart.
//!
//! A [`Cart`] maps product ids to quantities and nothing else: it holds no
//! names or prices, so it can never disagree with the catalog. Prices are
//! joined in at read time as [`LineItem`]s.
//!
//! # Invariants
//!
//! - Every entry has a quantity of at least 1. Operations that would take an
//!   entry to zero remove it instead.
//! - A product id appears at most once.
//! - Entries keep the order in which products were first added.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Money, ProductId, Quantity};

/// One product and how many of it the visitor wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// A visitor's cart.
///
/// Serialized as a list of entries so it can live in a session record. A
/// record with a repeated product id is merged on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns true if the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in the order they were added.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &CartEntry> {
        self.entries.iter()
    }

    /// Sum of all quantities (the number shown on a cart badge).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity.get()))
            .sum()
    }

    /// Quantity of a product, or `None` if it is not in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<Quantity> {
        self.entry(product_id).map(|entry| entry.quantity)
    }

    /// Add one unit: increments an existing entry or appends a new one.
    ///
    /// Returns the quantity now in the cart.
    pub fn add_one(&mut self, product_id: ProductId) -> Quantity {
        if let Some(entry) = self.entry_mut(product_id) {
            entry.quantity = entry.quantity.incremented();
            return entry.quantity;
        }
        self.entries.push(CartEntry {
            product_id,
            quantity: Quantity::ONE,
        });
        Quantity::ONE
    }

    /// Remove a product. Returns false if it was not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.product_id != product_id);
        self.entries.len() != before
    }

    /// Increment an existing entry. Never adds a product that is absent.
    pub fn increase(&mut self, product_id: ProductId) -> bool {
        self.entry_mut(product_id).is_some_and(|entry| {
            entry.quantity = entry.quantity.incremented();
            true
        })
    }

    /// Decrement an existing entry, removing it when the last unit goes.
    pub fn decrease(&mut self, product_id: ProductId) -> bool {
        let Some(entry) = self.entry_mut(product_id) else {
            return false;
        };
        match entry.quantity.decremented() {
            Some(quantity) => entry.quantity = quantity,
            None => {
                self.remove(product_id);
            }
        }
        true
    }

    /// Overwrite the quantity of an existing entry. Never adds a product that
    /// is absent.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: Quantity) -> bool {
        self.entry_mut(product_id).is_some_and(|entry| {
            entry.quantity = quantity;
            true
        })
    }

    /// Drop every entry whose product id is listed. Returns how many went.
    pub fn prune(&mut self, product_ids: &[ProductId]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !product_ids.contains(&entry.product_id));
        before - self.entries.len()
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries
            .iter()
            .find(|entry| entry.product_id == product_id)
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut CartEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.product_id == product_id)
    }
}

impl From<Vec<CartEntry>> for Cart {
    fn from(raw: Vec<CartEntry>) -> Self {
        let mut cart = Self::new();
        for incoming in raw {
            match cart.entry_mut(incoming.product_id) {
                Some(entry) => {
                    let merged = entry
                        .quantity
                        .get()
                        .saturating_add(incoming.quantity.get())
                        .min(Quantity::MAX);
                    entry.quantity = Quantity::new(merged).unwrap_or(entry.quantity);
                }
                None => cart.entries.push(incoming),
            }
        }
        cart
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}

/// A cart entry resolved against the catalog's current price.
///
/// Derived on every read and never stored: if the catalog price changes, the
/// next view shows the new price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub product: Product,
    pub quantity: Quantity,
    pub line_total: Money,
}

impl LineItem {
    /// Join a product with the quantity the cart holds for it.
    #[must_use]
    pub fn new(product: Product, quantity: Quantity) -> Self {
        let line_total = product.price * quantity;
        Self {
            product,
            quantity,
            line_total,
        }
    }
}
