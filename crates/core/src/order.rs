//! Frozen order snapshots.
//!
//! An order copies each line's name, quantity, and unit price at checkout so
//! later catalog edits or deletions never change what was bought.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::LineItem;
use crate::types::{ContactDetails, Money, OrderId, Price, Quantity};

/// One purchased line, detached from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name at the time of purchase.
    pub name: String,
    pub quantity: Quantity,
    /// Unit price at the time of purchase.
    pub unit_price: Price,
}

impl OrderItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

impl From<&LineItem> for OrderItem {
    fn from(line: &LineItem) -> Self {
        Self {
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price: line.product.price,
        }
    }
}

/// An order that has been built but not yet persisted.
///
/// Only constructible from resolved line items, so it always has at least one
/// item and its total is the sum of the snapshotted line totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    contact: ContactDetails,
    items: Vec<OrderItem>,
    total: Money,
}

impl NewOrder {
    /// Snapshot resolved line items into an order.
    ///
    /// Returns `None` when there are no lines to buy.
    #[must_use]
    pub fn from_lines<'a, I>(contact: ContactDetails, lines: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let mut items = Vec::new();
        let mut total = Money::ZERO;
        for line in lines {
            items.push(OrderItem::from(line));
            total += line.line_total;
        }

        if items.is_empty() {
            return None;
        }

        Some(Self {
            contact,
            items,
            total,
        })
    }

    /// Who the order is for.
    #[must_use]
    pub const fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Snapshotted items, in cart order.
    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Order total.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Attach the id and timestamp the store assigned on append.
    #[must_use]
    pub fn into_order(self, id: OrderId, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            contact: self.contact,
            items: self.items,
            total: self.total,
            created_at,
        }
    }
}

/// A persisted order. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub contact: ContactDetails,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}
