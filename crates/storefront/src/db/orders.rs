//! Order repository: append-only order storage.
//!
//! An order and all of its items are written in one transaction. Either the
//! whole order is visible afterwards or none of it is. Each order carries the
//! checkout token it was placed with; a second insert under the same token
//! writes nothing and returns the existing order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use minishop_core::{
    ContactDetails, Email, Money, NewOrder, Order, OrderId, OrderItem, Price, Quantity,
};

use super::{RepositoryError, map_write_error};
use crate::services::OrderStore;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    total: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    name: String,
    quantity: i32,
    unit_price: Decimal,
}

#[derive(sqlx::FromRow)]
struct InsertedOrder {
    id: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::try_from(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid quantity in order {}: {e}",
                row.order_id
            ))
        })?;
        let unit_price = Price::new(row.unit_price).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid unit price in order {}: {e}",
                row.order_id
            ))
        })?;

        Ok(Self {
            name: row.name,
            quantity,
            unit_price,
        })
    }
}

fn build_order(row: OrderRow, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
    let email = Email::parse(&row.email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in order {}: {e}", row.id))
    })?;
    let total = Money::new(row.total).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid total in order {}: {e}", row.id))
    })?;

    Ok(Order {
        id: OrderId::new(row.id),
        contact: ContactDetails::from_stored(row.name, email, row.address),
        items,
        total,
        created_at: row.created_at,
    })
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order and its items atomically.
    ///
    /// If an order already exists for `checkout_token`, it is returned
    /// unchanged and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a column constraint rejects a value.
    /// Returns `RepositoryError::Database` for other database errors. Nothing is
    /// written in either case.
    #[tracing::instrument(skip(self, order), fields(items = order.items().len(), total = %order.total()))]
    pub async fn create(
        &self,
        order: &NewOrder,
        checkout_token: Uuid,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let contact = order.contact();
        let inserted = sqlx::query_as::<_, InsertedOrder>(
            r#"
            INSERT INTO shop."order" (checkout_token, name, email, address, total)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (checkout_token) DO NOTHING
            RETURNING id, created_at
            "#,
        )
        .bind(checkout_token)
        .bind(contact.name())
        .bind(contact.email())
        .bind(contact.address())
        .bind(order.total().amount())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let Some(inserted) = inserted else {
            tx.rollback().await?;
            tracing::info!("Checkout token already used, returning the stored order");
            return self.get_by_checkout_token(checkout_token).await?.ok_or_else(|| {
                RepositoryError::Conflict(format!(
                    "checkout token {checkout_token} is taken but has no order"
                ))
            });
        };

        for (position, item) in (0_i32..).zip(order.items()) {
            sqlx::query(
                r"
                INSERT INTO shop.order_item (order_id, position, name, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(inserted.id)
            .bind(position)
            .bind(&item.name)
            .bind(i32::from(item.quantity))
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;

        tracing::info!(order_id = inserted.id, "Order stored");
        Ok(order
            .clone()
            .into_order(OrderId::new(inserted.id), inserted.created_at))
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, name, email, address, total, created_at
            FROM shop."order"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => self.with_items(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Get the order placed with a checkout token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_by_checkout_token(
        &self,
        checkout_token: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, name, email, address, total, created_at
            FROM shop."order"
            WHERE checkout_token = $1
            "#,
        )
        .bind(checkout_token)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => self.with_items(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn with_items(&self, row: OrderRow) -> Result<Order, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, name, quantity, unit_price
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY position
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        build_order(row, items)
    }

    /// List the most recent orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, name, email, address, total, created_at
            FROM shop."order"
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, name, quantity, unit_price
            FROM shop.order_item
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for item_row in item_rows {
            let order_id = item_row.order_id;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(OrderItem::try_from(item_row)?);
        }

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            orders.push(build_order(row, items)?);
        }
        Ok(orders)
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn append(
        &self,
        order: &NewOrder,
        checkout_token: Uuid,
    ) -> Result<Order, RepositoryError> {
        self.create(order, checkout_token).await
    }
}
