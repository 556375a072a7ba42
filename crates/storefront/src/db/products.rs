//! Product repository: the `PostgreSQL` catalog.

use rust_decimal::Decimal;
use sqlx::PgPool;

use minishop_core::{NewProduct, Price, Product, ProductId};

use super::{RepositoryError, map_write_error};
use crate::services::Catalog;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    image: Option<String>,
    description: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            image: row.image,
            description: row.description,
        })
    }
}

/// Repository for catalog reads and seeding.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, image, description
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// List every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, image, description
            FROM shop.product
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Insert products in one transaction and return them with their
    /// assigned ids, in input order.
    ///
    /// Either every product is inserted or none is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a column constraint rejects a product.
    /// Returns `RepositoryError::Database` for other database errors.
    #[tracing::instrument(skip_all, fields(products = products.len()))]
    pub async fn insert_all(
        &self,
        products: &[NewProduct],
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut inserted = Vec::with_capacity(products.len());
        for product in products {
            inserted.push(insert_one(&mut *tx, product).await?);
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

async fn insert_one<'e, E>(executor: E, product: &NewProduct) -> Result<Product, RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, ProductRow>(
        r"
        INSERT INTO shop.product (name, price, image, description)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, price, image, description
        ",
    )
    .bind(product.name.trim())
    .bind(product.price)
    .bind(product.image.as_deref())
    .bind(product.description.as_deref())
    .fetch_one(executor)
    .await
    .map_err(map_write_error)?;

    Product::try_from(row)
}

impl Catalog for ProductRepository<'_> {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.get_by_id(id).await
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.list_all().await
    }
}
