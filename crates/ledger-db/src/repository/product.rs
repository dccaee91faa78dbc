//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Name search with a sale-price range filter
//! - Stock reconciliation against purchase and sale history
//!
//! Stock is never written from here directly: it moves only through
//! purchases and sales (see [`super::stock`]).

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{ListQuery, MoneyRange, Product, ProductInput, Quantity, StockReconciliation};

use super::{clean, new_id, push_order_and_paging, push_search};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, name, description, average_purchase_price, sale_price, \
                       stock_quantity, created_at, updated_at";

const RECONCILE_SELECT: &str = r#"
    SELECT
        p.id AS product_id,
        p.name AS product,
        p.stock_quantity AS recorded,
        COALESCE((SELECT SUM(quantity) FROM purchases WHERE product_id = p.id), 0) AS purchased,
        COALESCE((SELECT SUM(quantity) FROM sales WHERE product_id = p.id), 0) AS sold
    FROM products p
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let products = db.products();
///
/// let maize = products.create(&input).await?;
/// let cheap = products
///     .list(&ListQuery::new().search("mai"), &MoneyRange { min: None, max: Some(Money::from_major(20)) })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product with zero stock.
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        input.validate()?;

        let now = Utc::now();
        let product = Product {
            id: new_id(),
            name: input.name.trim().to_string(),
            description: clean(input.description.as_deref()),
            average_purchase_price: input.average_purchase_price,
            sale_price: input.sale_price,
            stock_quantity: Quantity::zero(),
            created_at: now,
            updated_at: now,
        };

        debug!(name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, average_purchase_price, sale_price,
                stock_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.average_purchase_price)
        .bind(product.sale_price)
        .bind(product.stock_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Updates name, description and prices. Stock is left untouched.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        input.validate()?;

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                average_purchase_price = ?4,
                sale_price = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean(input.description.as_deref()))
        .bind(input.average_purchase_price)
        .bind(input.sale_price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product together with its purchases and sales.
    ///
    /// Customers interested in it keep their row with the interest cleared.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Lists products by name, searching the name and filtering on sale price.
    pub async fn list(&self, query: &ListQuery, sale_price: &MoneyRange) -> DbResult<Vec<Product>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM products WHERE 1 = 1"));
        push_search(&mut qb, query, &["name"]);
        if let Some(min) = sale_price.min {
            qb.push(" AND sale_price >= ").push_bind(min);
        }
        if let Some(max) = sale_price.max {
            qb.push(" AND sale_price <= ").push_bind(max);
        }
        push_order_and_paging(&mut qb, "name, created_at", query);

        let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Compares a product's recorded stock with `Σ purchases − Σ sales`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let report = db.products().reconcile_stock(&product_id).await?;
    /// if !report.is_consistent() {
    ///     warn!(discrepancy = %report.discrepancy(), "Stock drifted");
    /// }
    /// ```
    pub async fn reconcile_stock(&self, id: &str) -> DbResult<StockReconciliation> {
        let sql = format!("{RECONCILE_SELECT} WHERE p.id = ?1");
        sqlx::query_as::<_, StockReconciliation>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// [`reconcile_stock`](Self::reconcile_stock) for every product, by name.
    pub async fn reconcile_all(&self) -> DbResult<Vec<StockReconciliation>> {
        let sql = format!("{RECONCILE_SELECT} ORDER BY p.name");
        let reports = sqlx::query_as::<_, StockReconciliation>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(reports)
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
