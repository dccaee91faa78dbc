//! # Customer Repository
//!
//! Deleting a customer removes their sales; under a compensating stock
//! policy the sold quantities go back into stock first.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{Customer, CustomerInput, CustomerKind, CustomerRow, ListQuery, StockPolicy};

use super::stock::{delete_owner, StockLedger, StockOwner};
use super::{clean, new_id, push_date_range, push_order_and_paging, push_search};
use crate::error::{DbError, DbResult};

const COLUMNS: &str =
    "id, last_name, first_name, kind, phone, address, interested_product_id, created_at";

const OWNER: StockOwner = StockOwner {
    entity: "Customer",
    table: "customers",
    column: "customer_id",
    ledgers: &[StockLedger::Sales],
};

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    stock_policy: StockPolicy,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool, stock_policy: StockPolicy) -> Self {
        CustomerRepository { pool, stock_policy }
    }

    /// Inserts a customer; `created_at` is stamped here.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - interested product doesn't exist
    pub async fn create(&self, input: &CustomerInput) -> DbResult<Customer> {
        input.validate()?;

        let customer = Customer {
            id: new_id(),
            last_name: input.last_name.trim().to_string(),
            first_name: clean(input.first_name.as_deref()),
            kind: input.kind,
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
            interested_product_id: input.interested_product_id.clone(),
            created_at: Utc::now(),
        };

        debug!(name = %customer, kind = customer.kind.as_str(), "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, last_name, first_name, kind, phone, address,
                interested_product_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.last_name)
        .bind(&customer.first_name)
        .bind(customer.kind)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.interested_product_id)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn update(&self, id: &str, input: &CustomerInput) -> DbResult<Customer> {
        input.validate()?;

        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                last_name = ?2,
                first_name = ?3,
                kind = ?4,
                phone = ?5,
                address = ?6,
                interested_product_id = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.last_name.trim())
        .bind(clean(input.first_name.as_deref()))
        .bind(input.kind)
        .bind(input.phone.trim())
        .bind(input.address.trim())
        .bind(&input.interested_product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes the customer and their sales.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete_owner(&self.pool, self.stock_policy, OWNER, id).await
    }

    /// Lists customers, newest first. Searches last name, first name and
    /// phone; filters on kind and creation date.
    pub async fn list(
        &self,
        query: &ListQuery,
        kind: Option<CustomerKind>,
    ) -> DbResult<Vec<CustomerRow>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                c.id, c.last_name, c.first_name, c.kind, c.phone,
                p.name AS interested_product,
                c.created_at
            FROM customers c
            LEFT JOIN products p ON p.id = c.interested_product_id
            WHERE 1 = 1
            "#,
        );
        push_search(&mut qb, query, &["c.last_name", "c.first_name", "c.phone"]);
        if let Some(kind) = kind {
            qb.push(" AND c.kind = ").push_bind(kind);
        }
        push_date_range(&mut qb, "substr(c.created_at, 1, 10)", &query.dates);
        push_order_and_paging(&mut qb, "c.created_at DESC, c.last_name", query);

        let rows = qb.build_query_as::<CustomerRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
