//! # Transport Repository
//!
//! Truck trips. A transport job never moves stock; it may point at the
//! purchase or sale it carried goods for.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{ListQuery, ReferenceKind, TransportJob, TransportJobInput, TransportRow};

use super::{clean, new_id, push_date_range, push_order_and_paging, push_search, reference_or_generate};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, reference, truck_id, driver_id, transport_date, destination, \
                       price_paid, purchase_id, sale_id, notes, created_at";

#[derive(Debug, Clone)]
pub struct TransportRepository {
    pool: SqlitePool,
}

impl TransportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransportRepository { pool }
    }

    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - reference already used
    /// * `Err(DbError::ForeignKeyViolation)` - truck, driver, purchase or sale missing
    pub async fn create(&self, input: &TransportJobInput) -> DbResult<TransportJob> {
        input.validate()?;

        let job = TransportJob {
            id: new_id(),
            reference: reference_or_generate(
                input.reference.as_deref(),
                ReferenceKind::Transport,
                input.transport_date,
            ),
            truck_id: input.truck_id.clone(),
            driver_id: input.driver_id.clone(),
            transport_date: input.transport_date,
            destination: input.destination.trim().to_string(),
            price_paid: input.price_paid,
            purchase_id: clean(input.purchase_id.as_deref()),
            sale_id: clean(input.sale_id.as_deref()),
            notes: clean(input.notes.as_deref()),
            created_at: Utc::now(),
        };

        debug!(job = %job, "Inserting transport job");

        sqlx::query(
            r#"
            INSERT INTO transports (
                id, reference, truck_id, driver_id, transport_date, destination,
                price_paid, purchase_id, sale_id, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&job.id)
        .bind(&job.reference)
        .bind(&job.truck_id)
        .bind(&job.driver_id)
        .bind(job.transport_date)
        .bind(&job.destination)
        .bind(job.price_paid)
        .bind(&job.purchase_id)
        .bind(&job.sale_id)
        .bind(&job.notes)
        .bind(job.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&job.reference))?;

        Ok(job)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TransportJob>> {
        let sql = format!("SELECT {COLUMNS} FROM transports WHERE id = ?1");
        let job = sqlx::query_as::<_, TransportJob>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    /// A blank reference keeps the stored one.
    pub async fn update(&self, id: &str, input: &TransportJobInput) -> DbResult<TransportJob> {
        input.validate()?;

        debug!(id = %id, "Updating transport job");

        let reference = clean(input.reference.as_deref());
        let result = sqlx::query(
            r#"
            UPDATE transports SET
                reference = COALESCE(?2, reference),
                truck_id = ?3,
                driver_id = ?4,
                transport_date = ?5,
                destination = ?6,
                price_paid = ?7,
                purchase_id = ?8,
                sale_id = ?9,
                notes = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&reference)
        .bind(&input.truck_id)
        .bind(&input.driver_id)
        .bind(input.transport_date)
        .bind(input.destination.trim())
        .bind(input.price_paid)
        .bind(clean(input.purchase_id.as_deref()))
        .bind(clean(input.sale_id.as_deref()))
        .bind(clean(input.notes.as_deref()))
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(reference.clone().unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TransportJob", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("TransportJob", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting transport job");

        let result = sqlx::query("DELETE FROM transports WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TransportJob", id));
        }

        Ok(())
    }

    /// Lists transport jobs, most recent first, with truck plate and driver
    /// name. Searches reference and destination.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Vec<TransportRow>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                tr.id, tr.reference,
                t.plate AS truck,
                d.first_name || ' ' || d.last_name AS driver,
                tr.transport_date, tr.destination, tr.price_paid
            FROM transports tr
            JOIN trucks t ON t.id = tr.truck_id
            JOIN drivers d ON d.id = tr.driver_id
            WHERE 1 = 1
            "#,
        );
        push_search(&mut qb, query, &["tr.reference", "tr.destination"]);
        push_date_range(&mut qb, "tr.transport_date", &query.dates);
        push_order_and_paging(&mut qb, "tr.transport_date DESC, tr.created_at DESC", query);

        let rows = qb.build_query_as::<TransportRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
