//! # Truck Repository
//!
//! Plates are unique; a duplicate surfaces as `DbError::UniqueViolation`
//! carrying the plate.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{ListQuery, Truck, TruckInput, TruckRow, TruckStatus};

use super::{clean, new_id, push_order_and_paging, push_search};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, plate, driver_id, capacity_tons, status";

#[derive(Debug, Clone)]
pub struct TruckRepository {
    pool: SqlitePool,
}

impl TruckRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TruckRepository { pool }
    }

    pub async fn create(&self, input: &TruckInput) -> DbResult<Truck> {
        input.validate()?;

        let truck = Truck {
            id: new_id(),
            plate: input.plate.trim().to_string(),
            driver_id: clean(input.driver_id.as_deref()),
            capacity_tons: input.capacity_tons,
            status: input.status,
        };

        debug!(plate = %truck.plate, "Inserting truck");

        sqlx::query(
            r#"
            INSERT INTO trucks (id, plate, driver_id, capacity_tons, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&truck.id)
        .bind(&truck.plate)
        .bind(&truck.driver_id)
        .bind(truck.capacity_tons)
        .bind(truck.status)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&truck.plate))?;

        Ok(truck)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Truck>> {
        let sql = format!("SELECT {COLUMNS} FROM trucks WHERE id = ?1");
        let truck = sqlx::query_as::<_, Truck>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(truck)
    }

    pub async fn get_by_plate(&self, plate: &str) -> DbResult<Option<Truck>> {
        let sql = format!("SELECT {COLUMNS} FROM trucks WHERE plate = ?1");
        let truck = sqlx::query_as::<_, Truck>(&sql)
            .bind(plate.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(truck)
    }

    pub async fn update(&self, id: &str, input: &TruckInput) -> DbResult<Truck> {
        input.validate()?;

        debug!(id = %id, "Updating truck");

        let plate = input.plate.trim();
        let result = sqlx::query(
            r#"
            UPDATE trucks SET
                plate = ?2,
                driver_id = ?3,
                capacity_tons = ?4,
                status = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(plate)
        .bind(clean(input.driver_id.as_deref()))
        .bind(input.capacity_tons)
        .bind(input.status)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(plate))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Truck", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Truck", id))
    }

    /// Moves a truck to another status (e.g. into maintenance).
    pub async fn set_status(&self, id: &str, status: TruckStatus) -> DbResult<()> {
        debug!(id = %id, status = status.as_str(), "Setting truck status");

        let result = sqlx::query("UPDATE trucks SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Truck", id));
        }

        Ok(())
    }

    /// Deletes the truck and its transport jobs.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting truck");

        let result = sqlx::query("DELETE FROM trucks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Truck", id));
        }

        Ok(())
    }

    /// Lists trucks by plate with their driver's name. Searches the plate;
    /// `status` filters exactly.
    pub async fn list(&self, query: &ListQuery, status: Option<TruckStatus>) -> DbResult<Vec<TruckRow>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                t.id, t.plate,
                d.first_name || ' ' || d.last_name AS driver,
                t.capacity_tons, t.status
            FROM trucks t
            LEFT JOIN drivers d ON d.id = t.driver_id
            WHERE 1 = 1
            "#,
        );
        push_search(&mut qb, query, &["t.plate"]);
        if let Some(status) = status {
            qb.push(" AND t.status = ").push_bind(status);
        }
        push_order_and_paging(&mut qb, "t.plate", query);

        let rows = qb.build_query_as::<TruckRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
