//! # Driver Repository

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{Driver, DriverInput, ListQuery};

use super::{new_id, push_order_and_paging, push_search};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, last_name, first_name, phone, city";

#[derive(Debug, Clone)]
pub struct DriverRepository {
    pool: SqlitePool,
}

impl DriverRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DriverRepository { pool }
    }

    pub async fn create(&self, input: &DriverInput) -> DbResult<Driver> {
        input.validate()?;

        let driver = Driver {
            id: new_id(),
            last_name: input.last_name.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            city: input.city.trim().to_string(),
        };

        debug!(name = %driver, "Inserting driver");

        sqlx::query(
            "INSERT INTO drivers (id, last_name, first_name, phone, city) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&driver.id)
        .bind(&driver.last_name)
        .bind(&driver.first_name)
        .bind(&driver.phone)
        .bind(&driver.city)
        .execute(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Driver>> {
        let sql = format!("SELECT {COLUMNS} FROM drivers WHERE id = ?1");
        let driver = sqlx::query_as::<_, Driver>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    pub async fn update(&self, id: &str, input: &DriverInput) -> DbResult<Driver> {
        input.validate()?;

        debug!(id = %id, "Updating driver");

        let result = sqlx::query(
            r#"
            UPDATE drivers SET
                last_name = ?2,
                first_name = ?3,
                phone = ?4,
                city = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.last_name.trim())
        .bind(input.first_name.trim())
        .bind(input.phone.trim())
        .bind(input.city.trim())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Driver", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Driver", id))
    }

    /// Deletes the driver. Their trucks stay, unassigned; their transport
    /// jobs are removed.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting driver");

        let result = sqlx::query("DELETE FROM drivers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Driver", id));
        }

        Ok(())
    }

    /// Lists drivers by name, searching last name, first name and phone.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Vec<Driver>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM drivers WHERE 1 = 1"));
        push_search(&mut qb, query, &["last_name", "first_name", "phone"]);
        push_order_and_paging(&mut qb, "last_name, first_name", query);

        let drivers = qb.build_query_as::<Driver>().fetch_all(&self.pool).await?;
        Ok(drivers)
    }
}
