//! # Supplier Repository
//!
//! Deleting a supplier removes its purchases; under a compensating stock
//! policy the stock they brought in is taken back out first.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{ListQuery, StockPolicy, Supplier, SupplierInput};

use super::stock::{delete_owner, StockLedger, StockOwner};
use super::{clean, new_id, push_date_range, push_order_and_paging, push_search};
use crate::error::{DbError, DbResult};

const COLUMNS: &str =
    "id, last_name, first_name, village, phone, notes, distance_to_hub, created_at";

const OWNER: StockOwner = StockOwner {
    entity: "Supplier",
    table: "suppliers",
    column: "supplier_id",
    ledgers: &[StockLedger::Purchases],
};

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
    stock_policy: StockPolicy,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool, stock_policy: StockPolicy) -> Self {
        SupplierRepository { pool, stock_policy }
    }

    /// Inserts a supplier; `created_at` is stamped here.
    pub async fn create(&self, input: &SupplierInput) -> DbResult<Supplier> {
        input.validate()?;

        let supplier = Supplier {
            id: new_id(),
            last_name: input.last_name.trim().to_string(),
            first_name: clean(input.first_name.as_deref()),
            village: input.village.trim().to_string(),
            phone: input.phone.trim().to_string(),
            notes: clean(input.notes.as_deref()),
            distance_to_hub: input.distance_to_hub,
            created_at: Utc::now(),
        };

        debug!(name = %supplier, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, last_name, first_name, village, phone, notes, distance_to_hub, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.last_name)
        .bind(&supplier.first_name)
        .bind(&supplier.village)
        .bind(&supplier.phone)
        .bind(&supplier.notes)
        .bind(supplier.distance_to_hub)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {COLUMNS} FROM suppliers WHERE id = ?1");
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    pub async fn update(&self, id: &str, input: &SupplierInput) -> DbResult<Supplier> {
        input.validate()?;

        debug!(id = %id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                last_name = ?2,
                first_name = ?3,
                village = ?4,
                phone = ?5,
                notes = ?6,
                distance_to_hub = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.last_name.trim())
        .bind(clean(input.first_name.as_deref()))
        .bind(input.village.trim())
        .bind(input.phone.trim())
        .bind(clean(input.notes.as_deref()))
        .bind(input.distance_to_hub)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Deletes the supplier and its purchases.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete_owner(&self.pool, self.stock_policy, OWNER, id).await
    }

    /// Lists suppliers by name. Searches last name and village; the query's
    /// date range applies to the creation date.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Vec<Supplier>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM suppliers WHERE 1 = 1"));
        push_search(&mut qb, query, &["last_name", "village"]);
        push_date_range(&mut qb, "substr(created_at, 1, 10)", &query.dates);
        push_order_and_paging(&mut qb, "last_name, village", query);

        let suppliers = qb.build_query_as::<Supplier>().fetch_all(&self.pool).await?;
        Ok(suppliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use ledger_core::Quantity;

    #[tokio::test]
    async fn test_create_stamps_creation_time() {
        let db = memory_db(StockPolicy::Incremental).await;
        let before = Utc::now();

        let created = db
            .suppliers()
            .create(&SupplierInput {
                last_name: "Dossou".to_string(),
                first_name: Some("Koffi".to_string()),
                village: "Kalalé".to_string(),
                phone: "97111111".to_string(),
                notes: Some("".to_string()),
                distance_to_hub: Some(Quantity::from_hundredths(12_550)),
            })
            .await
            .unwrap();

        assert!(created.created_at >= before);
        assert_eq!(created.notes, None);
        assert_eq!(created.to_string(), "Koffi Dossou - Kalalé");

        let fetched = db.suppliers().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.distance_to_hub, Some(Quantity::from_hundredths(12_550)));
        assert_eq!(fetched.created_at.timestamp(), created.created_at.timestamp());
    }

    #[tokio::test]
    async fn test_list_search_and_created_range() {
        let db = memory_db(StockPolicy::Incremental).await;
        supplier(&db, "Dossou").await;
        supplier(&db, "Yarou").await;

        let by_village = db.suppliers().list(&ListQuery::new().search("kalal")).await.unwrap();
        assert_eq!(by_village.len(), 2);

        let by_name = db.suppliers().list(&ListQuery::new().search("yar")).await.unwrap();
        assert_eq!(by_name.len(), 1);

        let today = Utc::now().date_naive();
        let created_today = db
            .suppliers()
            .list(&ListQuery::new().between(today, today))
            .await
            .unwrap();
        assert_eq!(created_today.len(), 2);

        let tomorrow = today.succ_opt().unwrap();
        let none = db.suppliers().list(&ListQuery::new().since(tomorrow)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reverses_purchased_stock() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let (dossou, yarou) = (supplier(&db, "Dossou").await, supplier(&db, "Yarou").await);
        let maize = product(&db, "Maize").await;
        let soy = product(&db, "Soy").await;

        for (p, qty) in [(&maize, 100), (&soy, 40), (&maize, 25)] {
            db.purchases()
                .create(&purchase_input(p, &dossou, &booker, qty))
                .await
                .unwrap();
        }
        db.purchases()
            .create(&purchase_input(&maize, &yarou, &booker, 10))
            .await
            .unwrap();

        db.suppliers().delete(&dossou.id).await.unwrap();

        assert_eq!(stock_of(&db, &maize.id).await, units(10));
        assert_eq!(stock_of(&db, &soy.id).await, Quantity::zero());
        assert_eq!(db.purchases().list(&ListQuery::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_under_reapply_leaves_stock() {
        let db = memory_db(StockPolicy::Reapply).await;
        let booker = agent(&db).await;
        let dossou = supplier(&db, "Dossou").await;
        let maize = product(&db, "Maize").await;
        db.purchases()
            .create(&purchase_input(&maize, &dossou, &booker, 100))
            .await
            .unwrap();

        db.suppliers().delete(&dossou.id).await.unwrap();

        assert_eq!(stock_of(&db, &maize.id).await, units(100));
    }
}
