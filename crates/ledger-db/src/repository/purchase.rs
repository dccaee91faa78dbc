//! # Purchase Repository
//!
//! Purchases bring goods into stock. Every write to a purchase row and the
//! stock adjustment it implies commit together or not at all.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update                                                        │
//! │                                                                         │
//! │  validate input ──► BEGIN                                               │
//! │                      ├── (update) load stored product/quantity/applied  │
//! │                      ├── StockPolicy::plan_save(Inbound, ...)           │
//! │                      ├── INSERT / UPDATE purchases (applied_quantity)   │
//! │                      ├── UPDATE products SET stock += delta ...         │
//! │                      └── COMMIT                                         │
//! │                                                                         │
//! │  Any failure (duplicate reference, missing product, ...) rolls back     │
//! │  the row and the stock change together.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{
    ListQuery, Purchase, PurchaseInput, PurchaseRow, ReferenceKind, StockDirection, StockPolicy,
};

use super::stock::{apply_adjustment, apply_all, load_recorded, StockLedger};
use super::{begin_write, clean, new_id, push_date_range, push_order_and_paging, push_search, reference_or_generate};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, reference, product_id, supplier_id, agent_id, quantity, unit_price, \
                       transport_cost, purchase_date, distance_to_hub, notes, applied_quantity, \
                       created_at, updated_at";

/// Repository for purchases.
///
/// ## Usage
/// ```rust,ignore
/// let purchase = db.purchases().create(&input).await?;
/// assert_eq!(purchase.reference.len(), 19); // ACH-YYYYMMDD-XXXXXX
/// ```
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
    stock_policy: StockPolicy,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool, stock_policy: StockPolicy) -> Self {
        PurchaseRepository { pool, stock_policy }
    }

    /// Records a purchase and adds its quantity to the product's stock.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - reference already used
    /// * `Err(DbError::ForeignKeyViolation)` - product, supplier or agent missing
    pub async fn create(&self, input: &PurchaseInput) -> DbResult<Purchase> {
        input.validate()?;

        let plan = self.stock_policy.plan_save(
            StockDirection::Inbound,
            None,
            &input.product_id,
            input.quantity,
        )?;

        let now = Utc::now();
        let purchase = Purchase {
            id: new_id(),
            reference: reference_or_generate(
                input.reference.as_deref(),
                ReferenceKind::Purchase,
                input.purchase_date,
            ),
            product_id: input.product_id.clone(),
            supplier_id: input.supplier_id.clone(),
            agent_id: input.agent_id.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            transport_cost: input.transport_cost,
            purchase_date: input.purchase_date,
            distance_to_hub: input.distance_to_hub,
            notes: clean(input.notes.as_deref()),
            applied_quantity: plan.applied,
            created_at: now,
            updated_at: now,
        };

        debug!(
            reference = %purchase.reference,
            product_id = %purchase.product_id,
            quantity = %purchase.quantity,
            "Inserting purchase"
        );

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, reference, product_id, supplier_id, agent_id,
                quantity, unit_price, transport_cost, purchase_date,
                distance_to_hub, notes, applied_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.reference)
        .bind(&purchase.product_id)
        .bind(&purchase.supplier_id)
        .bind(&purchase.agent_id)
        .bind(purchase.quantity)
        .bind(purchase.unit_price)
        .bind(purchase.transport_cost)
        .bind(purchase.purchase_date)
        .bind(purchase.distance_to_hub)
        .bind(&purchase.notes)
        .bind(purchase.applied_quantity)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_value(&purchase.reference))?;

        apply_all(&mut tx, &plan.adjustments).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(purchase)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let sql = format!("SELECT {COLUMNS} FROM purchases WHERE id = ?1");
        let purchase = sqlx::query_as::<_, Purchase>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(purchase)
    }

    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<Purchase>> {
        let sql = format!("SELECT {COLUMNS} FROM purchases WHERE reference = ?1");
        let purchase = sqlx::query_as::<_, Purchase>(&sql)
            .bind(reference.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(purchase)
    }

    /// Rewrites a purchase and moves stock according to the stock policy.
    ///
    /// A blank reference keeps the stored one.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no purchase with this id
    /// * `Err(DbError::Core(CoreError::StockFieldsLocked))` - quantity or
    ///   product changed under `StockPolicy::Immutable`
    pub async fn update(&self, id: &str, input: &PurchaseInput) -> DbResult<Purchase> {
        input.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        let previous = load_recorded(&mut tx, StockLedger::Purchases, id).await?;
        let plan = self.stock_policy.plan_save(
            StockDirection::Inbound,
            Some(&previous),
            &input.product_id,
            input.quantity,
        )?;
        let reference = clean(input.reference.as_deref()).unwrap_or(previous.reference);

        debug!(
            id = %id,
            reference = %reference,
            adjustments = plan.adjustments.len(),
            policy = self.stock_policy.as_str(),
            "Updating purchase"
        );

        sqlx::query(
            r#"
            UPDATE purchases SET
                reference = ?2,
                product_id = ?3,
                supplier_id = ?4,
                agent_id = ?5,
                quantity = ?6,
                unit_price = ?7,
                transport_cost = ?8,
                purchase_date = ?9,
                distance_to_hub = ?10,
                notes = ?11,
                applied_quantity = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&reference)
        .bind(&input.product_id)
        .bind(&input.supplier_id)
        .bind(&input.agent_id)
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(input.transport_cost)
        .bind(input.purchase_date)
        .bind(input.distance_to_hub)
        .bind(clean(input.notes.as_deref()))
        .bind(plan.applied)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_value(&reference))?;

        apply_all(&mut tx, &plan.adjustments).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))
    }

    /// Deletes a purchase. Under a compensating policy its applied quantity
    /// leaves stock again. Transport jobs linked to it lose the link.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        let recorded = load_recorded(&mut tx, StockLedger::Purchases, id).await?;

        debug!(id = %id, reference = %recorded.reference, "Deleting purchase");

        sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(adjustment) = self.stock_policy.plan_delete(
            StockDirection::Inbound,
            &recorded.product_id,
            recorded.applied,
        ) {
            apply_adjustment(&mut tx, &adjustment).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Lists purchases, most recent first. Searches the reference and the
    /// product name; the query's date range applies to the purchase date.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Vec<PurchaseRow>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                pu.id, pu.reference,
                p.name AS product,
                COALESCE(s.first_name || ' ', '') || s.last_name || ' - ' || s.village AS supplier,
                a.first_name || ' ' || a.last_name AS agent,
                pu.quantity, pu.unit_price, pu.transport_cost, pu.purchase_date
            FROM purchases pu
            JOIN products p ON p.id = pu.product_id
            JOIN suppliers s ON s.id = pu.supplier_id
            JOIN agents a ON a.id = pu.agent_id
            WHERE 1 = 1
            "#,
        );
        push_search(&mut qb, query, &["pu.reference", "p.name"]);
        push_date_range(&mut qb, "pu.purchase_date", &query.dates);
        push_order_and_paging(&mut qb, "pu.purchase_date DESC, pu.created_at DESC", query);

        let rows = qb.build_query_as::<PurchaseRow>().fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Listed purchases");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use ledger_core::{CoreError, Money};

    #[tokio::test]
    async fn test_create_adds_stock_and_generates_reference() {
        let db = memory_db(StockPolicy::Incremental).await;
        let (booker, dossou) = (agent(&db).await, supplier(&db, "Dossou").await);
        let maize = product(&db, "Maize").await;

        let mut input = purchase_input(&maize, &dossou, &booker, 100);
        input.transport_cost = Money::from_major(50);
        let purchase = db.purchases().create(&input).await.unwrap();

        assert!(purchase.reference.starts_with("ACH-20261002-"));
        assert_eq!(purchase.applied_quantity, units(100));
        assert_eq!(purchase.total(), Money::from_major(850));
        assert_eq!(stock_of(&db, &maize.id).await, units(100));

        let fetched = db
            .purchases()
            .get_by_reference(&purchase.reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, purchase.id);
        assert_eq!(fetched.purchase_date, day(2));
    }

    #[tokio::test]
    async fn test_duplicate_reference_rolls_back_stock() {
        let db = memory_db(StockPolicy::Incremental).await;
        let (booker, dossou) = (agent(&db).await, supplier(&db, "Dossou").await);
        let maize = product(&db, "Maize").await;

        let mut input = purchase_input(&maize, &dossou, &booker, 100);
        input.reference = Some("ACH-0001".to_string());
        db.purchases().create(&input).await.unwrap();

        let err = db.purchases().create(&input).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "purchases.reference");
                assert_eq!(value, "ACH-0001");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
        assert_eq!(stock_of(&db, &maize.id).await, units(100));
    }

    #[tokio::test]
    async fn test_missing_supplier_is_rejected() {
        let db = memory_db(StockPolicy::Incremental).await;
        let (booker, dossou) = (agent(&db).await, supplier(&db, "Dossou").await);
        let maize = product(&db, "Maize").await;

        let mut input = purchase_input(&maize, &dossou, &booker, 10);
        input.supplier_id = "550e8400-e29b-41d4-a716-446655440000".to_string();

        let err = db.purchases().create(&input).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(stock_of(&db, &maize.id).await.is_zero());
    }

    #[tokio::test]
    async fn test_incremental_update_moves_between_products() {
        let db = memory_db(StockPolicy::Incremental).await;
        let (booker, dossou) = (agent(&db).await, supplier(&db, "Dossou").await);
        let maize = product(&db, "Maize").await;
        let soy = product(&db, "Soy").await;

        let purchase = db
            .purchases()
            .create(&purchase_input(&maize, &dossou, &booker, 100))
            .await
            .unwrap();

        // A blank reference keeps the stored one
        let mut more = purchase_input(&maize, &dossou, &booker, 120);
        more.reference = Some(" ".to_string());
        let updated = db.purchases().update(&purchase.id, &more).await.unwrap();
        assert_eq!(updated.reference, purchase.reference);
        assert_eq!(stock_of(&db, &maize.id).await, units(120));

        db.purchases()
            .update(&purchase.id, &purchase_input(&soy, &dossou, &booker, 60))
            .await
            .unwrap();
        assert!(stock_of(&db, &maize.id).await.is_zero());
        assert_eq!(stock_of(&db, &soy.id).await, units(60));
    }

    #[tokio::test]
    async fn test_immutable_update_rejects_quantity_change() {
        let db = memory_db(StockPolicy::Immutable).await;
        let (booker, dossou) = (agent(&db).await, supplier(&db, "Dossou").await);
        let maize = product(&db, "Maize").await;

        let purchase = db
            .purchases()
            .create(&purchase_input(&maize, &dossou, &booker, 100))
            .await
            .unwrap();

        let err = db
            .purchases()
            .update(&purchase.id, &purchase_input(&maize, &dossou, &booker, 90))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::StockFieldsLocked { .. })));

        // Non-stock fields stay editable
        let mut input = purchase_input(&maize, &dossou, &booker, 100);
        input.unit_price = Money::from_major(9);
        let updated = db.purchases().update(&purchase.id, &input).await.unwrap();
        assert_eq!(updated.unit_price, Money::from_major(9));
        assert_eq!(stock_of(&db, &maize.id).await, units(100));
    }

    #[tokio::test]
    async fn test_delete_compensates_per_policy() {
        for (policy, expected) in [
            (StockPolicy::Incremental, 0),
            (StockPolicy::Immutable, 0),
            (StockPolicy::Reapply, 100),
        ] {
            let db = memory_db(policy).await;
            let (booker, dossou) = (agent(&db).await, supplier(&db, "Dossou").await);
            let maize = product(&db, "Maize").await;

            let purchase = db
                .purchases()
                .create(&purchase_input(&maize, &dossou, &booker, 100))
                .await
                .unwrap();
            db.purchases().delete(&purchase.id).await.unwrap();

            assert_eq!(stock_of(&db, &maize.id).await, units(expected), "policy {policy}");
            assert!(matches!(
                db.purchases().delete(&purchase.id).await,
                Err(DbError::NotFound { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_list_rows_and_date_filter() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let dossou = supplier(&db, "Dossou").await;
        let maize = product(&db, "Maize").await;
        let soy = product(&db, "Soy").await;

        db.purchases()
            .create(&purchase_input(&maize, &dossou, &booker, 10))
            .await
            .unwrap();
        let mut later = purchase_input(&soy, &dossou, &booker, 20);
        later.purchase_date = day(9);
        db.purchases().create(&later).await.unwrap();

        let rows = db.purchases().list(&ListQuery::new()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product, "Soy");
        assert_eq!(rows[0].supplier, "Dossou - Kalalé");
        assert_eq!(rows[0].agent, "Safi Bio");
        assert_eq!(rows[1].total(), Money::from_major(80));

        let early = db.purchases().list(&ListQuery::new().until(day(5))).await.unwrap();
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].product, "Maize");

        let by_product = db.purchases().list(&ListQuery::new().search("soy")).await.unwrap();
        assert_eq!(by_product.len(), 1);
        let by_reference = db.purchases().list(&ListQuery::new().search("ACH-2026")).await.unwrap();
        assert_eq!(by_reference.len(), 2);
    }
}
