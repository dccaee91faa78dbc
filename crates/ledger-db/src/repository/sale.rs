//! # Sale Repository
//!
//! Sales take goods out of stock and carry the balance the customer still
//! owes.
//!
//! ## Save Order
//! ```text
//! total       = quantity × unit_price
//! balance_due = total − amount_received     (negative when overpaid)
//! persist row ──► stock −= quantity         (one transaction)
//! ```
//!
//! Stock is allowed to go negative: the sale is recorded and a warning is
//! logged.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{
    CustomerBalance, ListQuery, ReferenceKind, Sale, SaleInput, SaleRow, StockDirection,
    StockPolicy,
};

use super::stock::{apply_adjustment, apply_all, load_recorded, StockLedger};
use super::{begin_write, clean, new_id, push_date_range, push_order_and_paging, push_search, reference_or_generate};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, reference, product_id, customer_id, agent_id, quantity, unit_price, \
                       amount_received, balance_due, sale_date, notes, applied_quantity, \
                       created_at, updated_at";

/// SQL label matching `Customer`'s display.
const CUSTOMER_LABEL: &str = "CASE c.kind \
     WHEN 'enterprise' THEN c.last_name || ' (Enterprise)' \
     ELSE COALESCE(c.first_name || ' ', '') || c.last_name \
     END";

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    stock_policy: StockPolicy,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, stock_policy: StockPolicy) -> Self {
        SaleRepository { pool, stock_policy }
    }

    /// Records a sale, computing its balance due, and takes its quantity
    /// out of the product's stock.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - reference already used
    /// * `Err(DbError::ForeignKeyViolation)` - product, customer or agent missing
    pub async fn create(&self, input: &SaleInput) -> DbResult<Sale> {
        input.validate()?;

        let plan = self.stock_policy.plan_save(
            StockDirection::Outbound,
            None,
            &input.product_id,
            input.quantity,
        )?;

        let now = Utc::now();
        let sale = Sale {
            id: new_id(),
            reference: reference_or_generate(
                input.reference.as_deref(),
                ReferenceKind::Sale,
                input.sale_date,
            ),
            product_id: input.product_id.clone(),
            customer_id: input.customer_id.clone(),
            agent_id: input.agent_id.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            amount_received: input.amount_received,
            balance_due: input.balance_due(),
            sale_date: input.sale_date,
            notes: clean(input.notes.as_deref()),
            applied_quantity: plan.applied,
            created_at: now,
            updated_at: now,
        };

        debug!(
            reference = %sale.reference,
            product_id = %sale.product_id,
            quantity = %sale.quantity,
            balance_due = %sale.balance_due,
            "Inserting sale"
        );

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, reference, product_id, customer_id, agent_id,
                quantity, unit_price, amount_received, balance_due, sale_date,
                notes, applied_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.reference)
        .bind(&sale.product_id)
        .bind(&sale.customer_id)
        .bind(&sale.agent_id)
        .bind(sale.quantity)
        .bind(sale.unit_price)
        .bind(sale.amount_received)
        .bind(sale.balance_due)
        .bind(sale.sale_date)
        .bind(&sale.notes)
        .bind(sale.applied_quantity)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_value(&sale.reference))?;

        apply_all(&mut tx, &plan.adjustments).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(sale)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {COLUMNS} FROM sales WHERE reference = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(reference.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Rewrites a sale, recomputing its balance due, and moves stock
    /// according to the stock policy. A blank reference keeps the stored one.
    pub async fn update(&self, id: &str, input: &SaleInput) -> DbResult<Sale> {
        input.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        let previous = load_recorded(&mut tx, StockLedger::Sales, id).await?;
        let plan = self.stock_policy.plan_save(
            StockDirection::Outbound,
            Some(&previous),
            &input.product_id,
            input.quantity,
        )?;
        let reference = clean(input.reference.as_deref()).unwrap_or(previous.reference);
        let balance_due = input.balance_due();

        debug!(
            id = %id,
            reference = %reference,
            balance_due = %balance_due,
            adjustments = plan.adjustments.len(),
            policy = self.stock_policy.as_str(),
            "Updating sale"
        );

        sqlx::query(
            r#"
            UPDATE sales SET
                reference = ?2,
                product_id = ?3,
                customer_id = ?4,
                agent_id = ?5,
                quantity = ?6,
                unit_price = ?7,
                amount_received = ?8,
                balance_due = ?9,
                sale_date = ?10,
                notes = ?11,
                applied_quantity = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&reference)
        .bind(&input.product_id)
        .bind(&input.customer_id)
        .bind(&input.agent_id)
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(input.amount_received)
        .bind(balance_due)
        .bind(input.sale_date)
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
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Deletes a sale. Under a compensating policy its applied quantity
    /// returns to stock.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        let recorded = load_recorded(&mut tx, StockLedger::Sales, id).await?;

        debug!(id = %id, reference = %recorded.reference, "Deleting sale");

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(adjustment) = self.stock_policy.plan_delete(
            StockDirection::Outbound,
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

    /// Lists sales, most recent first. Searches the reference, the product
    /// name and the customer's names; the date range applies to the sale date.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Vec<SaleRow>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            r#"
            SELECT
                sa.id, sa.reference,
                p.name AS product,
                {CUSTOMER_LABEL} AS customer,
                a.first_name || ' ' || a.last_name AS agent,
                sa.quantity, sa.unit_price, sa.amount_received, sa.balance_due, sa.sale_date
            FROM sales sa
            JOIN products p ON p.id = sa.product_id
            JOIN customers c ON c.id = sa.customer_id
            JOIN agents a ON a.id = sa.agent_id
            WHERE 1 = 1
            "#
        ));
        push_search(
            &mut qb,
            query,
            &["sa.reference", "p.name", "c.last_name", "c.first_name"],
        );
        push_date_range(&mut qb, "sa.sale_date", &query.dates);
        push_order_and_paging(&mut qb, "sa.sale_date DESC, sa.created_at DESC", query);

        let rows = qb.build_query_as::<SaleRow>().fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Listed sales");
        Ok(rows)
    }

    /// Balances still owed, one row per customer, largest first.
    ///
    /// Only sales with a positive balance count; overpayments on one sale
    /// do not offset another.
    pub async fn outstanding_balances(&self) -> DbResult<Vec<CustomerBalance>> {
        let sql = format!(
            r#"
            SELECT
                c.id AS customer_id,
                {CUSTOMER_LABEL} AS customer,
                COUNT(sa.id) AS open_sales,
                SUM(sa.balance_due) AS balance_due
            FROM sales sa
            JOIN customers c ON c.id = sa.customer_id
            WHERE sa.balance_due > 0
            GROUP BY c.id
            ORDER BY balance_due DESC, customer
            "#
        );

        let balances = sqlx::query_as::<_, CustomerBalance>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use ledger_core::{CustomerInput, CustomerKind, Money};

    #[tokio::test]
    async fn test_create_computes_balance_and_takes_stock() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let sani = customer(&db, "Sani").await;
        let maize = product(&db, "Maize").await;

        let sale = db
            .sales()
            .create(&sale_input(&maize, &sani, &booker, 30))
            .await
            .unwrap();

        assert!(sale.reference.starts_with("VTE-20261003-"));
        assert_eq!(sale.total(), Money::from_major(300));
        assert_eq!(sale.balance_due, Money::from_major(50));
        assert!(!sale.is_settled());

        // Selling from empty stock is recorded, not rejected
        assert_eq!(stock_of(&db, &maize.id).await, units(-30));
    }

    #[tokio::test]
    async fn test_update_recomputes_balance() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let sani = customer(&db, "Sani").await;
        let maize = product(&db, "Maize").await;

        let sale = db
            .sales()
            .create(&sale_input(&maize, &sani, &booker, 30))
            .await
            .unwrap();

        let mut input = sale_input(&maize, &sani, &booker, 30);
        input.amount_received = Money::from_major(300);
        let settled = db.sales().update(&sale.id, &input).await.unwrap();
        assert!(settled.balance_due.is_zero());
        assert!(settled.is_settled());
        assert_eq!(stock_of(&db, &maize.id).await, units(-30));

        input.amount_received = Money::from_major(320);
        let overpaid = db.sales().update(&sale.id, &input).await.unwrap();
        assert_eq!(overpaid.balance_due, Money::from_major(-20));
    }

    #[tokio::test]
    async fn test_blank_reference_is_generated_then_kept() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let sani = customer(&db, "Sani").await;
        let maize = product(&db, "Maize").await;

        let mut input = sale_input(&maize, &sani, &booker, 30);
        input.reference = Some(String::new());
        let sale = db.sales().create(&input).await.unwrap();
        assert!(sale.reference.starts_with("VTE-20261003-"));

        input.reference = Some("  ".to_string());
        input.amount_received = Money::from_major(300);
        let updated = db.sales().update(&sale.id, &input).await.unwrap();
        assert_eq!(updated.reference, sale.reference);
        assert!(updated.is_settled());

        input.reference = Some(" VTE-MANUAL ".to_string());
        let renamed = db.sales().update(&sale.id, &input).await.unwrap();
        assert_eq!(renamed.reference, "VTE-MANUAL");
    }

    #[tokio::test]
    async fn test_reapply_update_takes_stock_again() {
        let db = memory_db(StockPolicy::Reapply).await;
        let booker = agent(&db).await;
        let sani = customer(&db, "Sani").await;
        let maize = product(&db, "Maize").await;

        let sale = db
            .sales()
            .create(&sale_input(&maize, &sani, &booker, 30))
            .await
            .unwrap();
        let updated = db
            .sales()
            .update(&sale.id, &sale_input(&maize, &sani, &booker, 30))
            .await
            .unwrap();

        assert_eq!(updated.applied_quantity, units(60));
        assert_eq!(stock_of(&db, &maize.id).await, units(-60));
    }

    #[tokio::test]
    async fn test_delete_returns_stock() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let sani = customer(&db, "Sani").await;
        let maize = product(&db, "Maize").await;

        let sale = db
            .sales()
            .create(&sale_input(&maize, &sani, &booker, 30))
            .await
            .unwrap();
        db.sales().delete(&sale.id).await.unwrap();

        assert!(stock_of(&db, &maize.id).await.is_zero());
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_searches_customer_name() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let sani = customer(&db, "Sani").await;
        let other = customer(&db, "Tokpo").await;
        let maize = product(&db, "Maize").await;

        db.sales()
            .create(&sale_input(&maize, &sani, &booker, 30))
            .await
            .unwrap();
        db.sales()
            .create(&sale_input(&maize, &other, &booker, 5))
            .await
            .unwrap();

        let rows = db.sales().list(&ListQuery::new().search("sani")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer, "Awa Sani");
        assert_eq!(rows[0].agent, "Safi Bio");
        assert_eq!(rows[0].balance_due, Money::from_major(50));

        let outside = db.sales().list(&ListQuery::new().since(day(4))).await.unwrap();
        assert!(outside.is_empty());
    }

    #[tokio::test]
    async fn test_outstanding_balances() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let sani = customer(&db, "Sani").await;
        let agro = db
            .customers()
            .create(&CustomerInput {
                last_name: "Agro Nord".to_string(),
                kind: CustomerKind::Enterprise,
                phone: "21000000".to_string(),
                address: "Cotonou".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let maize = product(&db, "Maize").await;

        // Sani: 50 + 100 owed, plus one settled sale
        db.sales()
            .create(&sale_input(&maize, &sani, &booker, 30))
            .await
            .unwrap();
        let mut input = sale_input(&maize, &sani, &booker, 35);
        input.amount_received = Money::from_major(250);
        db.sales().create(&input).await.unwrap();
        input.amount_received = Money::from_major(350);
        db.sales().create(&input).await.unwrap();

        // Agro Nord: 200 owed
        let mut input = sale_input(&maize, &agro, &booker, 20);
        input.amount_received = Money::zero();
        db.sales().create(&input).await.unwrap();

        let balances = db.sales().outstanding_balances().await.unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].customer, "Agro Nord (Enterprise)");
        assert_eq!(balances[0].balance_due, Money::from_major(200));
        assert_eq!(balances[0].open_sales, 1);
        assert_eq!(balances[1].customer, "Awa Sani");
        assert_eq!(balances[1].balance_due, Money::from_major(150));
        assert_eq!(balances[1].open_sales, 2);
    }
}
