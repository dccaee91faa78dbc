//! # Stock Adjustments
//!
//! Executes [`StockPlan`](ledger_core::StockPlan)s on a transaction's
//! connection.
//!
//! ## Delta Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ Read-modify-write (lost update under concurrent saves)          │
//! │     SELECT stock_quantity ...; UPDATE products SET stock_quantity = 7│
//! │                                                                     │
//! │  ✅ Atomic delta on the transaction's connection                    │
//! │     UPDATE products SET stock_quantity = stock_quantity - 3         │
//! │                                                                     │
//! │  Sale A: -3, Sale B: -2 → both land, stock moves by -5              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use ledger_core::stock::RecordedStock;
use ledger_core::{Quantity, StockAdjustment, StockDirection, StockPolicy};

use crate::error::{DbError, DbResult};

/// A table whose rows move stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLedger {
    Purchases,
    Sales,
}

impl StockLedger {
    pub fn table(self) -> &'static str {
        match self {
            StockLedger::Purchases => "purchases",
            StockLedger::Sales => "sales",
        }
    }

    pub fn direction(self) -> StockDirection {
        match self {
            StockLedger::Purchases => StockDirection::Inbound,
            StockLedger::Sales => StockDirection::Outbound,
        }
    }

    fn entity(self) -> &'static str {
        match self {
            StockLedger::Purchases => "Purchase",
            StockLedger::Sales => "Sale",
        }
    }
}

/// Applies one adjustment and returns the product's new stock.
///
/// Negative stock is allowed and logged.
pub async fn apply_adjustment(
    conn: &mut SqliteConnection,
    adjustment: &StockAdjustment,
) -> DbResult<Quantity> {
    debug!(
        product_id = %adjustment.product_id,
        delta = %adjustment.delta,
        "Adjusting stock"
    );

    let stock: Option<Quantity> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET
            stock_quantity = stock_quantity + ?2,
            updated_at = ?3
        WHERE id = ?1
        RETURNING stock_quantity
        "#,
    )
    .bind(&adjustment.product_id)
    .bind(adjustment.delta)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    let stock = stock.ok_or_else(|| DbError::not_found("Product", &adjustment.product_id))?;

    if stock.is_negative() {
        warn!(
            product_id = %adjustment.product_id,
            stock = %stock,
            "Stock is negative"
        );
    }

    Ok(stock)
}

/// Applies every adjustment of a plan, in order.
pub async fn apply_all(conn: &mut SqliteConnection, adjustments: &[StockAdjustment]) -> DbResult<()> {
    for adjustment in adjustments {
        apply_adjustment(conn, adjustment).await?;
    }
    Ok(())
}

/// Loads the stock-bearing fields of a purchase or sale.
pub async fn load_recorded(
    conn: &mut SqliteConnection,
    ledger: StockLedger,
    id: &str,
) -> DbResult<RecordedStock> {
    let sql = format!(
        "SELECT reference, product_id, quantity, applied_quantity FROM {} WHERE id = ?1",
        ledger.table()
    );

    let row: Option<(String, String, Quantity, Quantity)> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let (reference, product_id, quantity, applied) =
        row.ok_or_else(|| DbError::not_found(ledger.entity(), id))?;

    Ok(RecordedStock {
        reference,
        product_id,
        quantity,
        applied,
    })
}

/// Gives back the stock applied by every row of `ledger` whose
/// `owner_column` equals `owner_id`, ahead of a cascading delete of the owner.
///
/// Returns the number of products touched.
pub async fn reverse_owned(
    conn: &mut SqliteConnection,
    ledger: StockLedger,
    owner_column: &'static str,
    owner_id: &str,
) -> DbResult<u64> {
    // Purchases added stock, so reversing subtracts; sales the other way round.
    let op = match ledger.direction() {
        StockDirection::Inbound => "-",
        StockDirection::Outbound => "+",
    };
    let table = ledger.table();

    let sql = format!(
        r#"
        UPDATE products
        SET
            stock_quantity = stock_quantity {op} COALESCE((
                SELECT SUM(t.applied_quantity)
                FROM {table} t
                WHERE t.product_id = products.id AND t.{owner_column} = ?1
            ), 0),
            updated_at = ?2
        WHERE id IN (SELECT product_id FROM {table} WHERE {owner_column} = ?1)
        "#
    );

    let result = sqlx::query(&sql)
        .bind(owner_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    debug!(
        table,
        owner_column,
        owner_id = %owner_id,
        products = result.rows_affected(),
        "Reversed stock ahead of cascade"
    );

    Ok(result.rows_affected())
}

/// A party whose deletion cascades to stock-moving rows.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StockOwner {
    pub entity: &'static str,
    pub table: &'static str,
    /// Foreign key column naming the owner in each ledger table.
    pub column: &'static str,
    pub ledgers: &'static [StockLedger],
}

/// Deletes a supplier, customer or agent in one transaction, first giving
/// back the stock its cascaded purchases/sales applied when `policy`
/// compensates deletes.
pub(crate) async fn delete_owner(
    pool: &SqlitePool,
    policy: StockPolicy,
    owner: StockOwner,
    id: &str,
) -> DbResult<()> {
    debug!(entity = owner.entity, id = %id, "Deleting");

    let mut tx = super::begin_write(pool).await?;

    if policy.compensates_deletes() {
        for ledger in owner.ledgers {
            reverse_owned(&mut tx, *ledger, owner.column, id).await?;
        }
    }

    let sql = format!("DELETE FROM {} WHERE id = ?1", owner.table);
    let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;

    if result.rows_affected() == 0 {
        // Dropping the transaction rolls it back
        return Err(DbError::not_found(owner.entity, id));
    }

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    Ok(())
}
