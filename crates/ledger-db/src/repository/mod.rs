//! # Repository Module
//!
//! One repository per ledger entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  db.sales().create(&input)                                      │
//! │       ▼                                                                 │
//! │  SaleRepository                                                         │
//! │  ├── validate input (ledger-core)                                       │
//! │  ├── BEGIN IMMEDIATE                                                    │
//! │  ├── INSERT / UPDATE the row                                            │
//! │  ├── apply StockPlan (stock.rs, same transaction)                       │
//! │  └── COMMIT                                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Products, stock reconciliation
//! - [`AgentRepository`], [`SupplierRepository`], [`CustomerRepository`] - Parties
//! - [`DriverRepository`], [`TruckRepository`] - Fleet
//! - [`PurchaseRepository`], [`SaleRepository`] - Stock-moving trade records
//! - [`TransportRepository`] - Transport jobs
//! - [`SalaryPaymentRepository`] - Salary payments

pub mod agent;
pub mod customer;
pub mod driver;
pub mod product;
pub mod purchase;
pub mod salary;
pub mod sale;
pub mod stock;
pub mod supplier;
pub mod transport;
pub mod truck;

pub use agent::AgentRepository;
pub use customer::CustomerRepository;
pub use driver::DriverRepository;
pub use product::ProductRepository;
pub use purchase::PurchaseRepository;
pub use salary::SalaryPaymentRepository;
pub use sale::SaleRepository;
pub use supplier::SupplierRepository;
pub use transport::TransportRepository;
pub use truck::TruckRepository;

use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use ledger_core::{reference_code, DateRange, ListQuery, ReferenceKind};

use crate::error::DbResult;

// =============================================================================
// Shared Helpers
// =============================================================================

/// Generates a new entity ID (UUID v4).
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Opens a transaction that holds the write lock from its first statement.
///
/// In WAL mode a deferred transaction that reads before it writes fails with
/// `SQLITE_BUSY` when another connection commits in between; the busy timeout
/// only covers waiting for `BEGIN IMMEDIATE`.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Caller-supplied reference code, or a generated one for `date`.
pub(crate) fn reference_or_generate(
    reference: Option<&str>,
    kind: ReferenceKind,
    date: NaiveDate,
) -> String {
    match reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => reference.to_string(),
        None => reference_code(kind, date, Uuid::new_v4()),
    }
}

/// Appends `AND (col1 LIKE ? OR col2 LIKE ? ...)` for the query's search
/// term, if any.
pub(crate) fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery, columns: &[&str]) {
    let Some(pattern) = query.search_pattern() else {
        return;
    };

    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column);
        qb.push(" LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\'");
    }
    qb.push(")");
}

/// Appends an inclusive date range filter on `column`.
///
/// `column` must evaluate to a `YYYY-MM-DD` string; wrap timestamp columns
/// in `substr(col, 1, 10)`.
pub(crate) fn push_date_range(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, dates: &DateRange) {
    if let Some(from) = dates.from {
        qb.push(" AND ");
        qb.push(column);
        qb.push(" >= ");
        qb.push_bind(from);
    }
    if let Some(to) = dates.to {
        qb.push(" AND ");
        qb.push(column);
        qb.push(" <= ");
        qb.push_bind(to);
    }
}

/// Appends `ORDER BY <order_by> LIMIT ? OFFSET ?`.
pub(crate) fn push_order_and_paging(
    qb: &mut QueryBuilder<'_, Sqlite>,
    order_by: &str,
    query: &ListQuery,
) {
    qb.push(" ORDER BY ");
    qb.push(order_by);
    qb.push(" LIMIT ");
    qb.push_bind(query.effective_limit() as i64);
    qb.push(" OFFSET ");
    qb.push_bind(query.offset as i64);
}

/// Trims an optional text value; blank becomes `None`.
pub(crate) fn clean(value: Option<&str>) -> Option<String> {
    ledger_core::validation::normalize_optional(value)
}

// =============================================================================
// Test Fixtures
// =============================================================================
