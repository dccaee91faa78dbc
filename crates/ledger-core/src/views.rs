//! # List-View Rows
//!
//! Flattened rows for the admin list screens. Related records are resolved
//! to their display labels by the query, so a row renders without further
//! lookups.
//!
//! Products, agents, suppliers and drivers list as their plain entities;
//! the views below exist for records whose columns span several tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{CustomerKind, TruckStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerRow {
    pub id: String,
    pub last_name: String,
    pub first_name: Option<String>,
    pub kind: CustomerKind,
    pub phone: String,
    pub interested_product: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TruckRow {
    pub id: String,
    pub plate: String,
    /// `None` when no driver is assigned.
    pub driver: Option<String>,
    pub capacity_tons: Quantity,
    pub status: TruckStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseRow {
    pub id: String,
    pub reference: String,
    pub product: String,
    pub supplier: String,
    pub agent: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub transport_cost: Money,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
}

impl PurchaseRow {
    pub fn total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity) + self.transport_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleRow {
    pub id: String,
    pub reference: String,
    pub product: String,
    pub customer: String,
    pub agent: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub amount_received: Money,
    pub balance_due: Money,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransportRow {
    pub id: String,
    pub reference: String,
    pub truck: String,
    pub driver: String,
    #[ts(as = "String")]
    pub transport_date: NaiveDate,
    pub destination: String,
    pub price_paid: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalaryPaymentRow {
    pub id: String,
    pub agent: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    pub amount: Money,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
    pub reference: String,
}

// =============================================================================
// Reports
// =============================================================================

/// What one customer still owes across their sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerBalance {
    pub customer_id: String,
    pub customer: String,
    /// Sales with a positive balance due.
    pub open_sales: i64,
    pub balance_due: Money,
}

/// Recorded stock of a product next to what its purchases and sales imply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockReconciliation {
    pub product_id: String,
    pub product: String,
    pub recorded: Quantity,
    pub purchased: Quantity,
    pub sold: Quantity,
}

impl StockReconciliation {
    /// `purchased − sold`.
    pub fn expected(&self) -> Quantity {
        self.purchased - self.sold
    }

    /// `recorded − expected`; zero when the counter is in step.
    pub fn discrepancy(&self) -> Quantity {
        self.recorded - self.expected()
    }

    pub fn is_consistent(&self) -> bool {
        self.discrepancy().is_zero()
    }
}
