//! Purchases, sales and transport jobs: the records that carry a reference
//! code.
//!
//! ## Reference Codes
//! ```text
//! ACH-20261016-1A2B3C
//! ─┬─ ───┬──── ───┬──
//!  │     │        └── 6 hex digits from a fresh UUID v4
//!  │     └── record date
//!  └── ACH purchase, VTE sale, TRP transport, SAL salary payment
//! ```
//! Callers may supply their own code instead; uniqueness is enforced by the
//! database in every case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::validation::{
    validate_amount, validate_measure, validate_optional_reference, validate_optional_text,
    validate_optional_uuid, validate_quantity, validate_required_text, validate_uuid,
};
use crate::MAX_PLACE_LEN;

const MAX_NOTES_LEN: usize = 2_000;

// =============================================================================
// Reference Codes
// =============================================================================

/// Kind of record a reference code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Purchase,
    Sale,
    Transport,
    SalaryPayment,
}

impl ReferenceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Purchase => "ACH",
            ReferenceKind::Sale => "VTE",
            ReferenceKind::Transport => "TRP",
            ReferenceKind::SalaryPayment => "SAL",
        }
    }
}

/// Builds a `PREFIX-YYYYMMDD-XXXXXX` reference code.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use ledger_core::{reference_code, ReferenceKind};
/// use uuid::Uuid;
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// let id = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
///
/// assert_eq!(reference_code(ReferenceKind::Sale, date, id), "VTE-20261016-1A2B3C");
/// ```
pub fn reference_code(kind: ReferenceKind, date: NaiveDate, id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!(
        "{}-{}-{}",
        kind.prefix(),
        date.format("%Y%m%d"),
        hex[..6].to_ascii_uppercase()
    )
}

// =============================================================================
// Purchase
// =============================================================================

/// Goods bought from a supplier. Saving one adds its quantity to stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    pub reference: String,
    pub product_id: String,
    pub supplier_id: String,
    pub agent_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    /// Transport surcharge added to the total.
    pub transport_cost: Money,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
    pub distance_to_hub: Option<Quantity>,
    pub notes: Option<String>,
    /// Stock delta currently attributed to this purchase.
    pub applied_quantity: Quantity,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// `quantity × unit_price + transport_cost`.
    pub fn total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity) + self.transport_cost
    }

    /// `"Purchase #REF - Product (quantity)"`.
    pub fn label(&self, product_name: &str) -> String {
        format!("Purchase #{} - {} ({})", self.reference, product_name, self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseInput {
    /// Generated when absent.
    pub reference: Option<String>,
    pub product_id: String,
    pub supplier_id: String,
    pub agent_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    #[serde(default)]
    pub transport_cost: Money,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
    pub distance_to_hub: Option<Quantity>,
    pub notes: Option<String>,
}

impl PurchaseInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_reference(self.reference.as_deref())?;
        validate_uuid("product_id", &self.product_id)?;
        validate_uuid("supplier_id", &self.supplier_id)?;
        validate_uuid("agent_id", &self.agent_id)?;
        validate_quantity("quantity", self.quantity)?;
        validate_amount("unit_price", self.unit_price)?;
        validate_amount("transport_cost", self.transport_cost)?;
        if let Some(distance) = self.distance_to_hub {
            validate_measure("distance_to_hub", distance)?;
        }
        validate_optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)?;
        Ok(())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Goods sold to a customer. Saving one takes its quantity out of stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub reference: String,
    pub product_id: String,
    pub customer_id: String,
    pub agent_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub amount_received: Money,
    /// `total − amount_received`, recomputed on every save. Negative when
    /// the customer overpaid.
    pub balance_due: Money,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub notes: Option<String>,
    pub applied_quantity: Quantity,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// `quantity × unit_price`.
    pub fn total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    pub fn is_settled(&self) -> bool {
        !self.balance_due.is_positive()
    }

    /// `"Sale #REF - Product (quantity)"`.
    pub fn label(&self, product_name: &str) -> String {
        format!("Sale #{} - {} ({})", self.reference, product_name, self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleInput {
    pub reference: Option<String>,
    pub product_id: String,
    pub customer_id: String,
    pub agent_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub amount_received: Money,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub notes: Option<String>,
}

impl SaleInput {
    pub fn total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Balance the saved row will carry.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use ledger_core::{Money, Quantity, SaleInput};
    ///
    /// let input = SaleInput {
    ///     reference: None,
    ///     product_id: String::new(),
    ///     customer_id: String::new(),
    ///     agent_id: String::new(),
    ///     quantity: Quantity::from_units(30),
    ///     unit_price: Money::from_major(10),
    ///     amount_received: Money::from_major(250),
    ///     sale_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
    ///     notes: None,
    /// };
    /// assert_eq!(input.total(), Money::from_major(300));
    /// assert_eq!(input.balance_due(), Money::from_major(50));
    /// ```
    pub fn balance_due(&self) -> Money {
        self.total() - self.amount_received
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_reference(self.reference.as_deref())?;
        validate_uuid("product_id", &self.product_id)?;
        validate_uuid("customer_id", &self.customer_id)?;
        validate_uuid("agent_id", &self.agent_id)?;
        validate_quantity("quantity", self.quantity)?;
        validate_amount("unit_price", self.unit_price)?;
        validate_amount("amount_received", self.amount_received)?;
        validate_optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)?;
        Ok(())
    }
}

// =============================================================================
// Transport Job
// =============================================================================

/// A truck trip, optionally tied to the purchase or sale it moved goods for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransportJob {
    pub id: String,
    pub reference: String,
    pub truck_id: String,
    pub driver_id: String,
    #[ts(as = "String")]
    pub transport_date: NaiveDate,
    pub destination: String,
    pub price_paid: Money,
    /// Cleared when the purchase is deleted.
    pub purchase_id: Option<String>,
    /// Cleared when the sale is deleted.
    pub sale_id: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// `"Transport #REF - Destination (date)"`.
impl fmt::Display for TransportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transport #{} - {} ({})",
            self.reference, self.destination, self.transport_date
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransportJobInput {
    pub reference: Option<String>,
    pub truck_id: String,
    pub driver_id: String,
    #[ts(as = "String")]
    pub transport_date: NaiveDate,
    pub destination: String,
    pub price_paid: Money,
    pub purchase_id: Option<String>,
    pub sale_id: Option<String>,
    pub notes: Option<String>,
}

impl TransportJobInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_reference(self.reference.as_deref())?;
        validate_uuid("truck_id", &self.truck_id)?;
        validate_uuid("driver_id", &self.driver_id)?;
        validate_required_text("destination", &self.destination, MAX_PLACE_LEN)?;
        validate_amount("price_paid", self.price_paid)?;
        validate_optional_uuid("purchase_id", self.purchase_id.as_deref())?;
        validate_optional_uuid("sale_id", self.sale_id.as_deref())?;
        validate_optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn purchase_input() -> PurchaseInput {
        PurchaseInput {
            reference: None,
            product_id: ID.to_string(),
            supplier_id: ID.to_string(),
            agent_id: ID.to_string(),
            quantity: Quantity::from_units(100),
            unit_price: Money::from_major(8),
            transport_cost: Money::zero(),
            purchase_date: date(),
            distance_to_hub: None,
            notes: None,
        }
    }

    fn sale_input() -> SaleInput {
        SaleInput {
            reference: Some("VTE-001".to_string()),
            product_id: ID.to_string(),
            customer_id: ID.to_string(),
            agent_id: ID.to_string(),
            quantity: Quantity::from_units(30),
            unit_price: Money::from_major(10),
            amount_received: Money::from_major(250),
            sale_date: date(),
            notes: None,
        }
    }

    #[test]
    fn test_reference_code_format() {
        let code = reference_code(ReferenceKind::Purchase, date(), Uuid::new_v4());
        assert!(code.starts_with("ACH-20261016-"));
        assert_eq!(code.len(), 19);
        assert!(crate::validation::validate_reference(&code).is_ok());

        for kind in [ReferenceKind::Transport, ReferenceKind::SalaryPayment] {
            assert!(reference_code(kind, date(), Uuid::new_v4()).len() <= crate::MAX_REFERENCE_LEN);
        }
    }

    #[test]
    fn test_purchase_total_includes_transport_cost() {
        let purchase = Purchase {
            id: "p".to_string(),
            reference: "ACH-1".to_string(),
            product_id: ID.to_string(),
            supplier_id: ID.to_string(),
            agent_id: ID.to_string(),
            quantity: Quantity::from_hundredths(1_050),
            unit_price: Money::from_major(2),
            transport_cost: Money::from_major(5),
            purchase_date: date(),
            distance_to_hub: None,
            notes: None,
            applied_quantity: Quantity::from_hundredths(1_050),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(purchase.total(), Money::from_major(26));
        assert_eq!(purchase.label("Maize"), "Purchase #ACH-1 - Maize (10.50)");
    }

    #[test]
    fn test_sale_balance_due() {
        let mut input = sale_input();
        assert_eq!(input.total(), Money::from_major(300));
        assert_eq!(input.balance_due(), Money::from_major(50));

        input.amount_received = Money::from_major(300);
        assert!(input.balance_due().is_zero());

        input.amount_received = Money::from_major(320);
        assert_eq!(input.balance_due(), Money::from_major(-20));
    }

    #[test]
    fn test_purchase_input_validation() {
        assert!(purchase_input().validate().is_ok());

        let mut input = purchase_input();
        input.quantity = Quantity::zero();
        assert!(matches!(input.validate(), Err(ValidationError::MustBePositive { .. })));

        let mut input = purchase_input();
        input.transport_cost = Money::from_cents(-1);
        assert!(matches!(input.validate(), Err(ValidationError::OutOfRange { .. })));

        let mut input = purchase_input();
        input.reference = Some("R".repeat(21));
        assert!(matches!(input.validate(), Err(ValidationError::TooLong { .. })));

        let mut input = purchase_input();
        input.supplier_id = String::new();
        assert!(matches!(input.validate(), Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_sale_input_validation() {
        assert!(sale_input().validate().is_ok());

        let mut input = sale_input();
        input.amount_received = Money::from_cents(-100);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_transport_display_and_validation() {
        let input = TransportJobInput {
            reference: None,
            truck_id: ID.to_string(),
            driver_id: ID.to_string(),
            transport_date: date(),
            destination: String::new(),
            price_paid: Money::from_major(40_000),
            purchase_id: None,
            sale_id: None,
            notes: None,
        };
        assert!(matches!(input.validate(), Err(ValidationError::Required { .. })));

        let job = TransportJob {
            id: "t".to_string(),
            reference: "TRP-9".to_string(),
            truck_id: ID.to_string(),
            driver_id: ID.to_string(),
            transport_date: date(),
            destination: "Cotonou".to_string(),
            price_paid: Money::from_major(40_000),
            purchase_id: None,
            sale_id: None,
            notes: None,
            created_at: Utc::now(),
        };
        assert_eq!(job.to_string(), "Transport #TRP-9 - Cotonou (2026-10-16)");
    }
}
