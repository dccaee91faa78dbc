//! Products and their margins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::validation::{validate_amount, validate_optional_text, validate_required_text};
use crate::MAX_NAME_LEN;

/// A traded product with its running stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    /// Average price paid to suppliers, per unit.
    pub average_purchase_price: Money,

    /// Price charged to customers, per unit.
    pub sale_price: Money,

    /// On-hand quantity. Maintained by purchases and sales; may be negative.
    pub stock_quantity: Quantity,

    /// Set when the row is first persisted.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Sale price minus average purchase price.
    ///
    /// ## Example
    /// ```rust
    /// # use chrono::Utc;
    /// use ledger_core::{Money, Product, Quantity};
    ///
    /// let product = Product {
    ///     id: "p1".into(),
    ///     name: "Maize".into(),
    ///     description: None,
    ///     average_purchase_price: Money::from_major(8),
    ///     sale_price: Money::from_major(10),
    ///     stock_quantity: Quantity::zero(),
    ///     created_at: Utc::now(),
    ///     updated_at: Utc::now(),
    /// };
    /// assert_eq!(product.calculate_margin(), Money::from_major(2));
    /// assert_eq!(product.calculate_margin_percentage(), 25.0);
    /// ```
    pub fn calculate_margin(&self) -> Money {
        self.sale_price - self.average_purchase_price
    }

    /// Margin as a percentage of the average purchase price.
    ///
    /// Returns `0.0` when the average purchase price is zero.
    pub fn calculate_margin_percentage(&self) -> f64 {
        self.calculate_margin().percentage_of(self.average_purchase_price)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fields a caller supplies when creating or updating a product.
///
/// Stock is not part of the input: it only moves through purchases and sales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub average_purchase_price: Money,
    pub sale_price: Money,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("name", &self.name, MAX_NAME_LEN)?;
        validate_optional_text("description", self.description.as_deref(), 2_000)?;
        validate_amount("average_purchase_price", self.average_purchase_price)?;
        validate_amount("sale_price", self.sale_price)?;
        Ok(())
    }
}
