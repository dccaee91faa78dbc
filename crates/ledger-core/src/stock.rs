//! # Stock Adjustment Planning
//!
//! A product's stock is a denormalized running total: purchases add to it,
//! sales take from it. This module decides *what* a save or a delete does to
//! that total; `ledger-db` executes the plan inside the same transaction as
//! the row write.
//!
//! ## Policies
//! ```text
//! ┌──────────────┬──────────────────────┬──────────────────────┬─────────────────┐
//! │ Policy       │ create               │ edit                 │ delete          │
//! ├──────────────┼──────────────────────┼──────────────────────┼─────────────────┤
//! │ Incremental  │ ± quantity           │ ± (new − applied)    │ ∓ applied       │
//! │ Reapply      │ ± quantity           │ ± quantity again     │ nothing         │
//! │ Immutable    │ ± quantity           │ rejected if quantity │ ∓ applied       │
//! │              │                      │ or product changes   │                 │
//! └──────────────┴──────────────────────┴──────────────────────┴─────────────────┘
//! ```
//!
//! `Reapply` reproduces the historical behavior of the ledger, where every
//! save re-applied the full quantity. `Incremental` keeps
//! `stock == Σ purchases − Σ sales` through edits and deletes.
//!
//! ## Applied Quantity
//! Each purchase and sale row stores `applied_quantity`, the stock delta
//! currently attributed to it. Edits and deletes compensate against that
//! value rather than against the row's (possibly edited) quantity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::quantity::Quantity;

// =============================================================================
// Policy
// =============================================================================

/// How edits and deletes of purchases/sales move stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Apply only the difference on edit; reverse on delete.
    #[default]
    Incremental,
    /// Re-apply the full quantity on every save; never reverse.
    Reapply,
    /// Freeze quantity and product after creation; reverse on delete.
    Immutable,
}

impl StockPolicy {
    pub const ALL: [StockPolicy; 3] = [
        StockPolicy::Incremental,
        StockPolicy::Reapply,
        StockPolicy::Immutable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::Incremental => "incremental",
            StockPolicy::Reapply => "reapply",
            StockPolicy::Immutable => "immutable",
        }
    }

    /// Whether deleting a purchase/sale gives its stock back.
    pub fn compensates_deletes(&self) -> bool {
        !matches!(self, StockPolicy::Reapply)
    }

    /// Plans the stock effect of saving a purchase or sale.
    ///
    /// `previous` is the stored state of the row for an edit, `None` for a
    /// create.
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::{Quantity, StockDirection, StockPolicy};
    /// use ledger_core::stock::RecordedStock;
    ///
    /// let stored = RecordedStock {
    ///     reference: "VTE-1".to_string(),
    ///     product_id: "p1".to_string(),
    ///     quantity: Quantity::from_units(30),
    ///     applied: Quantity::from_units(30),
    /// };
    ///
    /// // Re-saving the same quantity changes nothing...
    /// let plan = StockPolicy::Incremental
    ///     .plan_save(StockDirection::Outbound, Some(&stored), "p1", Quantity::from_units(30))
    ///     .unwrap();
    /// assert!(plan.adjustments.is_empty());
    ///
    /// // ...unless the historical behavior is requested.
    /// let plan = StockPolicy::Reapply
    ///     .plan_save(StockDirection::Outbound, Some(&stored), "p1", Quantity::from_units(30))
    ///     .unwrap();
    /// assert_eq!(plan.adjustments[0].delta, Quantity::from_units(-30));
    /// ```
    pub fn plan_save(
        &self,
        direction: StockDirection,
        previous: Option<&RecordedStock>,
        product_id: &str,
        quantity: Quantity,
    ) -> CoreResult<StockPlan> {
        let Some(previous) = previous else {
            return Ok(StockPlan {
                adjustments: vec![StockAdjustment::new(product_id, direction.signed(quantity))],
                applied: quantity,
            });
        };

        match self {
            StockPolicy::Incremental => Ok(plan_incremental(direction, previous, product_id, quantity)),
            StockPolicy::Reapply => {
                let applied = if previous.product_id == product_id {
                    previous.applied + quantity
                } else {
                    quantity
                };
                Ok(StockPlan {
                    adjustments: vec![StockAdjustment::new(product_id, direction.signed(quantity))],
                    applied,
                })
            }
            StockPolicy::Immutable => {
                if previous.product_id != product_id || previous.quantity != quantity {
                    return Err(CoreError::StockFieldsLocked {
                        reference: previous.reference.clone(),
                    });
                }
                Ok(plan_incremental(direction, previous, product_id, quantity))
            }
        }
    }

    /// Plans the stock effect of deleting a purchase or sale.
    pub fn plan_delete(
        &self,
        direction: StockDirection,
        product_id: &str,
        applied: Quantity,
    ) -> Option<StockAdjustment> {
        if !self.compensates_deletes() || applied.is_zero() {
            return None;
        }
        Some(StockAdjustment::new(product_id, -direction.signed(applied)))
    }
}

fn plan_incremental(
    direction: StockDirection,
    previous: &RecordedStock,
    product_id: &str,
    quantity: Quantity,
) -> StockPlan {
    let mut adjustments = Vec::with_capacity(2);

    if previous.product_id == product_id {
        let difference = quantity - previous.applied;
        if !difference.is_zero() {
            adjustments.push(StockAdjustment::new(product_id, direction.signed(difference)));
        }
    } else {
        if !previous.applied.is_zero() {
            adjustments.push(StockAdjustment::new(
                &previous.product_id,
                -direction.signed(previous.applied),
            ));
        }
        adjustments.push(StockAdjustment::new(product_id, direction.signed(quantity)));
    }

    StockPlan {
        adjustments,
        applied: quantity,
    }
}

impl fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        StockPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "stock_policy".to_string(),
                allowed: StockPolicy::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Which way a record moves stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Purchases bring goods in.
    Inbound,
    /// Sales take goods out.
    Outbound,
}

impl StockDirection {
    /// Signs a quantity for this direction (`+` inbound, `−` outbound).
    #[inline]
    pub fn signed(self, quantity: Quantity) -> Quantity {
        match self {
            StockDirection::Inbound => quantity,
            StockDirection::Outbound => -quantity,
        }
    }
}

// =============================================================================
// Plans
// =============================================================================

/// Stored stock-bearing state of a purchase or sale row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStock {
    pub reference: String,
    pub product_id: String,
    pub quantity: Quantity,
    pub applied: Quantity,
}

/// A signed change to one product's stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: String,
    pub delta: Quantity,
}

impl StockAdjustment {
    pub fn new(product_id: &str, delta: Quantity) -> Self {
        StockAdjustment {
            product_id: product_id.to_string(),
            delta,
        }
    }
}

/// Result of planning a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockPlan {
    /// Adjustments to execute, in order.
    pub adjustments: Vec<StockAdjustment>,
    /// New value of the row's `applied_quantity`.
    pub applied: Quantity,
}

// =============================================================================
// Unit Tests
// =============================================================================
