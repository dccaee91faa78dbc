//! # ledger-core: Pure Domain Logic for the Trade Ledger
//!
//! Record-keeping for a small trading and logistics operation: products,
//! staff, suppliers, customers, drivers, trucks, purchases, sales, transport
//! jobs and salary payments. This crate holds the rules and types with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Trade Ledger Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Admin front end / seed tool                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ledger-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   stock   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Policy   │  │   rules   │  │   │
//! │  │   │  Sale ... │  │ Quantity  │  │  Plans    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ledger-db (Database Layer)                   │   │
//! │  │         SQLite queries, migrations, transactional saves         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and their input records
//! - [`money`] - Money type with integer arithmetic (cents)
//! - [`quantity`] - Fixed-point quantity (hundredths)
//! - [`stock`] - Stock policies and save/delete adjustment plans
//! - [`validation`] - Field validation
//! - [`query`] - List/search/filter parameters
//! - [`views`] - Admin list-view rows
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use ledger_core::{Money, Quantity};
//!
//! let unit_price = Money::from_cents(1_000); // 10.00
//! let total = unit_price.multiply_quantity(Quantity::from_units(30));
//!
//! assert_eq!(total.cents(), 30_000); // 300.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod quantity;
pub mod query;
pub mod stock;
pub mod types;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use query::{DateRange, ListQuery, MoneyRange};
pub use stock::{StockAdjustment, StockDirection, StockPlan, StockPolicy};
pub use types::*;
pub use views::*;

// =============================================================================
// Field Limits
// =============================================================================
// Mirror the column sizes of the ledger schema.

/// Maximum length of person, product and company names.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a phone number.
pub const MAX_PHONE_LEN: usize = 20;

/// Maximum length of an agent's position.
pub const MAX_POSITION_LEN: usize = 50;

/// Maximum length of villages, cities and destinations.
pub const MAX_PLACE_LEN: usize = 100;

/// Maximum length of a reference code (purchase, sale, transport, salary).
pub const MAX_REFERENCE_LEN: usize = 20;

/// Maximum length of a truck plate.
pub const MAX_PLATE_LEN: usize = 20;

/// Largest amount a money column holds, in cents (99,999,999.99).
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

/// Largest quantity a stock column holds, in hundredths (99,999,999.99).
pub const MAX_QUANTITY_HUNDREDTHS: i64 = 9_999_999_999;

/// Largest distance or truck capacity, in hundredths (9,999.99).
pub const MAX_MEASURE_HUNDREDTHS: i64 = 999_999;
