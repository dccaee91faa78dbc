//! # ledger-db: Database Layer for the Trade Ledger
//!
//! SQLite persistence for the ledger through sqlx: connection pool, embedded
//! migrations and one repository per entity. Purchases and sales adjust
//! product stock inside the same transaction as the row they write.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Trade Ledger Data Flow                           │
//! │                                                                         │
//! │  Admin front end / seed tool  (db.sales().create(&input))               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ledger-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (10 + stock) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ PurchaseRepo  │    │ 0001_initial │  │   │
//! │  │   │ StockPolicy   │◄───│ SaleRepo      │    │ _schema.sql  │  │   │
//! │  │   │ DbConfig      │    │ ...           │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL, foreign keys on)      │   │
//! │  │   ledger.db  (or LEDGER_DB_PATH)                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let purchase = db.purchases().create(&input).await?;
//! let owed = db.sales().outstanding_balances().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ConfigError;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    AgentRepository, CustomerRepository, DriverRepository, ProductRepository, PurchaseRepository,
    SalaryPaymentRepository, SaleRepository, SupplierRepository, TransportRepository,
    TruckRepository,
};
