//! # Domain Types
//!
//! Entities of the trade ledger and the input records used to create or
//! update them.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ledger Entities                                 │
//! │                                                                         │
//! │  catalog     parties             fleet            trade / payroll       │
//! │  ───────     ───────             ─────            ───────────────       │
//! │  Product ◄── Customer.interest   Driver ◄──┐      Purchase ──► Product  │
//! │     ▲                               ▲      │         │  ──► Supplier    │
//! │     │        Agent ◄────────────────┼──────┼──────── │  ──► Agent       │
//! │     │        Supplier               │    Truck       │                  │
//! │     │        Customer               │      ▲      Sale ──► Customer     │
//! │     │                               │      │         ▲                  │
//! │     └───────────────────────────────┼──────┼─────────┘                  │
//! │                                     │      │                            │
//! │                        TransportJob ┴──────┴──► Purchase? / Sale?       │
//! │                        SalaryPayment ──► Agent                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id`. Purchases, sales, transport jobs and
//! salary payments also carry a unique human-readable `reference`.

mod catalog;
mod fleet;
mod parties;
mod payroll;
mod trade;

pub use catalog::{Product, ProductInput};
pub use fleet::{Driver, DriverInput, Truck, TruckInput, TruckStatus};
pub use parties::{Agent, AgentInput, Customer, CustomerInput, CustomerKind, Supplier, SupplierInput};
pub use payroll::{SalaryPayment, SalaryPaymentInput};
pub use trade::{
    reference_code, Purchase, PurchaseInput, ReferenceKind, Sale, SaleInput, TransportJob,
    TransportJobInput,
};
