//! People and companies the ledger deals with: agents (staff), suppliers and
//! customers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::validation::{
    validate_amount, validate_measure, validate_optional_text, validate_optional_uuid,
    validate_phone, validate_required_text,
};
use crate::{MAX_NAME_LEN, MAX_PLACE_LEN, MAX_POSITION_LEN};

const MAX_ADDRESS_LEN: usize = 500;
const MAX_NOTES_LEN: usize = 2_000;

// =============================================================================
// Agent
// =============================================================================

/// A staff member who books purchases and sales and receives salary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Agent {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub address: String,
    /// Job title (≤50 characters).
    pub position: String,
    #[ts(as = "String")]
    pub hire_date: NaiveDate,
    pub base_salary: Money,
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgentInput {
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub address: String,
    pub position: String,
    #[ts(as = "String")]
    pub hire_date: NaiveDate,
    pub base_salary: Money,
}

impl AgentInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("last_name", &self.last_name, MAX_NAME_LEN)?;
        validate_required_text("first_name", &self.first_name, MAX_NAME_LEN)?;
        validate_phone(&self.phone)?;
        validate_required_text("address", &self.address, MAX_ADDRESS_LEN)?;
        validate_required_text("position", &self.position, MAX_POSITION_LEN)?;
        validate_amount("base_salary", self.base_salary)?;
        Ok(())
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A producer goods are bought from, identified by village.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub last_name: String,
    pub first_name: Option<String>,
    pub village: String,
    pub phone: String,
    pub notes: Option<String>,
    /// Kilometres from the village to the collection hub.
    pub distance_to_hub: Option<Quantity>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// `"First Last - Village"`, or `"Last - Village"` without a first name.
impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.first_name {
            Some(first) => write!(f, "{} {} - {}", first, self.last_name, self.village),
            None => write!(f, "{} - {}", self.last_name, self.village),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub last_name: String,
    pub first_name: Option<String>,
    pub village: String,
    pub phone: String,
    pub notes: Option<String>,
    pub distance_to_hub: Option<Quantity>,
}

impl SupplierInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("last_name", &self.last_name, MAX_NAME_LEN)?;
        validate_optional_text("first_name", self.first_name.as_deref(), MAX_NAME_LEN)?;
        validate_required_text("village", &self.village, MAX_PLACE_LEN)?;
        validate_phone(&self.phone)?;
        validate_optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)?;
        if let Some(distance) = self.distance_to_hub {
            validate_measure("distance_to_hub", distance)?;
        }
        Ok(())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Whether a customer is a company or a private person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerKind {
    Enterprise,
    #[default]
    Individual,
}

impl CustomerKind {
    pub const ALL: [CustomerKind; 2] = [CustomerKind::Enterprise, CustomerKind::Individual];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerKind::Enterprise => "enterprise",
            CustomerKind::Individual => "individual",
        }
    }
}

impl FromStr for CustomerKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CustomerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: CustomerKind::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

/// A buyer of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub last_name: String,
    pub first_name: Option<String>,
    pub kind: CustomerKind,
    pub phone: String,
    pub address: String,
    /// Product the customer asked about, if any. Cleared when that product
    /// is deleted.
    pub interested_product_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Enterprises show as `"Name (Enterprise)"`, individuals as `"First Last"`.
impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.first_name) {
            (CustomerKind::Enterprise, _) => write!(f, "{} (Enterprise)", self.last_name),
            (CustomerKind::Individual, Some(first)) => write!(f, "{} {}", first, self.last_name),
            (CustomerKind::Individual, None) => f.write_str(&self.last_name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub last_name: String,
    pub first_name: Option<String>,
    #[serde(default)]
    pub kind: CustomerKind,
    pub phone: String,
    pub address: String,
    pub interested_product_id: Option<String>,
}

impl CustomerInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("last_name", &self.last_name, MAX_NAME_LEN)?;
        validate_optional_text("first_name", self.first_name.as_deref(), MAX_NAME_LEN)?;
        validate_phone(&self.phone)?;
        validate_required_text("address", &self.address, MAX_ADDRESS_LEN)?;
        validate_optional_uuid("interested_product_id", self.interested_product_id.as_deref())?;
        Ok(())
    }
}
