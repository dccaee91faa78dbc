//! Drivers and trucks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::validation::{
    validate_measure, validate_optional_uuid, validate_phone, validate_plate,
    validate_required_text,
};
use crate::{MAX_NAME_LEN, MAX_PLACE_LEN};

// =============================================================================
// Driver
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Driver {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub city: String,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DriverInput {
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub city: String,
}

impl DriverInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("last_name", &self.last_name, MAX_NAME_LEN)?;
        validate_required_text("first_name", &self.first_name, MAX_NAME_LEN)?;
        validate_phone(&self.phone)?;
        validate_required_text("city", &self.city, MAX_PLACE_LEN)?;
        Ok(())
    }
}

// =============================================================================
// Truck
// =============================================================================

/// Availability of a truck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TruckStatus {
    #[default]
    Available,
    OnMission,
    InMaintenance,
}

impl TruckStatus {
    pub const ALL: [TruckStatus; 3] = [
        TruckStatus::Available,
        TruckStatus::OnMission,
        TruckStatus::InMaintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TruckStatus::Available => "available",
            TruckStatus::OnMission => "on_mission",
            TruckStatus::InMaintenance => "in_maintenance",
        }
    }
}

impl FromStr for TruckStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TruckStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: TruckStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

/// A truck, identified by its unique plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Truck {
    pub id: String,
    pub plate: String,
    /// Assigned driver. Cleared when the driver is deleted.
    pub driver_id: Option<String>,
    pub capacity_tons: Quantity,
    pub status: TruckStatus,
}

impl Truck {
    /// `"PLATE - Driver"` or `"PLATE - No driver"`.
    ///
    /// The driver row lives elsewhere, so the caller passes it in.
    pub fn label(&self, driver: Option<&Driver>) -> String {
        match driver {
            Some(driver) => format!("{} - {}", self.plate, driver),
            None => format!("{} - No driver", self.plate),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TruckInput {
    pub plate: String,
    pub driver_id: Option<String>,
    pub capacity_tons: Quantity,
    #[serde(default)]
    pub status: TruckStatus,
}

impl TruckInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_plate(&self.plate)?;
        validate_optional_uuid("driver_id", self.driver_id.as_deref())?;
        validate_measure("capacity_tons", self.capacity_tons)?;
        Ok(())
    }
}
