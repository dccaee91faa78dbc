//! Salary payments to agents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Agent;
use crate::validation::{validate_amount, validate_optional_reference, validate_period, validate_uuid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalaryPayment {
    pub id: String,
    pub reference: String,
    pub agent_id: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    pub amount: Money,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SalaryPayment {
    /// `"Salary First Last - 2026-10-01 to 2026-10-31"`.
    pub fn label(&self, agent: &Agent) -> String {
        format!(
            "Salary {} - {} to {}",
            agent, self.period_start, self.period_end
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalaryPaymentInput {
    pub reference: Option<String>,
    pub agent_id: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    pub amount: Money,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
}

impl SalaryPaymentInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_reference(self.reference.as_deref())?;
        validate_uuid("agent_id", &self.agent_id)?;
        validate_period("period", self.period_start, self.period_end)?;
        validate_amount("amount", self.amount)?;
        Ok(())
    }
}
