//! # Salary Payment Repository

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{ListQuery, ReferenceKind, SalaryPayment, SalaryPaymentInput, SalaryPaymentRow};

use super::{clean, new_id, push_date_range, push_order_and_paging, push_search, reference_or_generate};
use crate::error::{DbError, DbResult};

const COLUMNS: &str =
    "id, reference, agent_id, period_start, period_end, amount, payment_date, created_at";

#[derive(Debug, Clone)]
pub struct SalaryPaymentRepository {
    pool: SqlitePool,
}

impl SalaryPaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalaryPaymentRepository { pool }
    }

    pub async fn create(&self, input: &SalaryPaymentInput) -> DbResult<SalaryPayment> {
        input.validate()?;

        let payment = SalaryPayment {
            id: new_id(),
            reference: reference_or_generate(
                input.reference.as_deref(),
                ReferenceKind::SalaryPayment,
                input.payment_date,
            ),
            agent_id: input.agent_id.clone(),
            period_start: input.period_start,
            period_end: input.period_end,
            amount: input.amount,
            payment_date: input.payment_date,
            created_at: Utc::now(),
        };

        debug!(
            reference = %payment.reference,
            agent_id = %payment.agent_id,
            amount = %payment.amount,
            "Inserting salary payment"
        );

        sqlx::query(
            r#"
            INSERT INTO salary_payments (
                id, reference, agent_id, period_start, period_end, amount, payment_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.reference)
        .bind(&payment.agent_id)
        .bind(payment.period_start)
        .bind(payment.period_end)
        .bind(payment.amount)
        .bind(payment.payment_date)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&payment.reference))?;

        Ok(payment)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SalaryPayment>> {
        let sql = format!("SELECT {COLUMNS} FROM salary_payments WHERE id = ?1");
        let payment = sqlx::query_as::<_, SalaryPayment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// A blank reference keeps the stored one.
    pub async fn update(&self, id: &str, input: &SalaryPaymentInput) -> DbResult<SalaryPayment> {
        input.validate()?;

        debug!(id = %id, "Updating salary payment");

        let reference = clean(input.reference.as_deref());
        let result = sqlx::query(
            r#"
            UPDATE salary_payments SET
                reference = COALESCE(?2, reference),
                agent_id = ?3,
                period_start = ?4,
                period_end = ?5,
                amount = ?6,
                payment_date = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&reference)
        .bind(&input.agent_id)
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(input.amount)
        .bind(input.payment_date)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(reference.clone().unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SalaryPayment", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("SalaryPayment", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting salary payment");

        let result = sqlx::query("DELETE FROM salary_payments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SalaryPayment", id));
        }

        Ok(())
    }

    /// Lists payments, most recent first. Searches the agent's last name and
    /// the reference; the date range applies to the payment date.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Vec<SalaryPaymentRow>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                sp.id,
                a.first_name || ' ' || a.last_name AS agent,
                sp.period_start, sp.period_end, sp.amount, sp.payment_date, sp.reference
            FROM salary_payments sp
            JOIN agents a ON a.id = sp.agent_id
            WHERE 1 = 1
            "#,
        );
        push_search(&mut qb, query, &["a.last_name", "sp.reference"]);
        push_date_range(&mut qb, "sp.payment_date", &query.dates);
        push_order_and_paging(&mut qb, "sp.payment_date DESC, sp.created_at DESC", query);

        let rows = qb
            .build_query_as::<SalaryPaymentRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use chrono::NaiveDate;
    use ledger_core::{CoreError, Money, StockPolicy, ValidationError};

    fn september() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
        )
    }

    fn input(agent_id: &str) -> SalaryPaymentInput {
        let (start, end) = september();
        SalaryPaymentInput {
            reference: None,
            agent_id: agent_id.to_string(),
            period_start: start,
            period_end: end,
            amount: Money::from_major(50_000),
            payment_date: day(5),
        }
    }

    #[tokio::test]
    async fn test_create_and_label() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;

        let payment = db.salary_payments().create(&input(&booker.id)).await.unwrap();
        assert!(payment.reference.starts_with("SAL-20261005-"));
        assert_eq!(
            payment.label(&booker),
            "Salary Safi Bio - 2026-09-01 to 2026-09-30"
        );

        let rows = db.salary_payments().list(&ListQuery::new().search("bio")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].agent, "Safi Bio");
        assert_eq!(rows[0].amount, Money::from_major(50_000));
    }

    #[tokio::test]
    async fn test_inverted_period_is_rejected() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;

        let mut bad = input(&booker.id);
        std::mem::swap(&mut bad.period_start, &mut bad.period_end);

        let err = db.salary_payments().create(&bad).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::InvalidPeriod { .. }))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_reference_and_update() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;

        let mut first = input(&booker.id);
        first.reference = Some("SAL-0001".to_string());
        let created = db.salary_payments().create(&first).await.unwrap();

        let err = db.salary_payments().create(&first).await.unwrap_err();
        assert!(err.is_unique_violation());

        let mut raise = input(&booker.id);
        raise.amount = Money::from_major(55_000);
        let updated = db.salary_payments().update(&created.id, &raise).await.unwrap();
        assert_eq!(updated.reference, "SAL-0001");
        assert_eq!(updated.amount, Money::from_major(55_000));

        raise.reference = Some(String::new());
        let kept = db.salary_payments().update(&created.id, &raise).await.unwrap();
        assert_eq!(kept.reference, "SAL-0001");
    }

    #[tokio::test]
    async fn test_agent_delete_cascades() {
        let db = memory_db(StockPolicy::Incremental).await;
        let booker = agent(&db).await;
        let payment = db.salary_payments().create(&input(&booker.id)).await.unwrap();

        db.agents().delete(&booker.id).await.unwrap();

        assert!(db.salary_payments().get_by_id(&payment.id).await.unwrap().is_none());
    }
}
