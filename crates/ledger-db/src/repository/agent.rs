//! # Agent Repository
//!
//! Staff records. Deleting an agent removes every purchase, sale and salary
//! payment they booked.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_core::{Agent, AgentInput, ListQuery, StockPolicy};

use super::stock::{delete_owner, StockLedger, StockOwner};
use super::{new_id, push_order_and_paging, push_search};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, last_name, first_name, phone, address, position, hire_date, base_salary";

const OWNER: StockOwner = StockOwner {
    entity: "Agent",
    table: "agents",
    column: "agent_id",
    ledgers: &[StockLedger::Purchases, StockLedger::Sales],
};

#[derive(Debug, Clone)]
pub struct AgentRepository {
    pool: SqlitePool,
    stock_policy: StockPolicy,
}

impl AgentRepository {
    pub fn new(pool: SqlitePool, stock_policy: StockPolicy) -> Self {
        AgentRepository { pool, stock_policy }
    }

    pub async fn create(&self, input: &AgentInput) -> DbResult<Agent> {
        input.validate()?;

        let agent = Agent {
            id: new_id(),
            last_name: input.last_name.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
            position: input.position.trim().to_string(),
            hire_date: input.hire_date,
            base_salary: input.base_salary,
        };

        debug!(name = %agent, "Inserting agent");

        sqlx::query(
            r#"
            INSERT INTO agents (
                id, last_name, first_name, phone, address, position, hire_date, base_salary
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&agent.id)
        .bind(&agent.last_name)
        .bind(&agent.first_name)
        .bind(&agent.phone)
        .bind(&agent.address)
        .bind(&agent.position)
        .bind(agent.hire_date)
        .bind(agent.base_salary)
        .execute(&self.pool)
        .await?;

        Ok(agent)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Agent>> {
        let sql = format!("SELECT {COLUMNS} FROM agents WHERE id = ?1");
        let agent = sqlx::query_as::<_, Agent>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(agent)
    }

    pub async fn update(&self, id: &str, input: &AgentInput) -> DbResult<Agent> {
        input.validate()?;

        debug!(id = %id, "Updating agent");

        let result = sqlx::query(
            r#"
            UPDATE agents SET
                last_name = ?2,
                first_name = ?3,
                phone = ?4,
                address = ?5,
                position = ?6,
                hire_date = ?7,
                base_salary = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.last_name.trim())
        .bind(input.first_name.trim())
        .bind(input.phone.trim())
        .bind(input.address.trim())
        .bind(input.position.trim())
        .bind(input.hire_date)
        .bind(input.base_salary)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Agent", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Agent", id))
    }

    /// Deletes the agent with their purchases, sales and salary payments.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete_owner(&self.pool, self.stock_policy, OWNER, id).await
    }

    /// Lists agents by name. Searches last and first name; `position`
    /// filters on an exact job title.
    pub async fn list(&self, query: &ListQuery, position: Option<&str>) -> DbResult<Vec<Agent>> {
        query.validate()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM agents WHERE 1 = 1"));
        push_search(&mut qb, query, &["last_name", "first_name"]);
        if let Some(position) = position.map(str::trim).filter(|p| !p.is_empty()) {
            qb.push(" AND position = ").push_bind(position.to_string());
        }
        push_order_and_paging(&mut qb, "last_name, first_name", query);

        let agents = qb.build_query_as::<Agent>().fetch_all(&self.pool).await?;
        Ok(agents)
    }
}
