use anyhow::Result;
use chrono::NaiveDate;
use sqlx::Row;

use crate::storage::sqlite::connection::DbConnection;
use shared::ContributionMonth;

/// Repository for contribution month records
#[derive(Clone)]
pub struct MonthRepository {
    db: DbConnection,
}

impl MonthRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_month(row: &sqlx::sqlite::SqliteRow) -> ContributionMonth {
        ContributionMonth {
            id: row.get("id"),
            month: row.get("month"),
            due_date: row.get("due_date"),
            is_locked: row.get("is_locked"),
        }
    }

    /// Store a contribution month and return the generated id.
    /// The UNIQUE (month) constraint rejects a second row for the same month.
    pub async fn store_month(&self, month: &ContributionMonth) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO contribution_months (month, due_date, is_locked)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(month.month)
        .bind(month.due_date)
        .bind(month.is_locked)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a contribution month by id
    pub async fn get_month(&self, month_id: i64) -> Result<Option<ContributionMonth>> {
        let row = sqlx::query(
            r#"
            SELECT id, month, due_date, is_locked
            FROM contribution_months
            WHERE id = ?
            "#,
        )
        .bind(month_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_month))
    }

    /// Get a contribution month by its (normalized) month date
    pub async fn get_month_by_date(&self, month: NaiveDate) -> Result<Option<ContributionMonth>> {
        let row = sqlx::query(
            r#"
            SELECT id, month, due_date, is_locked
            FROM contribution_months
            WHERE month = ?
            "#,
        )
        .bind(month)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_month))
    }

    /// List all contribution months, most recent first
    pub async fn list_months(&self) -> Result<Vec<ContributionMonth>> {
        let rows = sqlx::query(
            r#"
            SELECT id, month, due_date, is_locked
            FROM contribution_months
            ORDER BY month DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_month).collect())
    }

    /// List months still open for payment entry, most recent first
    pub async fn list_open_months(&self) -> Result<Vec<ContributionMonth>> {
        let rows = sqlx::query(
            r#"
            SELECT id, month, due_date, is_locked
            FROM contribution_months
            WHERE is_locked = 0
            ORDER BY month DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_month).collect())
    }

    /// Flip the entry lock on a month. Never touches month or due_date.
    pub async fn set_locked(&self, month_id: i64, is_locked: bool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE contribution_months SET is_locked = ? WHERE id = ?
            "#,
        )
        .bind(is_locked)
        .bind(month_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a contribution month; the schema cascades to its payments
    pub async fn delete_month(&self, month_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM contribution_months WHERE id = ?
            "#,
        )
        .bind(month_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
