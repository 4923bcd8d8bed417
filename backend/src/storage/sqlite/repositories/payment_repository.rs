use anyhow::{anyhow, Result};
use sqlx::Row;

use crate::storage::sqlite::connection::DbConnection;
use shared::{Payment, PaymentStatus};

/// Repository for payment records
#[derive(Clone)]
pub struct PaymentRepository {
    db: DbConnection,
}

impl PaymentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_payment(row: &sqlx::sqlite::SqliteRow) -> Result<Payment> {
        let label: String = row.get("status");
        let status = PaymentStatus::from_label(&label)
            .ok_or_else(|| anyhow!("Unknown payment status in storage: {}", label))?;

        Ok(Payment {
            id: row.get("id"),
            member_id: row.get("member_id"),
            month_id: row.get("month_id"),
            amount_paid: row.get("amount_paid"),
            paid_date: row.get("paid_date"),
            fine_amount: row.get("fine_amount"),
            status,
            recorded_at: row.get("recorded_at"),
        })
    }

    /// Store a payment and return the generated id.
    /// The UNIQUE (member_id, month_id) constraint is the final authority on
    /// duplicates; callers translate that violation into a conflict error.
    pub async fn store_payment(&self, payment: &Payment) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (member_id, month_id, amount_paid, paid_date, fine_amount, status, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.member_id)
        .bind(payment.month_id)
        .bind(payment.amount_paid)
        .bind(payment.paid_date)
        .bind(payment.fine_amount)
        .bind(payment.status.as_label())
        .bind(&payment.recorded_at)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a payment by id
    pub async fn get_payment(&self, payment_id: i64) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, member_id, month_id, amount_paid, paid_date, fine_amount, status, recorded_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(payment_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_payment).transpose()
    }

    /// Find the payment a member has recorded for a month, if any
    pub async fn find_by_member_and_month(
        &self,
        member_id: i64,
        month_id: i64,
    ) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, member_id, month_id, amount_paid, paid_date, fine_amount, status, recorded_at
            FROM payments
            WHERE member_id = ? AND month_id = ?
            "#,
        )
        .bind(member_id)
        .bind(month_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_payment).transpose()
    }

    /// List all payments, most recent month first, then member name
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.member_id, p.month_id, p.amount_paid, p.paid_date,
                   p.fine_amount, p.status, p.recorded_at
            FROM payments p
            JOIN contribution_months cm ON cm.id = p.month_id
            JOIN members mb ON mb.id = p.member_id
            ORDER BY cm.month DESC, mb.name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    /// List one member's payment history, most recent month first
    pub async fn list_for_member(&self, member_id: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.member_id, p.month_id, p.amount_paid, p.paid_date,
                   p.fine_amount, p.status, p.recorded_at
            FROM payments p
            JOIN contribution_months cm ON cm.id = p.month_id
            WHERE p.member_id = ?
            ORDER BY cm.month DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    /// List the payments recorded against one contribution month
    pub async fn list_for_month(&self, month_id: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.member_id, p.month_id, p.amount_paid, p.paid_date,
                   p.fine_amount, p.status, p.recorded_at
            FROM payments p
            JOIN members mb ON mb.id = p.member_id
            WHERE p.month_id = ?
            ORDER BY mb.name ASC
            "#,
        )
        .bind(month_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    /// Update a payment record. recorded_at is immutable after the first
    /// save and stays out of the SET list.
    pub async fn update_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE payments
            SET member_id = ?, month_id = ?, amount_paid = ?, paid_date = ?, fine_amount = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.member_id)
        .bind(payment.month_id)
        .bind(payment.amount_paid)
        .bind(payment.paid_date)
        .bind(payment.fine_amount)
        .bind(payment.status.as_label())
        .bind(payment.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a payment record
    pub async fn delete_payment(&self, payment_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM payments WHERE id = ?
            "#,
        )
        .bind(payment_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
