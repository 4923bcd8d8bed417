use anyhow::Result;
use sqlx::Row;

use crate::storage::sqlite::connection::DbConnection;
use shared::Member;

/// Repository for member records
#[derive(Clone)]
pub struct MemberRepository {
    db: DbConnection,
}

impl MemberRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_member(row: &sqlx::sqlite::SqliteRow) -> Member {
        Member {
            id: row.get("id"),
            name: row.get("name"),
            phone: row.get("phone"),
            joined_date: row.get("joined_date"),
            is_active: row.get("is_active"),
        }
    }

    /// Store a member and return the generated id
    pub async fn store_member(&self, member: &Member) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO members (name, phone, joined_date, is_active)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&member.name)
        .bind(&member.phone)
        .bind(member.joined_date)
        .bind(member.is_active)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a member by id
    pub async fn get_member(&self, member_id: i64) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, phone, joined_date, is_active
            FROM members
            WHERE id = ?
            "#,
        )
        .bind(member_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_member))
    }

    /// List all members ordered by name
    pub async fn list_members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, phone, joined_date, is_active
            FROM members
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_member).collect())
    }

    /// List members eligible for new payment entry
    pub async fn list_active_members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, phone, joined_date, is_active
            FROM members
            WHERE is_active = 1
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_member).collect())
    }

    /// Update a member record
    pub async fn update_member(&self, member: &Member) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE members
            SET name = ?, phone = ?, joined_date = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.name)
        .bind(&member.phone)
        .bind(member.joined_date)
        .bind(member.is_active)
        .bind(member.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a member; the schema cascades to their payments
    pub async fn delete_member(&self, member_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM members WHERE id = ?
            "#,
        )
        .bind(member_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
