use anyhow::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:chama.db";

/// DbConnection manages the SQLite pool and owns the schema.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection.
    ///
    /// Cascade deletes depend on the `foreign_keys` pragma, which must be
    /// set on every connection in the pool.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema.
    ///
    /// The uniqueness constraints here are the final authority on duplicate
    /// months and duplicate (member, month) payments; service-level checks
    /// are advisory pre-checks only.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                joined_date TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contribution_months (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                month TEXT NOT NULL,
                due_date TEXT NOT NULL,
                is_locked INTEGER NOT NULL DEFAULT 0,
                UNIQUE (month)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                member_id INTEGER NOT NULL,
                month_id INTEGER NOT NULL,
                amount_paid REAL NOT NULL DEFAULT 2500,
                paid_date TEXT,
                fine_amount REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'Pending',
                recorded_at TEXT NOT NULL,
                UNIQUE (member_id, month_id),
                FOREIGN KEY (member_id) REFERENCES members (id) ON DELETE CASCADE,
                FOREIGN KEY (month_id) REFERENCES contribution_months (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Indexes for the month and member lookups used by listings
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_payments_month_id
            ON payments(month_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_payments_member_id
            ON payments(member_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
