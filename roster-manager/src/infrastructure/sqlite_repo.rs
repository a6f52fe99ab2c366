use std::path::Path;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};

use crate::domain::models::{AssignmentMap, BackendSnapshot, DateKey, Role, SwapRecord};
use crate::error::{Result, RosterError};
use crate::infrastructure::repository::RosterBackend;

/// Local persistence: the current mapping plus an audit table of applied swaps
pub struct SqliteRosterRepository {
    pool: SqlitePool,
}

// =====================
// Row helper structs
// =====================

#[derive(FromRow)]
struct AssignmentRow {
    date_key: String,
    role: String,
}

#[derive(FromRow)]
struct SwapRecordRow {
    from_date: String,
    to_date: String,
    person: String,
    swapped_with: Option<String>,
}

fn parse_stored_key(raw: &str) -> Result<DateKey> {
    DateKey::parse(raw)
        .ok_or_else(|| RosterError::MalformedBackendPayload(format!("stored date key {:?}", raw)))
}

impl SqliteRosterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database file and runs migrations
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        log::info!("using roster database at {}", path.display());
        Ok(Self::new(pool))
    }

    /// Replaces the stored mapping with `assignments` in one transaction.
    /// Returns the number of rows written.
    pub async fn save_assignments(&self, assignments: &AssignmentMap) -> Result<u64> {
        // 1. begin
        let mut tx = self.pool.begin().await?;

        // 2. dates dropped from the map (degenerate swaps) must disappear too
        sqlx::query("DELETE FROM assignments")
            .execute(&mut *tx)
            .await?;

        // 3. insert the current map
        let mut written = 0;
        for (date_key, role) in assignments.iter() {
            written += sqlx::query("INSERT INTO assignments (date_key, role) VALUES (?1, ?2)")
                .bind(date_key.to_string())
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        // 4. commit
        tx.commit().await?;

        Ok(written)
    }

    pub async fn find_assignments(&self) -> Result<AssignmentMap> {
        let rows: Vec<AssignmentRow> = sqlx::query_as::<sqlx::Sqlite, AssignmentRow>(
            "SELECT date_key, role FROM assignments ORDER BY date_key ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<(DateKey, Role)> {
                Ok((parse_stored_key(&row.date_key)?, Role::new(&row.role)))
            })
            .collect()
    }

    pub async fn append_swap(&self, record: &SwapRecord) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO swap_records (
                from_date,
                to_date,
                person,
                swapped_with
            ) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(record.from.to_string())
        .bind(record.to.to_string())
        .bind(record.person.as_str())
        .bind(record.swapped_with.as_ref().map(|r| r.as_str().to_string()))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Applied swaps, oldest first
    pub async fn list_swaps(&self) -> Result<Vec<SwapRecord>> {
        let rows: Vec<SwapRecordRow> = sqlx::query_as::<sqlx::Sqlite, SwapRecordRow>(
            "SELECT from_date, to_date, person, swapped_with FROM swap_records ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<SwapRecord> {
                Ok(SwapRecord {
                    from: parse_stored_key(&row.from_date)?,
                    to: parse_stored_key(&row.to_date)?,
                    person: Role::new(&row.person),
                    swapped_with: row.swapped_with.as_deref().map(Role::new),
                })
            })
            .collect()
    }
}

#[async_trait]
impl RosterBackend for SqliteRosterRepository {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn fetch(&self) -> Result<BackendSnapshot> {
        Ok(BackendSnapshot::Mapping(self.find_assignments().await?))
    }

    async fn store_assignments(&self, assignments: &AssignmentMap) -> Result<()> {
        let written = self.save_assignments(assignments).await?;
        log::debug!("sqlite: stored {} assignments", written);
        Ok(())
    }

    async fn submit_swap(&self, record: &SwapRecord) -> Result<()> {
        let id = self.append_swap(record).await?;
        log::debug!("sqlite: recorded swap #{}", id);
        Ok(())
    }
}

#[cfg(test)]
mod sqlite_repo_tests {
    use super::*;

    // in-memory db; a single connection so every query sees the same database
    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create memory pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("failed to run migrations");

        pool
    }

    #[tokio::test]
    async fn test_save_and_find_assignments() {
        let repository = SqliteRosterRepository::new(setup_test_db().await);

        let input: AssignmentMap = [
            (DateKey::from_ymd(2024, 3, 1).unwrap(), Role::new("DC")),
            (DateKey::from_ymd(2024, 3, 4).unwrap(), Role::new("HD DCS")),
        ]
        .into_iter()
        .collect();

        let written = repository.save_assignments(&input).await.expect("Failed to save");
        assert_eq!(written, 2);

        let fetched = repository.find_assignments().await.expect("Failed to find");
        assert_eq!(fetched, input);
    }

    #[tokio::test]
    async fn test_unreadable_row_is_malformed() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO assignments (date_key, role) VALUES ('tomorrow', 'DC')")
            .execute(&pool)
            .await
            .unwrap();

        let repository = SqliteRosterRepository::new(pool);
        assert!(matches!(
            repository.fetch().await,
            Err(RosterError::MalformedBackendPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_list_swaps_in_insert_order() {
        let repository = SqliteRosterRepository::new(setup_test_db().await);
        let key = |d| DateKey::from_ymd(2024, 3, d).unwrap();

        let first = SwapRecord {
            from: key(5),
            to: key(4),
            person: Role::new("C"),
            swapped_with: Some(Role::new("B")),
        };
        let second = SwapRecord {
            from: key(1),
            to: key(2),
            person: Role::new("A"),
            swapped_with: None,
        };
        let first_id = repository.append_swap(&first).await.expect("Failed to append");
        let second_id = repository.append_swap(&second).await.expect("Failed to append");
        assert!(second_id > first_id);

        let listed = repository.list_swaps().await.expect("Failed to list");
        assert_eq!(listed, vec![first, second]);
    }
}
