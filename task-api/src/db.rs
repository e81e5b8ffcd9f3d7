use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::models::{Goal, Task};

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS goals (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS tasks (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    goal_id      INTEGER REFERENCES goals(id) ON DELETE SET NULL,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    completed_at TEXT
);";

/// Sort direction for `GET /tasks?sort=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Listing options for tasks. An exact title match takes precedence over
/// ordering, matching the query-param contract.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub title: Option<String>,
    pub order: Option<SortOrder>,
}

/// SQLite-backed store shared by all handlers. Cloning shares the pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if missing) the database at `database_url` and ensures
    /// the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    // ── Tasks ────────────────────────────────────────────────────────────

    pub async fn create_task(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Task, sqlx::Error> {
        let id = sqlx::query("INSERT INTO tasks (title, description) VALUES (?, ?)")
            .bind(title)
            .bind(description)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        self.get_task(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
        if let Some(title) = &filter.title {
            return sqlx::query_as("SELECT * FROM tasks WHERE title = ?")
                .bind(title)
                .fetch_all(&self.pool)
                .await;
        }

        let sql = match filter.order {
            Some(SortOrder::Asc) => "SELECT * FROM tasks ORDER BY title ASC",
            Some(SortOrder::Desc) => "SELECT * FROM tasks ORDER BY title DESC",
            None => "SELECT * FROM tasks",
        };
        sqlx::query_as(sql).fetch_all(&self.pool).await
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update_task(
        &self,
        id: i64,
        title: &str,
        description: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        let rows = sqlx::query("UPDATE tasks SET title = ?, description = ? WHERE id = ?")
            .bind(title)
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if rows == 0 {
            return Ok(None);
        }
        self.get_task(id).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    /// Sets or clears `completed_at`; `None` marks the task incomplete.
    pub async fn set_task_completion(
        &self,
        id: i64,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let rows = sqlx::query("UPDATE tasks SET completed_at = ? WHERE id = ?")
            .bind(completed_at)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if rows == 0 {
            return Ok(None);
        }
        self.get_task(id).await
    }

    /// Points every task in `task_ids` at the goal, atomically.
    pub async fn assign_tasks_to_goal(
        &self,
        goal_id: i64,
        task_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for task_id in task_ids {
            sqlx::query("UPDATE tasks SET goal_id = ? WHERE id = ?")
                .bind(goal_id)
                .bind(task_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }

    pub async fn tasks_for_goal(&self, goal_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM tasks WHERE goal_id = ?")
            .bind(goal_id)
            .fetch_all(&self.pool)
            .await
    }

    // ── Goals ────────────────────────────────────────────────────────────

    pub async fn create_goal(&self, title: &str) -> Result<Goal, sqlx::Error> {
        let id = sqlx::query("INSERT INTO goals (title) VALUES (?)")
            .bind(title)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        self.get_goal(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn list_goals(&self) -> Result<Vec<Goal>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM goals").fetch_all(&self.pool).await
    }

    pub async fn get_goal(&self, id: i64) -> Result<Option<Goal>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM goals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update_goal(&self, id: i64, title: &str) -> Result<Option<Goal>, sqlx::Error> {
        let rows = sqlx::query("UPDATE goals SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if rows == 0 {
            return Ok(None);
        }
        self.get_goal(id).await
    }

    /// Deletes the goal. Tasks that pointed at it keep existing with a null
    /// `goal_id` (FK is `ON DELETE SET NULL`).
    pub async fn delete_goal(&self, id: i64) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (Store, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}/test.db", dir.path().display());
        let store = Store::connect(&url).await.expect("store");
        (store, dir)
    }

    #[tokio::test]
    async fn create_and_get_task_roundtrip() {
        let (store, _dir) = test_store().await;

        let created = store.create_task("Buy milk", "Oat, 1L").await.unwrap();
        assert_eq!(created.title, "Buy milk");
        assert_eq!(created.goal_id, None);
        assert!(created.completed_at.is_none());

        let fetched = store.get_task(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.description, "Oat, 1L");
        assert!(store.get_task(created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_tasks_orders_by_title() {
        let (store, _dir) = test_store().await;
        for title in ["banana", "apple", "cherry"] {
            store.create_task(title, "x").await.unwrap();
        }

        let asc = store
            .list_tasks(&TaskFilter {
                order: Some(SortOrder::Asc),
                ..Default::default()
            })
            .await
            .unwrap();
        let titles: Vec<&str> = asc.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["apple", "banana", "cherry"]);

        let desc = store
            .list_tasks(&TaskFilter {
                order: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await
            .unwrap();
        let titles: Vec<&str> = desc.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["cherry", "banana", "apple"]);
    }

    #[tokio::test]
    async fn completion_toggles_and_clears() {
        let (store, _dir) = test_store().await;
        let task = store.create_task("Run", "5k").await.unwrap();

        let done = store
            .set_task_completion(task.id, Some(Utc::now()))
            .await
            .unwrap()
            .unwrap();
        assert!(done.is_complete());

        let undone = store
            .set_task_completion(task.id, None)
            .await
            .unwrap()
            .unwrap();
        assert!(!undone.is_complete());
    }

    #[tokio::test]
    async fn deleting_goal_orphans_its_tasks() {
        let (store, _dir) = test_store().await;
        let goal = store.create_goal("Health").await.unwrap();
        let task = store.create_task("Run", "5k").await.unwrap();
        store
            .assign_tasks_to_goal(goal.id, &[task.id])
            .await
            .unwrap();

        let owned = store.tasks_for_goal(goal.id).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].goal_id, Some(goal.id));

        assert!(store.delete_goal(goal.id).await.unwrap());
        let orphan = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(orphan.goal_id, None);
    }
}
