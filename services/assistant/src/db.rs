//! Data Access Layer
//!
//! SQLite implementation of the core `PersistenceStore`. It uses `sqlx`
//! runtime queries over a connection pool; every write runs in its own
//! transaction and SQLite's writer lock serialises concurrent sessions.

use crate::models::{GradeRow, UserRow};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use teacher_assistant_core::{
    PersistenceStore, StorageError,
    grade::{GradeRecord, NewGrade},
    identity::Identity,
};
use tracing::{debug, instrument};

/// How long a writer waits for another session's transaction to finish.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn read_err(e: sqlx::Error) -> StorageError {
    StorageError::ReadFailed(e.to_string())
}

fn write_err(e: sqlx::Error) -> StorageError {
    StorageError::WriteFailed(e.to_string())
}

/// A wrapper around the `SqlitePool` to provide a clear data access interface.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Creates a new `Db` instance.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL '{}'", database_url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;
        Ok(Self::new(pool))
    }

    /// Runs all pending `sqlx` migrations, which also seed the administrator.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Number of stored grade records.
    pub async fn count_grades(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM grades")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count grades")?;
        Ok(count)
    }
}

#[async_trait]
impl PersistenceStore for Db {
    #[instrument(skip(self))]
    async fn group_exists(&self, name: &str) -> Result<bool, StorageError> {
        let found =
            sqlx::query_scalar::<_, i64>("SELECT 1 FROM groups WHERE group_name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(read_err)?;
        debug!(exists = found.is_some(), "Group lookup");
        Ok(found.is_some())
    }

    #[instrument(skip_all, fields(student = %grade.student_name, group = %grade.group_name))]
    async fn insert_grade(&self, grade: &NewGrade) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(write_err)?;

        sqlx::query(
            r#"
            INSERT INTO grades (student_name, group_name, grade, date_assigned)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&grade.student_name)
        .bind(&grade.group_name)
        .bind(i64::from(grade.value.get()))
        .bind(grade.assigned_on)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        tx.commit().await.map_err(write_err)?;
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn find_user_by_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Identity>, StorageError> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, login, name, role FROM users WHERE login = ? AND password = ?",
        )
        .bind(login)
        .bind(password)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_err)?;
        Ok(user.map(Identity::from))
    }

    async fn ensure_group(&self, name: &str) -> Result<(), StorageError> {
        sqlx::query("INSERT OR IGNORE INTO groups (group_name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(())
    }

    async fn list_grades(&self) -> Result<Vec<GradeRecord>, StorageError> {
        let rows = sqlx::query_as::<_, GradeRow>(
            r#"
            SELECT id, student_name, group_name, grade, date_assigned
            FROM grades
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;
        rows.into_iter().map(GradeRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use teacher_assistant_core::{
        Assistant, Conversation, LoginOutcome,
        auth::{CredentialPolicy, hash_password},
        grade::GradeValue,
        identity::Role,
        interpreter::CommandInterpreter,
        reply::{ChatLine, Reply},
    };

    async fn memory_db() -> Db {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        let db = Db::new(pool);
        db.run_migrations().await.expect("migrations");
        db
    }

    fn assistant(db: &Db) -> Assistant {
        let store: Arc<dyn PersistenceStore> = Arc::new(db.clone());
        Assistant::new(store.clone(), CredentialPolicy::HashedOnly)
            .with_interpreter(CommandInterpreter::new(store).with_clock(|| {
                NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
            }))
    }

    async fn login_admin(assistant: &Assistant) -> Conversation {
        match assistant.on_login_attempt("admin", "admin").await {
            LoginOutcome::Success { conversation, .. } => conversation,
            LoginOutcome::Failure { notice } => panic!("admin login failed: {}", notice),
        }
    }

    async fn send_all(
        assistant: &Assistant,
        conversation: &mut Conversation,
        lines: &[&str],
    ) -> Vec<ChatLine> {
        let mut last = Vec::new();
        for line in lines {
            last = assistant.on_user_line(conversation, line).await;
        }
        last
    }

    #[tokio::test]
    async fn test_seeded_admin_can_log_in() {
        let db = memory_db().await;
        let identity = db
            .find_user_by_credentials("admin", &hash_password("admin"))
            .await
            .unwrap()
            .expect("seeded admin");
        assert_eq!(identity.display_name, "Administrator");
        assert_eq!(identity.role, Role::Admin);

        assert!(
            db.find_user_by_credentials("admin", "admin")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = memory_db().await;
        db.run_migrations().await.unwrap();
        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE login = 'admin'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(admins, 1);
    }

    #[tokio::test]
    async fn test_groups_are_matched_exactly() {
        let db = memory_db().await;
        assert!(!db.group_exists("Group-5").await.unwrap());

        db.ensure_group("Group-5").await.unwrap();
        db.ensure_group("Group-5").await.unwrap();

        assert!(db.group_exists("Group-5").await.unwrap());
        assert!(!db.group_exists("Group-9").await.unwrap());
        assert!(!db.group_exists("group-5 ").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_and_list_grades() {
        let db = memory_db().await;
        let grade = NewGrade {
            student_name: "Ivan Petrov".into(),
            group_name: "Group-5".into(),
            value: GradeValue::parse("4").unwrap(),
            assigned_on: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
        };
        db.insert_grade(&grade).await.unwrap();

        let grades = db.list_grades().await.unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(db.count_grades().await.unwrap(), 1);
        assert_eq!(grades[0].student_name, "Ivan Petrov");
        assert_eq!(grades[0].group_name, "Group-5");
        assert_eq!(grades[0].value.get(), 4);
        assert_eq!(grades[0].assigned_on, grade.assigned_on);
    }

    #[tokio::test]
    async fn test_legacy_plaintext_account() {
        let db = memory_db().await;
        sqlx::query(
            "INSERT INTO users (login, password, name, role) VALUES ('olga', 'qwerty', 'Olga', 'teacher')",
        )
        .execute(&db.pool)
        .await
        .unwrap();
        let store: Arc<dyn PersistenceStore> = Arc::new(db.clone());

        let strict = Assistant::new(store.clone(), CredentialPolicy::HashedOnly);
        assert!(matches!(
            strict.on_login_attempt("olga", "qwerty").await,
            LoginOutcome::Failure { .. }
        ));

        let legacy = Assistant::new(store, CredentialPolicy::AllowLegacyPlaintext);
        match legacy.on_login_attempt("olga", "qwerty").await {
            LoginOutcome::Success { conversation, .. } => {
                assert_eq!(conversation.state.identity().role, Role::Teacher)
            }
            LoginOutcome::Failure { .. } => panic!("legacy login should succeed"),
        }
    }

    #[tokio::test]
    async fn test_stored_digest_cannot_be_used_as_password() {
        let db = memory_db().await;
        let digest: String = sqlx::query_scalar("SELECT password FROM users WHERE login = 'admin'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(digest, hash_password("admin"));

        let store: Arc<dyn PersistenceStore> = Arc::new(db.clone());
        let legacy = Assistant::new(store, CredentialPolicy::AllowLegacyPlaintext);
        assert!(matches!(
            legacy.on_login_attempt("admin", &digest).await,
            LoginOutcome::Failure { .. }
        ));
        assert!(matches!(
            legacy.on_login_attempt("admin", "admin").await,
            LoginOutcome::Success { .. }
        ));
    }

    #[tokio::test]
    async fn test_grading_scenario_persists_one_record() {
        let db = memory_db().await;
        db.ensure_group("Group-5").await.unwrap();
        let assistant = assistant(&db);
        let mut conversation = login_admin(&assistant).await;

        let last = send_all(
            &assistant,
            &mut conversation,
            &["выставить оценку", "Ivan Petrov", "Group-5", "4"],
        )
        .await;

        assert_eq!(
            last,
            vec![ChatLine::bot(&Reply::GradeSaved {
                student_name: "Ivan Petrov".into(),
                group_name: "Group-5".into(),
                value: GradeValue::parse("4").unwrap(),
            })]
        );
        assert_eq!(conversation.state.active_command(), None);

        let grades = db.list_grades().await.unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].student_name, "Ivan Petrov");
        assert_eq!(grades[0].group_name, "Group-5");
        assert_eq!(grades[0].value.get(), 4);
        assert_eq!(
            grades[0].assigned_on,
            NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_group_scenario_writes_nothing() {
        let db = memory_db().await;
        db.ensure_group("Group-5").await.unwrap();
        let assistant = assistant(&db);
        let mut conversation = login_admin(&assistant).await;

        let last = send_all(
            &assistant,
            &mut conversation,
            &["выставить оценку", "Ivan Petrov", "Group-9", "4"],
        )
        .await;

        // "4" arrives after the abort, so it is read as a top-level command.
        assert_eq!(last, vec![ChatLine::bot(&Reply::UnknownCommand)]);
        assert!(
            conversation
                .transcript
                .contains(&ChatLine::bot(&Reply::GroupNotFound))
        );
        assert!(db.list_grades().await.unwrap().is_empty());

        let restart = assistant
            .on_user_line(&mut conversation, "выставить оценку")
            .await;
        assert_eq!(restart, vec![ChatLine::bot(&Reply::AskStudentName)]);
    }

    #[tokio::test]
    async fn test_rejected_grades_write_nothing() {
        let db = memory_db().await;
        db.ensure_group("Group-5").await.unwrap();
        let assistant = assistant(&db);
        let mut conversation = login_admin(&assistant).await;

        send_all(
            &assistant,
            &mut conversation,
            &["выставить оценку", "Ivan Petrov", "Group-5", "0", "7", "отлично"],
        )
        .await;
        assert!(db.list_grades().await.unwrap().is_empty());
        assert_eq!(
            conversation.state.collected_fields().group_name,
            Some("Group-5")
        );
    }

    #[tokio::test]
    async fn test_concurrent_sessions_each_write_their_own_record() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("assistant.db").display());
        let db = Db::connect(&url, 4).await.unwrap();
        db.run_migrations().await.unwrap();
        db.ensure_group("Group-5").await.unwrap();
        let assistant = assistant(&db);

        let students: Vec<String> = (0..8).map(|i| format!("Student {}", i)).collect();
        let mut handles = Vec::new();
        for student in students.clone() {
            let assistant = assistant.clone();
            handles.push(tokio::spawn(async move {
                let mut conversation = login_admin(&assistant).await;
                send_all(
                    &assistant,
                    &mut conversation,
                    &["выставить оценку", student.as_str(), "Group-5", "5"],
                )
                .await
            }));
        }
        for handle in handles {
            let last = handle.await.unwrap();
            assert!(matches!(
                last.as_slice(),
                [ChatLine { text, .. }] if text.ends_with("сохранена.")
            ));
        }

        let mut saved: Vec<String> = db
            .list_grades()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.student_name)
            .collect();
        saved.sort();
        assert_eq!(saved, students);
    }
}
