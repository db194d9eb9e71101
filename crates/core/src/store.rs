//! Persistence seam consumed by the gateway and the interpreter.

use crate::error::StorageError;
use crate::grade::{GradeRecord, NewGrade};
use crate::identity::Identity;
use async_trait::async_trait;

/// Durable storage for accounts, groups and grades.
///
/// Implementations must make each write atomic on its own; two sessions
/// committing at the same time must each produce exactly one record.
/// The production implementation lives in the service crate (SQLite via
/// `sqlx`), tests use the generated `MockPersistenceStore`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Returns whether a group with exactly this name exists.
    async fn group_exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Appends one grade record.
    async fn insert_grade(&self, grade: &NewGrade) -> Result<(), StorageError>;

    /// Looks up an account whose stored password equals `password` verbatim.
    async fn find_user_by_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Identity>, StorageError>;

    /// Creates the group if it does not exist yet.
    async fn ensure_group(&self, name: &str) -> Result<(), StorageError>;

    /// All grade records, oldest first.
    async fn list_grades(&self) -> Result<Vec<GradeRecord>, StorageError>;
}
