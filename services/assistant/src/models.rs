//! Database Row Models
//!
//! Row shapes as `sqlx` reads them, and their conversion into the core
//! domain types.

use chrono::NaiveDate;
use sqlx::FromRow;
use teacher_assistant_core::{
    StorageError,
    grade::{GradeRecord, GradeValue},
    identity::{Identity, Role},
};

#[derive(FromRow, Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub role: String,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Identity {
            id: row.id,
            login: row.login,
            display_name: row.name,
            role: Role::from(row.role.as_str()),
        }
    }
}

#[derive(FromRow, Debug, Clone)]
pub struct GradeRow {
    pub id: i64,
    pub student_name: String,
    pub group_name: String,
    pub grade: i64,
    pub date_assigned: NaiveDate,
}

impl TryFrom<GradeRow> for GradeRecord {
    type Error = StorageError;

    fn try_from(row: GradeRow) -> Result<Self, Self::Error> {
        let value = GradeValue::try_from(row.grade).map_err(|e| {
            StorageError::ReadFailed(format!("grade row {} is corrupt: {}", row.id, e))
        })?;
        Ok(GradeRecord {
            id: row.id,
            student_name: row.student_name,
            group_name: row.group_name,
            value,
            assigned_on: row.date_assigned,
        })
    }
}
