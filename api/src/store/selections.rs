use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::AppError;
use crate::models::class::{NewSelection, SelectOutcome, SelectedClass};

const SELECTION_COLUMNS: &str =
    "id, course_id, email, name, image, instructor_name, price, created_at";

#[derive(Clone)]
pub struct SelectionStore {
    db: SqlitePool,
}

impl SelectionStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Records the selection unless the student already picked this course.
    /// A conflicting insert returns no row.
    pub async fn select(&self, selection: &NewSelection) -> Result<SelectOutcome, AppError> {
        let inserted = sqlx::query_as::<_, SelectedClass>(&format!(
            "INSERT INTO selected_classes \
             (id, course_id, email, name, image, instructor_name, price, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (email, course_id) DO NOTHING \
             RETURNING {SELECTION_COLUMNS}"
        ))
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&selection.course_id)
        .bind(&selection.email)
        .bind(&selection.name)
        .bind(&selection.image)
        .bind(&selection.instructor_name)
        .bind(selection.price)
        .bind(Utc::now())
        .fetch_all(&self.db)
        .await?
        .pop();

        Ok(match inserted {
            Some(record) => SelectOutcome::Inserted(record),
            None => SelectOutcome::AlreadySelected,
        })
    }

    pub async fn list_by_email(&self, email: &str) -> Result<Vec<SelectedClass>, AppError> {
        let selections = sqlx::query_as::<_, SelectedClass>(&format!(
            "SELECT {SELECTION_COLUMNS} FROM selected_classes WHERE email = ? ORDER BY created_at"
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(selections)
    }

    /// Deletes one of the caller's selections; other students' rows are
    /// never matched.
    pub async fn remove(&self, id: &str, email: &str) -> Result<u64, AppError> {
        let deleted = sqlx::query("DELETE FROM selected_classes WHERE id = ? AND email = ?")
            .bind(id)
            .bind(email)
            .execute(&self.db)
            .await?
            .rows_affected();
        Ok(deleted)
    }
}

pub(crate) async fn remove_for_course<'e, E>(
    executor: E,
    email: &str,
    course_id: &str,
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let deleted = sqlx::query("DELETE FROM selected_classes WHERE email = ? AND course_id = ?")
        .bind(email)
        .bind(course_id)
        .execute(executor)
        .await?
        .rows_affected();
    Ok(deleted)
}
