use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::AppError;
use crate::models::class::{ClassListing, ClassStatus, FeedbackOutcome, NewClass};

const CLASS_COLUMNS: &str = "id, name, image, instructor_name, instructor_email, instructor_image, \
     price, status, available_seats, number_of_students, feedback, created_at";

#[derive(Clone)]
pub struct ClassCatalog {
    db: SqlitePool,
}

impl ClassCatalog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ClassListing>, AppError> {
        find_by_id(&self.db, id).await
    }

    pub async fn list_approved(&self) -> Result<Vec<ClassListing>, AppError> {
        let classes = sqlx::query_as::<_, ClassListing>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE status = ? ORDER BY created_at"
        ))
        .bind(ClassStatus::Approved)
        .fetch_all(&self.db)
        .await?;
        Ok(classes)
    }

    pub async fn list_all(&self) -> Result<Vec<ClassListing>, AppError> {
        let classes = sqlx::query_as::<_, ClassListing>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes ORDER BY created_at"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(classes)
    }

    pub async fn list_by_instructor(&self, email: &str) -> Result<Vec<ClassListing>, AppError> {
        let classes = sqlx::query_as::<_, ClassListing>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE instructor_email = ? ORDER BY created_at"
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(classes)
    }

    /// New classes always start out pending review with nobody enrolled.
    pub async fn create(&self, info: &NewClass) -> Result<ClassListing, AppError> {
        if info.available_seats < 0 {
            return Err(AppError::bad_request("availableSeats must not be negative"));
        }
        if !info.price.is_finite() || info.price < 0.0 {
            return Err(AppError::bad_request("price must be a non-negative number"));
        }

        let class = sqlx::query_as::<_, ClassListing>(&format!(
            "INSERT INTO classes (id, name, image, instructor_name, instructor_email, \
             instructor_image, price, status, available_seats, number_of_students, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?) RETURNING {CLASS_COLUMNS}"
        ))
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&info.name)
        .bind(&info.image)
        .bind(&info.instructor_name)
        .bind(&info.instructor_email)
        .bind(&info.instructor_image)
        .bind(info.price)
        .bind(ClassStatus::Pending)
        .bind(info.available_seats)
        .bind(Utc::now())
        .fetch_all(&self.db)
        .await?
        .pop()
        .ok_or(AppError::Sqlx(sqlx::Error::RowNotFound))?;

        tracing::info!(class_id = %class.id, instructor = %class.instructor_email, "class submitted");
        Ok(class)
    }

    /// Admins may move a class between any two statuses, including back out
    /// of `approved` or `denied`.
    pub async fn set_status(&self, id: &str, status: ClassStatus) -> Result<u64, AppError> {
        let modified = sqlx::query("UPDATE classes SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if modified == 0 {
            return Err(AppError::not_found(format!("class {id} not found")));
        }
        tracing::info!(class_id = id, ?status, "class status changed");
        Ok(modified)
    }

    pub async fn set_feedback_once(
        &self,
        id: &str,
        feedback: &str,
    ) -> Result<FeedbackOutcome, AppError> {
        let modified = sqlx::query("UPDATE classes SET feedback = ? WHERE id = ? AND feedback IS NULL")
            .bind(feedback)
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if modified > 0 {
            return Ok(FeedbackOutcome::Written);
        }
        match self.find_by_id(id).await? {
            Some(_) => Ok(FeedbackOutcome::AlreadySet),
            None => Err(AppError::not_found(format!("class {id} not found"))),
        }
    }
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<ClassListing>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let class = sqlx::query_as::<_, ClassListing>(&format!(
        "SELECT {CLASS_COLUMNS} FROM classes WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(class)
}

/// Moves both counters of one class in a single statement. The guard is
/// evaluated at write time, so two writers racing for the last seat cannot
/// both win.
pub(crate) async fn adjust_seats_and_count<'e, E>(
    executor: E,
    id: &str,
    seat_delta: i64,
    student_delta: i64,
) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let modified = sqlx::query(
        "UPDATE classes
         SET available_seats = available_seats + ?1,
             number_of_students = number_of_students + ?2
         WHERE id = ?3
           AND available_seats + ?1 >= 0
           AND number_of_students + ?2 >= 0",
    )
    .bind(seat_delta)
    .bind(student_delta)
    .bind(id)
    .execute(executor)
    .await?
    .rows_affected();

    if modified == 0 {
        return Err(AppError::CapacityExceeded(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_pool;
    use crate::test_support::sample_class;

    #[tokio::test]
    async fn create_starts_pending() {
        let catalog = ClassCatalog::new(memory_pool().await);
        let class = catalog.create(&sample_class("ivy@x.com", 10)).await.unwrap();

        assert_eq!(class.status, ClassStatus::Pending);
        assert_eq!(class.number_of_students, 0);
        assert!(class.feedback.is_none());
        assert!(catalog.list_approved().await.unwrap().is_empty());
        assert_eq!(catalog.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_negative_seats() {
        let catalog = ClassCatalog::new(memory_pool().await);
        let err = catalog.create(&sample_class("ivy@x.com", -1)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn status_can_be_changed_again() {
        let catalog = ClassCatalog::new(memory_pool().await);
        let class = catalog.create(&sample_class("ivy@x.com", 10)).await.unwrap();

        catalog.set_status(&class.id, ClassStatus::Approved).await.unwrap();
        assert_eq!(catalog.list_approved().await.unwrap().len(), 1);

        catalog.set_status(&class.id, ClassStatus::Denied).await.unwrap();
        assert!(catalog.list_approved().await.unwrap().is_empty());

        let err = catalog.set_status("missing", ClassStatus::Approved).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn feedback_is_write_once() {
        let catalog = ClassCatalog::new(memory_pool().await);
        let class = catalog.create(&sample_class("ivy@x.com", 10)).await.unwrap();

        let first = catalog.set_feedback_once(&class.id, "Needs a syllabus").await.unwrap();
        let second = catalog.set_feedback_once(&class.id, "Overwritten?").await.unwrap();

        assert_eq!(first, FeedbackOutcome::Written);
        assert_eq!(second, FeedbackOutcome::AlreadySet);
        let stored = catalog.find_by_id(&class.id).await.unwrap().unwrap();
        assert_eq!(stored.feedback.as_deref(), Some("Needs a syllabus"));
    }

    #[tokio::test]
    async fn feedback_on_missing_class_is_not_found() {
        let catalog = ClassCatalog::new(memory_pool().await);
        let err = catalog.set_feedback_once("missing", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn seat_adjustment_never_goes_negative() {
        let pool = memory_pool().await;
        let catalog = ClassCatalog::new(pool.clone());
        let class = catalog.create(&sample_class("ivy@x.com", 1)).await.unwrap();

        adjust_seats_and_count(&pool, &class.id, -1, 1).await.unwrap();
        let err = adjust_seats_and_count(&pool, &class.id, -1, 1).await.unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));

        let stored = catalog.find_by_id(&class.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
        assert_eq!(stored.number_of_students, 1);
    }

    #[tokio::test]
    async fn lists_by_instructor() {
        let catalog = ClassCatalog::new(memory_pool().await);
        catalog.create(&sample_class("ivy@x.com", 10)).await.unwrap();
        catalog.create(&sample_class("ivy@x.com", 5)).await.unwrap();
        catalog.create(&sample_class("other@x.com", 5)).await.unwrap();

        assert_eq!(catalog.list_by_instructor("ivy@x.com").await.unwrap().len(), 2);
    }
}
