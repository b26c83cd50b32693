//! Moving a student from a selected class to an enrolled one.
//!
//! The seat decrement, the selection cleanup and the enrollment insert run in
//! one transaction. The guarded decrement is the transaction's first
//! statement: SQLite then takes the write lock up front, and a concurrent
//! enrollment waits for it instead of failing a read-to-write lock upgrade.

use sqlx::SqlitePool;

use super::{classes, selections};
use crate::error::AppError;
use crate::models::enrollment::EnrolledClass;

const ENROLLED_COLUMNS: &str = "id, class_id, name, image, instructor_name, instructor_email, \
     instructor_image, available_seats, price, status, number_of_students, student_email, enrolled_at";

#[derive(Clone)]
pub struct EnrollmentWorkflow {
    db: SqlitePool,
}

impl EnrollmentWorkflow {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn enroll(&self, student_email: &str, class_id: &str) -> Result<EnrolledClass, AppError> {
        if classes::find_by_id(&self.db, class_id).await?.is_none() {
            return Err(AppError::not_found(format!("class {class_id} not found")));
        }

        let mut tx = self.db.begin().await?;

        // Dropping `tx` on any early return rolls everything back.
        classes::adjust_seats_and_count(&mut *tx, class_id, -1, 1).await?;

        let removed = selections::remove_for_course(&mut *tx, student_email, class_id).await?;
        if removed == 0 {
            tracing::debug!(student = student_email, class_id, "enrolling without a prior selection");
        }

        let class = classes::find_by_id(&mut *tx, class_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("class {class_id} not found")))?;

        let enrolled = EnrolledClass::snapshot(&class, student_email);
        sqlx::query(
            "INSERT INTO enrolled_classes (id, class_id, name, image, instructor_name, \
             instructor_email, instructor_image, available_seats, price, status, \
             number_of_students, student_email, enrolled_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&enrolled.id)
        .bind(&enrolled.class_id)
        .bind(&enrolled.name)
        .bind(&enrolled.image)
        .bind(&enrolled.instructor_name)
        .bind(&enrolled.instructor_email)
        .bind(&enrolled.instructor_image)
        .bind(enrolled.available_seats)
        .bind(enrolled.price)
        .bind(enrolled.status)
        .bind(enrolled.number_of_students)
        .bind(&enrolled.student_email)
        .bind(enrolled.enrolled_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            student = student_email,
            class_id,
            seats_left = class.available_seats,
            "student enrolled"
        );
        Ok(enrolled)
    }

    pub async fn list_by_student(&self, email: &str) -> Result<Vec<EnrolledClass>, AppError> {
        let enrolled = sqlx::query_as::<_, EnrolledClass>(&format!(
            "SELECT {ENROLLED_COLUMNS} FROM enrolled_classes WHERE student_email = ? \
             ORDER BY enrolled_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(enrolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::class::SelectOutcome;
    use crate::store::{file_pool, memory_pool, ClassCatalog, SelectionStore};
    use crate::test_support::{sample_class, sample_selection};

    struct Fixture {
        catalog: ClassCatalog,
        selections: SelectionStore,
        workflow: EnrollmentWorkflow,
    }

    async fn fixture() -> Fixture {
        let pool = memory_pool().await;
        Fixture {
            catalog: ClassCatalog::new(pool.clone()),
            selections: SelectionStore::new(pool.clone()),
            workflow: EnrollmentWorkflow::new(pool),
        }
    }

    #[tokio::test]
    async fn enrolling_moves_both_counters() {
        let f = fixture().await;
        let class = f.catalog.create(&sample_class("ivy@x.com", 3)).await.unwrap();
        sqlx::query("UPDATE classes SET number_of_students = 5 WHERE id = ?")
            .bind(&class.id)
            .execute(&f.workflow.db)
            .await
            .unwrap();

        let enrolled = f.workflow.enroll("s@x.com", &class.id).await.unwrap();

        assert_eq!(enrolled.student_email, "s@x.com");
        assert_eq!(enrolled.available_seats, 2);
        assert_eq!(enrolled.number_of_students, 6);

        let stored = f.catalog.find_by_id(&class.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 2);
        assert_eq!(stored.number_of_students, 6);
        assert_eq!(f.workflow.list_by_student("s@x.com").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn enrolling_clears_the_selection() {
        let f = fixture().await;
        let class = f.catalog.create(&sample_class("ivy@x.com", 3)).await.unwrap();
        let outcome = f
            .selections
            .select(&sample_selection("s@x.com", &class.id))
            .await
            .unwrap();
        assert!(matches!(outcome, SelectOutcome::Inserted(_)));

        f.workflow.enroll("s@x.com", &class.id).await.unwrap();

        assert!(f.selections.list_by_email("s@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_class_is_rejected_without_side_effects() {
        let f = fixture().await;
        let class = f.catalog.create(&sample_class("ivy@x.com", 0)).await.unwrap();
        f.selections
            .select(&sample_selection("s@x.com", &class.id))
            .await
            .unwrap();

        let err = f.workflow.enroll("s@x.com", &class.id).await.unwrap_err();

        assert!(matches!(err, AppError::CapacityExceeded(_)));
        let stored = f.catalog.find_by_id(&class.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
        assert_eq!(stored.number_of_students, 0);
        assert_eq!(f.selections.list_by_email("s@x.com").await.unwrap().len(), 1);
        assert!(f.workflow.list_by_student("s@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_class_is_not_found() {
        let f = fixture().await;
        let err = f.workflow.enroll("s@x.com", "missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn last_seat_goes_to_exactly_one_student() {
        let f = fixture().await;
        let class = f.catalog.create(&sample_class("ivy@x.com", 1)).await.unwrap();

        let (a, b) = tokio::join!(
            f.workflow.enroll("a@x.com", &class.id),
            f.workflow.enroll("b@x.com", &class.id),
        );

        let outcomes = [a, b];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::CapacityExceeded(_))))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(rejected, 1);

        let stored = f.catalog.find_by_id(&class.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
        assert_eq!(stored.number_of_students, 1);
    }

    struct Race {
        outcomes: Vec<Result<EnrolledClass, AppError>>,
        catalog: ClassCatalog,
        class_id: String,
        _dir: tempfile::TempDir,
    }

    /// Spawns one enrollment per student against a file database with a
    /// full connection pool, so the attempts really overlap.
    async fn race(seats: i64, students: usize) -> Race {
        let (pool, dir) = file_pool().await;
        let catalog = ClassCatalog::new(pool.clone());
        let workflow = EnrollmentWorkflow::new(pool);
        let class = catalog.create(&sample_class("ivy@x.com", seats)).await.unwrap();

        let handles: Vec<_> = (0..students)
            .map(|n| {
                let workflow = workflow.clone();
                let class_id = class.id.clone();
                tokio::spawn(async move { workflow.enroll(&format!("s{n}@x.com"), &class_id).await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        Race {
            outcomes,
            catalog,
            class_id: class.id,
            _dir: dir,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enrollments_on_one_seat() {
        let Race { outcomes, catalog, class_id, _dir } = race(1, 2).await;

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::CapacityExceeded(_))))
            .count();
        assert_eq!((successes, rejected), (1, 1), "{outcomes:?}");

        let stored = catalog.find_by_id(&class_id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
        assert_eq!(stored.number_of_students, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn twenty_students_race_for_three_seats() {
        let Race { outcomes, catalog, class_id, _dir } = race(3, 20).await;

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::CapacityExceeded(_))))
            .count();
        assert_eq!(successes, 3, "{outcomes:?}");
        assert_eq!(rejected, 17, "{outcomes:?}");

        let stored = catalog.find_by_id(&class_id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
        assert_eq!(stored.number_of_students, 3);
    }
}
