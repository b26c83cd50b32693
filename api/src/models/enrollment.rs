use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::class::{ClassListing, ClassStatus};

/// Snapshot of a class and its student taken at enrollment time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledClass {
    #[serde(rename = "_id")]
    pub id: String,
    pub class_id: String,
    pub name: String,
    pub image: Option<String>,
    pub instructor_name: Option<String>,
    pub instructor_email: String,
    pub instructor_image: Option<String>,
    pub available_seats: i64,
    pub price: f64,
    pub status: ClassStatus,
    pub number_of_students: i64,
    pub student_email: String,
    pub enrolled_at: DateTime<Utc>,
}

impl EnrolledClass {
    pub fn snapshot(class: &ClassListing, student_email: &str) -> Self {
        EnrolledClass {
            id: uuid::Uuid::new_v4().to_string(),
            class_id: class.id.clone(),
            name: class.name.clone(),
            image: class.image.clone(),
            instructor_name: class.instructor_name.clone(),
            instructor_email: class.instructor_email.clone(),
            instructor_image: class.instructor_image.clone(),
            available_seats: class.available_seats,
            price: class.price,
            status: class.status,
            number_of_students: class.number_of_students,
            student_email: student_email.to_string(),
            enrolled_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub email: String,
    pub id: String,
}
