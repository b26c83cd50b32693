use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ClassStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClassListing {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub instructor_name: Option<String>,
    pub instructor_email: String,
    pub instructor_image: Option<String>,
    pub price: f64,
    pub status: ClassStatus,
    pub available_seats: i64,
    pub number_of_students: i64,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,
    pub image: Option<String>,
    pub instructor_name: Option<String>,
    pub instructor_email: String,
    pub instructor_image: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub available_seats: i64,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Written,
    AlreadySet,
}

/// A student's intent to take a class, recorded before payment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SelectedClass {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub instructor_name: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSelection {
    pub course_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub instructor_name: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug)]
pub enum SelectOutcome {
    Inserted(SelectedClass),
    AlreadySelected,
}
