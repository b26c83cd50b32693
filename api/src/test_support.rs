//! Fixtures shared by the unit and router tests.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::auth::TokenService;
use crate::error::AppError;
use crate::models::class::{NewClass, NewSelection};
use crate::models::user::{CreateUser, Role, User};
use crate::payment::PaymentProvider;
use crate::store::{memory_pool, users::UpsertOutcome};
use crate::AppState;

pub const TEST_SECRET: &str = "summer-camp-test-secret";

/// Echoes the request back as the client secret.
pub struct FakeProvider;

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, AppError> {
        Ok(format!("secret_{amount_cents}_{currency}"))
    }
}

pub async fn test_app() -> (AppState, SqlitePool) {
    let pool = memory_pool().await;
    let state = AppState::new(
        pool.clone(),
        TokenService::new(TEST_SECRET),
        Arc::new(FakeProvider),
    );
    (state, pool)
}

pub async fn test_state() -> AppState {
    test_app().await.0
}

pub async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
    let user = match state
        .users
        .upsert_if_absent(&CreateUser {
            email: email.to_string(),
            name: None,
            photo_url: None,
        })
        .await
        .unwrap()
    {
        UpsertOutcome::Created(user) | UpsertOutcome::AlreadyExists(user) => user,
    };
    if role != user.role {
        state.users.set_role(user.id, role).await.unwrap();
    }
    state.users.find_by_email(email).await.unwrap().unwrap()
}

pub fn sample_class(instructor: &str, seats: i64) -> NewClass {
    NewClass {
        name: "Watercolor Basics".into(),
        image: Some("https://img.example/wc.png".into()),
        instructor_name: Some("Ivy".into()),
        instructor_email: instructor.into(),
        instructor_image: None,
        price: 49.5,
        available_seats: seats,
    }
}

pub fn sample_selection(email: &str, course_id: &str) -> NewSelection {
    NewSelection {
        course_id: course_id.into(),
        email: email.into(),
        name: Some("Watercolor Basics".into()),
        image: None,
        instructor_name: Some("Ivy".into()),
        price: Some(49.5),
    }
}
