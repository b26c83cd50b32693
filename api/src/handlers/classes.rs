use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    auth::{AuthUser, Requirement},
    error::AppError,
    extract::{JsonBody, PathParam, QueryParams},
    models::{
        class::{ClassListing, ClassStatus, FeedbackOutcome, FeedbackRequest, NewClass},
        user::Role,
        EmailQuery,
    },
    AppState,
};

/// GET /classes
pub async fn list_approved(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassListing>>, AppError> {
    Ok(Json(state.classes.list_approved().await?))
}

/// GET /allClasses
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<ClassListing>>, AppError> {
    Ok(Json(state.classes.list_all().await?))
}

/// GET /selectedClass/:id
pub async fn get_class(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<ClassListing>, AppError> {
    let class = state
        .classes
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("class {id} not found")))?;
    Ok(Json(class))
}

/// POST /addClass
pub async fn add_class(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<NewClass>,
) -> Result<(StatusCode, Json<ClassListing>), AppError> {
    auth.authorize(
        &state.users,
        &[
            Requirement::Owner(&payload.instructor_email),
            Requirement::Role(Role::Instructor),
        ],
    )
    .await?;

    let class = state.classes.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// GET /myClasses?email=
pub async fn my_classes(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<Vec<ClassListing>>, AppError> {
    auth.authorize(
        &state.users,
        &[
            Requirement::Owner(&query.email),
            Requirement::Role(Role::Instructor),
        ],
    )
    .await?;
    Ok(Json(state.classes.list_by_instructor(&query.email).await?))
}

/// PATCH /approveClass/:id
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    set_status(&state, &auth, &id, ClassStatus::Approved).await
}

/// PATCH /denyClass/:id
pub async fn deny(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    set_status(&state, &auth, &id, ClassStatus::Denied).await
}

async fn set_status(
    state: &AppState,
    auth: &AuthUser,
    id: &str,
    status: ClassStatus,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.authorize(&state.users, &[Requirement::Role(Role::Admin)])
        .await?;
    let modified = state.classes.set_status(id, status).await?;
    Ok(Json(json!({ "modifiedCount": modified })))
}

/// PATCH /classFeedback/:id
///
/// Feedback can only be given once; later attempts leave it untouched. Those
/// repeat attempts historically got no response at all, and the empty 204
/// here stands in for that missing response.
pub async fn feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<FeedbackRequest>,
) -> Result<Response, AppError> {
    auth.authorize(&state.users, &[Requirement::Role(Role::Admin)])
        .await?;

    match state.classes.set_feedback_once(&id, &payload.feedback).await? {
        FeedbackOutcome::Written => Ok(Json(json!({ "modifiedCount": 1 })).into_response()),
        FeedbackOutcome::AlreadySet => {
            tracing::debug!(class_id = %id, "feedback already set, ignoring");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}
