use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    auth::{AuthUser, Requirement},
    error::AppError,
    extract::{JsonBody, QueryParams},
    models::{
        enrollment::{EnrollRequest, EnrolledClass},
        EmailQuery,
    },
    AppState,
};

/// POST /enrolledClass
pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrolledClass>), AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(&payload.email)])
        .await?;

    let enrolled = state.enrollments.enroll(&payload.email, &payload.id).await?;
    Ok((StatusCode::CREATED, Json(enrolled)))
}

/// GET /enrolledClasses?email=
pub async fn enrolled_classes(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<Vec<EnrolledClass>>, AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(&query.email)])
        .await?;
    Ok(Json(state.enrollments.list_by_student(&query.email).await?))
}
