use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    auth::{AuthUser, Requirement},
    error::AppError,
    extract::{JsonBody, PathParam, QueryParams},
    models::{
        user::{AuthResponse, CreateUser, Role, TokenRequest},
        EmailQuery,
    },
    store::users::UpsertOutcome,
    AppState,
};

/// POST /jwt
pub async fn issue_token(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TokenRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::bad_request("email is required"));
    }
    let token = state.tokens.issue(&payload.email)?;
    Ok(Json(AuthResponse { token }))
}

/// POST /users: registration on first login.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUser>,
) -> Result<Json<Value>, AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::bad_request("email is required"));
    }

    let body = match state.users.upsert_if_absent(&payload).await? {
        UpsertOutcome::Created(user) => json!({ "created": true, "user": user }),
        UpsertOutcome::AlreadyExists(_) => {
            json!({ "created": false, "message": "user already exists" })
        }
    };
    Ok(Json(body))
}

/// GET /user?email=
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<Value>, AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(&query.email)])
        .await?;

    let user = state.users.find_by_email(&query.email).await?;
    let role = user.as_ref().map(|u| u.role);
    Ok(Json(json!({
        "user": user,
        "admin": role == Some(Role::Admin),
        "instructor": role == Some(Role::Instructor),
        "privileged": role.is_some_and(Role::is_privileged),
    })))
}

/// GET /users/admin/:email
pub async fn is_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(email): PathParam<String>,
) -> Result<Json<Value>, AppError> {
    let admin = has_role(&state, &auth, &email, Role::Admin).await?;
    Ok(Json(json!({ "admin": admin })))
}

/// GET /users/instructor/:email
pub async fn is_instructor(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(email): PathParam<String>,
) -> Result<Json<Value>, AppError> {
    let instructor = has_role(&state, &auth, &email, Role::Instructor).await?;
    Ok(Json(json!({ "instructor": instructor })))
}

async fn has_role(
    state: &AppState,
    auth: &AuthUser,
    email: &str,
    role: Role,
) -> Result<bool, AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(email)])
        .await?;
    let user = state.users.find_by_email(email).await?;
    Ok(user.is_some_and(|u| u.role == role))
}
