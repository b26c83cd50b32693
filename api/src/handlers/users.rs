use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    auth::{AuthUser, Requirement},
    error::AppError,
    extract::PathParam,
    models::user::{Role, User},
    AppState,
};

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    auth.authorize(&state.users, &[Requirement::Role(Role::Admin)])
        .await?;
    Ok(Json(state.users.list_all().await?))
}

/// PATCH /users/admin_privilage/:id
pub async fn make_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    promote(&state, &auth, id, Role::Admin).await
}

/// PATCH /users/instructor_privilage/:id
pub async fn make_instructor(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    promote(&state, &auth, id, Role::Instructor).await
}

async fn promote(
    state: &AppState,
    auth: &AuthUser,
    id: i64,
    role: Role,
) -> Result<Json<Value>, AppError> {
    auth.authorize(&state.users, &[Requirement::Role(Role::Admin)])
        .await?;
    let modified = state.users.set_role(id, role).await?;
    Ok(Json(json!({ "modifiedCount": modified })))
}

/// GET /instructors
pub async fn list_instructors(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list_by_role(Role::Instructor).await?))
}
