use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{
    auth::{AuthUser, Requirement},
    error::AppError,
    extract::{JsonBody, PathParam, QueryParams},
    models::{
        class::{NewSelection, SelectOutcome, SelectedClass},
        EmailQuery,
    },
    AppState,
};

/// POST /selectClass
pub async fn select_class(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<NewSelection>,
) -> Result<Response, AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(&payload.email)])
        .await?;

    let response = match state.selections.select(&payload).await? {
        SelectOutcome::Inserted(record) => Json(record).into_response(),
        SelectOutcome::AlreadySelected => {
            Json(json!({ "exist": true, "message": "Already selected" })).into_response()
        }
    };
    Ok(response)
}

/// GET /selectedClasses?email=
pub async fn selected_classes(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<Vec<SelectedClass>>, AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(&query.email)])
        .await?;
    Ok(Json(state.selections.list_by_email(&query.email).await?))
}

/// DELETE /selectedClass/:id
pub async fn remove_selection(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.selections.remove(&id, auth.email()).await?;
    Ok(Json(json!({ "deletedCount": deleted })))
}
