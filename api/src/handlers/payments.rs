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
        payment::{NewPayment, PaymentIntentRequest, PaymentIntentResponse, PaymentRecord},
        EmailQuery,
    },
    payment::price_to_cents,
    AppState,
};

/// POST /create_payment_intent
pub async fn create_payment_intent(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let amount = price_to_cents(payload.price)?;
    tracing::debug!(email = auth.email(), amount, "creating payment intent");

    let client_secret = state.payment_provider.create_intent(amount, "usd").await?;
    Ok(Json(PaymentIntentResponse { client_secret }))
}

/// POST /paymentInfo
pub async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<NewPayment>,
) -> Result<(StatusCode, Json<PaymentRecord>), AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(&payload.email)])
        .await?;

    let record = state.payments.record(&payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /paymentsHistory?email=
pub async fn payments_history(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<Vec<PaymentRecord>>, AppError> {
    auth.authorize(&state.users, &[Requirement::Owner(&query.email)])
        .await?;
    Ok(Json(state.payments.history(&query.email).await?))
}
