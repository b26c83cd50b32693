use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::payment::{NewPayment, PaymentRecord};

const PAYMENT_COLUMNS: &str = "id, email, transaction_id, price, class_id, class_name, date";

/// Append-only payment history. `transaction_id` is unique, so a client
/// resubmitting the same payment gets a conflict instead of a second row.
#[derive(Clone)]
pub struct PaymentLog {
    db: SqlitePool,
}

impl PaymentLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn record(&self, payment: &NewPayment) -> Result<PaymentRecord, AppError> {
        if !payment.price.is_finite() || payment.price < 0.0 {
            return Err(AppError::bad_request("price must be a non-negative number"));
        }

        // RETURNING rows are drained with fetch_all so the statement runs to
        // completion before the connection goes back to the pool.
        let record = sqlx::query_as::<_, PaymentRecord>(&format!(
            "INSERT INTO payments (id, email, transaction_id, price, class_id, class_name, date) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&payment.email)
        .bind(&payment.transaction_id)
        .bind(payment.price)
        .bind(&payment.class_id)
        .bind(&payment.class_name)
        .bind(payment.date.unwrap_or_else(Utc::now))
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if duplicate {
                AppError::Conflict(format!("payment {} already recorded", payment.transaction_id))
            } else {
                AppError::Sqlx(e)
            }
        })?
        .pop()
        .ok_or(AppError::Sqlx(sqlx::Error::RowNotFound))?;

        tracing::info!(email = %record.email, transaction = %record.transaction_id, "payment recorded");
        Ok(record)
    }

    pub async fn history(&self, email: &str) -> Result<Vec<PaymentRecord>, AppError> {
        let payments = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE email = ? ORDER BY date DESC"
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(payments)
    }
}
