use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::user::{CreateUser, Role, User};

const USER_COLUMNS: &str = "id, email, name, photo_url, role, created_at";

#[derive(Debug)]
pub enum UpsertOutcome {
    Created(User),
    AlreadyExists(User),
}

/// Role store: user records keyed by email.
#[derive(Clone)]
pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    /// Registers a user on first login. Safe under concurrent logins for the
    /// same email: the unique index decides which insert wins.
    pub async fn upsert_if_absent(&self, payload: &CreateUser) -> Result<UpsertOutcome, AppError> {
        let inserted = sqlx::query(
            "INSERT INTO users (email, name, photo_url, role) VALUES (?, ?, ?, ?)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(&payload.email)
        .bind(&payload.name)
        .bind(&payload.photo_url)
        .bind(Role::Student)
        .execute(&self.db)
        .await?
        .rows_affected();

        let user = self
            .find_by_email(&payload.email)
            .await?
            .ok_or_else(|| AppError::not_found("user vanished after insert"))?;

        if inserted == 0 {
            Ok(UpsertOutcome::AlreadyExists(user))
        } else {
            tracing::info!(email = %user.email, "registered new user");
            Ok(UpsertOutcome::Created(user))
        }
    }

    pub async fn set_role(&self, id: i64, role: Role) -> Result<u64, AppError> {
        let modified = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if modified == 0 {
            return Err(AppError::not_found(format!("user {id} not found")));
        }
        tracing::info!(user_id = id, ?role, "role updated");
        Ok(modified)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY id"
        ))
        .bind(role)
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }
}
