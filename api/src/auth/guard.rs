//! Request gates: who is calling, do they own the resource, do they hold the
//! role the route needs.
//!
//! Authentication happens in the [`AuthUser`] extractor, so a handler that
//! takes an `AuthUser` argument can never run for an anonymous caller. The
//! remaining checks are declared per route as an ordered list of
//! [`Requirement`]s and evaluated by [`AuthUser::authorize`].

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::models::user::{Claims, Role};
use crate::store::UserStore;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.claims.email
    }

    /// Runs each requirement in order and stops at the first failure.
    pub async fn authorize(
        &self,
        users: &UserStore,
        requirements: &[Requirement<'_>],
    ) -> Result<(), AppError> {
        for requirement in requirements {
            match requirement {
                Requirement::Owner(owner) => require_owner(self, owner)?,
                Requirement::Role(role) => require_role(users, self, *role).await?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Requirement<'a> {
    /// The caller's token email must equal this resource owner's email.
    Owner(&'a str),
    /// The caller's stored role must be exactly this one.
    Role(Role),
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Unauthorized access"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Unauthorized access"))?;

        let claims = state.tokens.verify(token.trim())?;
        Ok(AuthUser { claims })
    }
}

pub fn require_owner(auth: &AuthUser, owner_email: &str) -> Result<(), AppError> {
    if auth.email() != owner_email {
        return Err(AppError::forbidden("Forbidden access"));
    }
    Ok(())
}

/// A caller with no user record is denied like any other mismatch.
pub async fn require_role(users: &UserStore, auth: &AuthUser, role: Role) -> Result<(), AppError> {
    let stored = users.find_by_email(auth.email()).await?.map(|u| u.role);
    if stored != Some(role) {
        return Err(AppError::forbidden("Forbidden access"));
    }
    Ok(())
}
