pub mod class;
pub mod enrollment;
pub mod payment;
pub mod user;

use serde::Deserialize;

/// `?email=` on owner-scoped listing routes.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}
