pub mod guard;
pub mod token;

pub use guard::{AuthUser, Requirement};
pub use token::TokenService;
