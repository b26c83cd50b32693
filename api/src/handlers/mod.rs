pub mod auth;
pub mod classes;
pub mod enrollments;
pub mod payments;
pub mod selections;
pub mod users;
