use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::handlers::{auth, classes, enrollments, payments, selections, users};
use crate::AppState;

async fn home() -> &'static str {
    "Welcome to Summer Camp Server"
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(home))
        .route("/jwt", post(auth::issue_token))
        .route("/users", post(auth::register).get(users::list_users))
        .route("/user", get(auth::current_user))
        .route("/users/admin/:email", get(auth::is_admin))
        .route("/users/instructor/:email", get(auth::is_instructor))
        .route("/users/admin_privilage/:id", patch(users::make_admin))
        .route("/users/instructor_privilage/:id", patch(users::make_instructor))
        .route("/instructors", get(users::list_instructors))
        .route("/classes", get(classes::list_approved))
        .route("/allClasses", get(classes::list_all))
        .route("/addClass", post(classes::add_class))
        .route("/myClasses", get(classes::my_classes))
        .route("/approveClass/:id", patch(classes::approve))
        .route("/denyClass/:id", patch(classes::deny))
        .route("/classFeedback/:id", patch(classes::feedback))
        .route("/selectClass", post(selections::select_class))
        .route("/selectedClasses", get(selections::selected_classes))
        .route(
            "/selectedClass/:id",
            get(classes::get_class).delete(selections::remove_selection),
        )
        .route("/create_payment_intent", post(payments::create_payment_intent))
        .route("/paymentInfo", post(payments::record_payment))
        .route("/paymentsHistory", get(payments::payments_history))
        .route("/enrolledClass", post(enrollments::enroll))
        .route("/enrolledClasses", get(enrollments::enrolled_classes))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
