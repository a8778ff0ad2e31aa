use axum::{
    routing::{get, post},
    Router,
};
use crate::backend::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/debts", get(handlers::list_debts).post(handlers::create_debt))
        .route(
            "/api/debts/:id",
            get(handlers::get_debt)
                .patch(handlers::update_debt)
                .delete(handlers::delete_debt),
        )
        .route("/api/debts/:id/pay", post(handlers::pay_debt))
        .route("/api/debts/:id/partial-pay", post(handlers::partial_pay_debt))
        .route("/api/strategy", post(handlers::plan_strategy))
}
