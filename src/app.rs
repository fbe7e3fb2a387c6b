use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/view/register", post(handlers::show_register))
        .route("/view/login", post(handlers::show_login))
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/logout", post(handlers::logout))
        .route("/links", post(handlers::create_link))
        .route("/links/refresh", post(handlers::refresh_links))
        .route("/links/more", post(handlers::load_more_links))
        .route("/links/:short/stats", post(handlers::select_link))
        .route("/links/:short/follow", get(handlers::follow_short_link))
        .route("/links/:short/target", get(handlers::follow_target_link))
        .route("/api/state", get(handlers::get_state))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
