use crate::controller;
use crate::errors::AppError;
use crate::forms::{LinkForm, LoginForm, RegisterForm};
use crate::models::StatsResponse;
use crate::state::{AppState, Snapshot};
use crate::ui::render_page;
use crate::view::ViewEvent;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use tracing::debug;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.snapshot().await;
    Html(render_page(&snapshot))
}

pub async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.snapshot().await)
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(controller::selected_stats(&state).await)
}

pub async fn show_register(State(state): State<AppState>) -> Result<Redirect, AppError> {
    controller::switch_view(&state, ViewEvent::RequestRegister).await?;
    Ok(Redirect::to("/"))
}

pub async fn show_login(State(state): State<AppState>) -> Result<Redirect, AppError> {
    controller::switch_view(&state, ViewEvent::RequestLogin).await?;
    Ok(Redirect::to("/"))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let outcome = controller::login(&state, form).await?;
    debug!(?outcome, "login submitted");
    Ok(Redirect::to("/"))
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let outcome = controller::register(&state, form).await?;
    debug!(?outcome, "registration submitted");
    Ok(Redirect::to("/"))
}

pub async fn logout(State(state): State<AppState>) -> Result<Redirect, AppError> {
    controller::logout(&state).await?;
    Ok(Redirect::to("/"))
}

pub async fn create_link(
    State(state): State<AppState>,
    Form(form): Form<LinkForm>,
) -> Result<Redirect, AppError> {
    let outcome = controller::create_link(&state, form).await?;
    debug!(?outcome, "link submitted");
    Ok(Redirect::to("/"))
}

pub async fn refresh_links(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let outcome = controller::refresh_links(&state).await?;
    debug!(?outcome, "links refreshed");
    Ok(Redirect::to("/"))
}

pub async fn load_more_links(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let outcome = controller::load_more_links(&state).await?;
    debug!(?outcome, "more links requested");
    Ok(Redirect::to("/"))
}

pub async fn select_link(
    State(state): State<AppState>,
    Path(short): Path<String>,
) -> Result<Redirect, AppError> {
    let outcome = controller::select_link(&state, &short).await?;
    debug!(?outcome, short = %short, "stats selected");
    Ok(Redirect::to("/#stats"))
}

pub async fn follow_short_link(
    State(state): State<AppState>,
    Path(short): Path<String>,
) -> Result<Redirect, AppError> {
    let target = controller::follow_short_link(&state, &short).await?;
    Ok(Redirect::to(&target))
}

pub async fn follow_target_link(
    State(state): State<AppState>,
    Path(short): Path<String>,
) -> Result<Redirect, AppError> {
    let target = controller::follow_target_link(&state, &short).await?;
    Ok(Redirect::to(&target))
}
