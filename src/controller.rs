//! User actions: each one validates, calls the backend and applies the
//! result to the store.
//!
//! Results are applied only while the session that issued the request is
//! still current, so a logout in the middle of a request discards its answer.

use crate::errors::AppError;
use crate::forms::{LinkForm, LoginForm, RegisterForm};
use crate::models::StatsResponse;
use crate::state::AppState;
use crate::stats::{aggregate_optional, Granularity};
use crate::store::FormKind;
use crate::view::{View, ViewEvent};
use chrono::Local;
use tracing::{debug, info, warn};

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const USER_FAILED: &str = "Failed to fetch user data";
const LINKS_FAILED: &str = "Failed to fetch URLs";
const CREATE_FAILED: &str = "Failed to create URL";
const STATS_FAILED: &str = "Failed to fetch URL statistics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The main request worked but a dependent one did not; the view shows it.
    Degraded,
    /// The backend refused; the form shows why.
    Failed,
    /// A client-side check failed and nothing was sent.
    Invalid,
    /// The same form already has a request outstanding.
    Busy,
    /// The answer arrived after the session or view it was meant for went away.
    Stale,
}

pub async fn login(state: &AppState, form: LoginForm) -> Result<Outcome, AppError> {
    {
        let mut store = state.store.lock().await;
        if store.view != View::Login {
            return Err(AppError::conflict("login is only available from the login view"));
        }
        if let Err(message) = form.validate() {
            store.errors.login = Some(message);
            return Ok(Outcome::Invalid);
        }
    }

    let Some(_loading) = state.loading.try_begin(FormKind::Login) else {
        return Ok(Outcome::Busy);
    };
    state.store.lock().await.errors.login = None;

    let token = match state.api.login(&form.username, &form.password).await {
        Ok(response) => response.access_token,
        Err(err) => {
            info!(username = %form.username, "login rejected: {err}");
            state.store.lock().await.errors.login = Some(err.message(LOGIN_FAILED));
            return Ok(Outcome::Failed);
        }
    };

    let session_id = state.store.lock().await.start_session(token.clone());

    let user = match state.api.current_user(&token).await {
        Ok(user) => user,
        Err(err) => {
            warn!("token issued but user lookup failed: {err}");
            let mut store = state.store.lock().await;
            if !store.is_current(session_id) {
                return Ok(Outcome::Stale);
            }
            store.errors.login = Some(err.message(USER_FAILED));
            return Ok(Outcome::Degraded);
        }
    };

    let username = user.username.clone();
    {
        let mut store = state.store.lock().await;
        if !store.is_current(session_id) {
            return Ok(Outcome::Stale);
        }
        if let Some(session) = store.session.as_mut() {
            session.user = Some(user);
        }
        store.links.clear();
        store.selected = None;
        store.notice = None;
        store.draft_url.clear();
    }

    let outcome = load_first_page(state, session_id, &token).await;
    if outcome == Outcome::Stale {
        return Ok(outcome);
    }

    // The dashboard appears only once the link list has answered.
    let mut store = state.store.lock().await;
    if !store.is_current(session_id) {
        return Ok(Outcome::Stale);
    }
    if let Err(err) = store.transition(ViewEvent::LoginSucceeded) {
        debug!("login finished after the view changed: {err}");
        return Ok(Outcome::Stale);
    }
    info!(username = %username, "logged in");
    Ok(outcome)
}

pub async fn register(state: &AppState, form: RegisterForm) -> Result<Outcome, AppError> {
    {
        let mut store = state.store.lock().await;
        if store.view != View::Register {
            return Err(AppError::conflict(
                "registration is only available from the register view",
            ));
        }
        if let Err(message) = form.validate() {
            store.errors.register = Some(message);
            return Ok(Outcome::Invalid);
        }
    }

    let Some(_loading) = state.loading.try_begin(FormKind::Register) else {
        return Ok(Outcome::Busy);
    };
    state.store.lock().await.errors.register = None;

    match state
        .api
        .register(&form.username, &form.password, form.full_name())
        .await
    {
        Ok(user) => {
            info!(username = %user.username, "account registered");
            let mut store = state.store.lock().await;
            match store.transition(ViewEvent::RegistrationSucceeded) {
                Ok(_) => {
                    store.errors.login = None;
                    Ok(Outcome::Completed)
                }
                Err(err) => {
                    debug!("registration finished after the view changed: {err}");
                    Ok(Outcome::Stale)
                }
            }
        }
        Err(err) => {
            info!(username = %form.username, "registration rejected: {err}");
            state.store.lock().await.errors.register = Some(err.message(REGISTER_FAILED));
            Ok(Outcome::Failed)
        }
    }
}

pub async fn logout(state: &AppState) -> Result<(), AppError> {
    let mut store = state.store.lock().await;
    store
        .view
        .transition(ViewEvent::Logout)
        .map_err(|err| AppError::conflict(err.to_string()))?;
    store.reset();
    info!("logged out");
    Ok(())
}

/// Moves between the login and register cards.
pub async fn switch_view(state: &AppState, event: ViewEvent) -> Result<View, AppError> {
    if !matches!(event, ViewEvent::RequestLogin | ViewEvent::RequestRegister) {
        return Err(AppError::bad_request("not a navigation request"));
    }
    let mut store = state.store.lock().await;
    let view = store
        .transition(event)
        .map_err(|err| AppError::conflict(err.to_string()))?;
    store.errors.login = None;
    store.errors.register = None;
    Ok(view)
}

/// A submit made while an earlier one is outstanding leaves the draft and
/// error of the earlier one untouched.
pub async fn create_link(state: &AppState, form: LinkForm) -> Result<Outcome, AppError> {
    let Some(_loading) = state.loading.try_begin(FormKind::CreateLink) else {
        return Ok(Outcome::Busy);
    };

    let (session_id, token) = {
        let mut store = state.store.lock().await;
        let session = store.active_session().ok_or_else(AppError::unauthorized)?;
        store.draft_url = form.url.clone();
        if let Err(message) = form.validate() {
            store.errors.create_link = Some(message);
            return Ok(Outcome::Invalid);
        }
        store.errors.create_link = None;
        session
    };

    let result = state.api.create_link(&token, form.url.trim()).await;

    let mut store = state.store.lock().await;
    if !store.is_current(session_id) {
        return Ok(Outcome::Stale);
    }
    match result {
        Ok(link) => {
            info!(short = %link.short, "short link created");
            store.links.prepend(link);
            store.draft_url.clear();
            Ok(Outcome::Completed)
        }
        Err(err) => {
            info!("link creation rejected: {err}");
            store.errors.create_link = Some(err.message(CREATE_FAILED));
            Ok(Outcome::Failed)
        }
    }
}

/// Reloads the first page, replacing local click estimates with server counts.
pub async fn refresh_links(state: &AppState) -> Result<Outcome, AppError> {
    let (session_id, token) = state
        .store
        .lock()
        .await
        .active_session()
        .ok_or_else(AppError::unauthorized)?;

    let Some(_loading) = state.loading.try_begin(FormKind::LinkList) else {
        return Ok(Outcome::Busy);
    };
    Ok(load_first_page(state, session_id, &token).await)
}

pub async fn load_more_links(state: &AppState) -> Result<Outcome, AppError> {
    let (session_id, token, page) = {
        let store = state.store.lock().await;
        let (session_id, token) = store.active_session().ok_or_else(AppError::unauthorized)?;
        (session_id, token, store.links.next_page())
    };

    let Some(_loading) = state.loading.try_begin(FormKind::LinkList) else {
        return Ok(Outcome::Busy);
    };

    let result = state.api.list_links(&token, page).await;

    let mut store = state.store.lock().await;
    if !store.is_current(session_id) {
        return Ok(Outcome::Stale);
    }
    match result {
        Ok(links) => {
            let added = store.links.append_page(page, links);
            debug!(page, added, "loaded more links");
            store.notice = None;
            Ok(Outcome::Completed)
        }
        Err(err) => {
            warn!(page, "link page fetch failed: {err}");
            store.notice = Some(err.message(LINKS_FAILED));
            Ok(Outcome::Degraded)
        }
    }
}

async fn load_first_page(state: &AppState, session_id: u64, token: &str) -> Outcome {
    let result = state.api.list_links(token, 1).await;

    let mut store = state.store.lock().await;
    if !store.is_current(session_id) {
        return Outcome::Stale;
    }
    match result {
        Ok(links) => {
            debug!(count = links.len(), "links loaded");
            store.links.reconcile(links);
            store.notice = None;
            Outcome::Completed
        }
        Err(err) => {
            warn!("link list fetch failed: {err}");
            store.notice = Some(err.message(LINKS_FAILED));
            Outcome::Degraded
        }
    }
}

/// Fetches the redirect history of `short`, replacing any earlier selection.
pub async fn select_link(state: &AppState, short: &str) -> Result<Outcome, AppError> {
    let (session_id, token, selection_id) = {
        let mut store = state.store.lock().await;
        let (session_id, token) = store.active_session().ok_or_else(AppError::unauthorized)?;
        if store.links.get(short).is_none() {
            return Err(AppError::not_found(format!("unknown short link {short}")));
        }
        (session_id, token, store.select(short))
    };

    let result = state
        .api
        .redirect_stats(&token, short)
        .await
        .map_err(|err| {
            warn!(short, "redirect stats fetch failed: {err}");
            err.message(STATS_FAILED)
        });
    let degraded = result.is_err();

    let mut store = state.store.lock().await;
    if !store.is_current(session_id) || !store.apply_stats(selection_id, result) {
        return Ok(Outcome::Stale);
    }
    Ok(if degraded {
        Outcome::Degraded
    } else {
        Outcome::Completed
    })
}

/// Counts the click locally and returns the public short URL to open.
pub async fn follow_short_link(state: &AppState, short: &str) -> Result<String, AppError> {
    let mut store = state.store.lock().await;
    store.active_session().ok_or_else(AppError::unauthorized)?;
    let link = store
        .links
        .record_local_click(short)
        .ok_or_else(|| AppError::not_found(format!("unknown short link {short}")))?;
    debug!(short, displayed = link.displayed_redirects(), "short link followed");
    Ok(state.api.short_url(short))
}

pub async fn follow_target_link(state: &AppState, short: &str) -> Result<String, AppError> {
    let store = state.store.lock().await;
    store.active_session().ok_or_else(AppError::unauthorized)?;
    store
        .links
        .get(short)
        .map(|link| link.url.clone())
        .ok_or_else(|| AppError::not_found(format!("unknown short link {short}")))
}

/// Chart data for the selected link at every granularity, in local time.
pub async fn selected_stats(state: &AppState) -> StatsResponse {
    let store = state.store.lock().await;
    let selected = store.selected.as_ref();
    let timestamps = selected.and_then(|selected| selected.timestamps.as_deref());
    let series = |granularity| aggregate_optional(timestamps, granularity, &Local);

    StatsResponse {
        short: selected.map(|selected| selected.short.clone()),
        loading: selected.is_some_and(|selected| selected.is_loading()),
        error: selected.and_then(|selected| selected.error.clone()),
        total: timestamps.map_or(0, <[String]>::len),
        minute: series(Granularity::Minute),
        hour: series(Granularity::Hour),
        day: series(Granularity::Day),
    }
}
