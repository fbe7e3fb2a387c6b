//! In-memory client state: session, links, stats selection and per-form status.

use crate::models::{ShortLink, User};
use crate::view::{InvalidTransition, View, ViewEvent};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub struct Session {
    pub id: u64,
    pub token: String,
    /// `None` until `/api/me` has answered.
    pub user: Option<User>,
}

#[derive(Debug, Default)]
pub struct LinkCollection {
    items: Vec<ShortLink>,
    pages_loaded: u32,
    exhausted: bool,
}

impl LinkCollection {
    pub fn items(&self) -> &[ShortLink] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, short: &str) -> Option<&ShortLink> {
        self.items.iter().find(|link| link.short == short)
    }

    /// Newly created links go first; nothing is deduplicated or re-sorted.
    pub fn prepend(&mut self, link: ShortLink) {
        self.items.insert(0, link);
    }

    /// Replaces the list with the backend's first page. Local click deltas
    /// are discarded in favour of the server counts.
    pub fn reconcile(&mut self, fresh: Vec<ShortLink>) {
        self.exhausted = fresh.is_empty();
        self.items = fresh;
        self.pages_loaded = 1;
    }

    /// Appends a later page, skipping links already shown. Returns how many
    /// were added.
    pub fn append_page(&mut self, page: u32, links: Vec<ShortLink>) -> usize {
        if links.is_empty() {
            self.exhausted = true;
            return 0;
        }

        let before = self.items.len();
        for link in links {
            if self.get(&link.short).is_none() {
                self.items.push(link);
            }
        }
        self.pages_loaded = self.pages_loaded.max(page);
        self.items.len() - before
    }

    pub fn next_page(&self) -> u32 {
        self.pages_loaded.saturating_add(1)
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    /// Counts a click on the short link before the backend has seen it.
    pub fn record_local_click(&mut self, short: &str) -> Option<&ShortLink> {
        let link = self.items.iter_mut().find(|link| link.short == short)?;
        link.pending = link.pending.saturating_add(1);
        Some(link)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct SelectedStats {
    pub id: u64,
    pub short: String,
    /// `None` while the request is outstanding or after it failed.
    pub timestamps: Option<Vec<String>>,
    pub error: Option<String>,
}

impl SelectedStats {
    pub fn is_loading(&self) -> bool {
        self.timestamps.is_none() && self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FormErrors {
    pub login: Option<String>,
    pub register: Option<String>,
    pub create_link: Option<String>,
}

#[derive(Debug, Default)]
pub struct ClientStore {
    pub view: View,
    pub session: Option<Session>,
    pub links: LinkCollection,
    pub selected: Option<SelectedStats>,
    pub errors: FormErrors,
    /// Value of the create-link input; kept after a failed submit.
    pub draft_url: String,
    /// Dashboard-level message for partially failed operations.
    pub notice: Option<String>,
    sessions_started: u64,
    selections_made: u64,
}

impl ClientStore {
    pub fn transition(&mut self, event: ViewEvent) -> Result<View, InvalidTransition> {
        self.view = self.view.transition(event)?;
        Ok(self.view)
    }

    /// Stores a fresh token and returns the id later results must match.
    pub fn start_session(&mut self, token: String) -> u64 {
        self.sessions_started += 1;
        self.session = Some(Session {
            id: self.sessions_started,
            token,
            user: None,
        });
        self.sessions_started
    }

    pub fn is_current(&self, session_id: u64) -> bool {
        self.session.as_ref().is_some_and(|session| session.id == session_id)
    }

    /// Session id and token, provided the dashboard is showing.
    pub fn active_session(&self) -> Option<(u64, String)> {
        if self.view != View::Dashboard {
            return None;
        }
        self.session
            .as_ref()
            .filter(|session| !session.token.is_empty())
            .map(|session| (session.id, session.token.clone()))
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().and_then(|session| session.user.as_ref())
    }

    pub fn select(&mut self, short: &str) -> u64 {
        self.selections_made += 1;
        self.selected = Some(SelectedStats {
            id: self.selections_made,
            short: short.to_string(),
            timestamps: None,
            error: None,
        });
        self.selections_made
    }

    /// Stores a stats result if `selection_id` is still the current selection.
    pub fn apply_stats(&mut self, selection_id: u64, result: Result<Vec<String>, String>) -> bool {
        match self.selected.as_mut() {
            Some(selected) if selected.id == selection_id => {
                match result {
                    Ok(timestamps) => selected.timestamps = Some(timestamps),
                    Err(message) => selected.error = Some(message),
                }
                true
            }
            _ => false,
        }
    }

    /// Drops everything tied to the signed-in user and returns to login.
    pub fn reset(&mut self) {
        self.view = View::Login;
        self.session = None;
        self.links.clear();
        self.selected = None;
        self.errors = FormErrors::default();
        self.draft_url.clear();
        self.notice = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
    CreateLink,
    LinkList,
}

/// One busy flag per form, set while that form's request is outstanding.
#[derive(Debug, Default)]
pub struct LoadingFlags {
    login: AtomicBool,
    register: AtomicBool,
    create_link: AtomicBool,
    link_list: AtomicBool,
}

impl LoadingFlags {
    fn flag(&self, form: FormKind) -> &AtomicBool {
        match form {
            FormKind::Login => &self.login,
            FormKind::Register => &self.register,
            FormKind::CreateLink => &self.create_link,
            FormKind::LinkList => &self.link_list,
        }
    }

    pub fn is_loading(&self, form: FormKind) -> bool {
        self.flag(form).load(Ordering::Acquire)
    }

    /// Marks `form` busy, or returns `None` if it already is.
    pub fn try_begin(self: &Arc<Self>, form: FormKind) -> Option<LoadingGuard> {
        self.flag(form)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(LoadingGuard {
            flags: Arc::clone(self),
            form,
        })
    }
}

#[derive(Debug)]
pub struct LoadingGuard {
    flags: Arc<LoadingFlags>,
    form: FormKind,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flags.flag(self.form).store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(short: &str, redirects: u64) -> ShortLink {
        ShortLink {
            short: short.into(),
            url: format!("https://example.com/{short}"),
            redirects,
            pending: 0,
        }
    }

    #[test]
    fn prepend_puts_newest_first_without_dedup() {
        let mut links = LinkCollection::default();
        links.reconcile(vec![link("a", 0), link("b", 0)]);
        links.prepend(link("c", 0));
        links.prepend(link("a", 0));
        let shorts: Vec<_> = links.items().iter().map(|l| l.short.as_str()).collect();
        assert_eq!(shorts, vec!["a", "c", "a", "b"]);
    }

    #[test]
    fn local_clicks_are_pending_until_reconciled() {
        let mut links = LinkCollection::default();
        links.reconcile(vec![link("a", 5)]);

        let clicked = links.record_local_click("a").unwrap();
        assert_eq!(clicked.displayed_redirects(), 6);
        assert_eq!(clicked.redirects, 5);
        assert!(links.record_local_click("missing").is_none());

        links.reconcile(vec![link("a", 7)]);
        let fresh = links.get("a").unwrap();
        assert_eq!(fresh.pending, 0);
        assert_eq!(fresh.displayed_redirects(), 7);
    }

    #[test]
    fn append_page_skips_known_links_and_detects_the_end() {
        let mut links = LinkCollection::default();
        links.reconcile(vec![link("a", 0), link("b", 0)]);
        assert_eq!(links.next_page(), 2);

        assert_eq!(links.append_page(2, vec![link("b", 0), link("c", 0)]), 1);
        assert_eq!(links.next_page(), 3);
        assert!(links.has_more());

        assert_eq!(links.append_page(3, Vec::new()), 0);
        assert!(!links.has_more());
        assert_eq!(links.len(), 3);
    }

    #[test]
    fn stale_stats_results_are_ignored() {
        let mut store = ClientStore::default();
        let first = store.select("a");
        let second = store.select("b");

        assert!(!store.apply_stats(first, Ok(vec!["2024-01-01T00:00:00".into()])));
        assert!(store.selected.as_ref().unwrap().is_loading());

        assert!(store.apply_stats(second, Err("Failed to fetch URL statistics".into())));
        let selected = store.selected.as_ref().unwrap();
        assert_eq!(selected.short, "b");
        assert!(!selected.is_loading());
    }

    #[test]
    fn reset_clears_session_state_but_not_ids() {
        let mut store = ClientStore::default();
        let first = store.start_session("token".into());
        store.view = View::Dashboard;
        store.links.reconcile(vec![link("a", 1)]);
        store.draft_url = "https://example.com".into();
        store.select("a");

        store.reset();
        assert_eq!(store.view, View::Login);
        assert!(store.session.is_none());
        assert!(store.links.is_empty());
        assert!(store.selected.is_none());
        assert!(store.draft_url.is_empty());
        assert!(!store.is_current(first));

        let second = store.start_session("other".into());
        assert_ne!(first, second);
    }

    #[test]
    fn active_session_requires_dashboard() {
        let mut store = ClientStore::default();
        let id = store.start_session("token".into());
        assert!(store.active_session().is_none());
        store.view = View::Dashboard;
        assert_eq!(store.active_session(), Some((id, "token".to_string())));
    }

    #[test]
    fn loading_guard_blocks_duplicates_until_dropped() {
        let flags = Arc::new(LoadingFlags::default());
        let guard = flags.try_begin(FormKind::Login).unwrap();
        assert!(flags.is_loading(FormKind::Login));
        assert!(flags.try_begin(FormKind::Login).is_none());
        assert!(flags.try_begin(FormKind::CreateLink).is_some());

        drop(guard);
        assert!(!flags.is_loading(FormKind::Login));
        assert!(flags.try_begin(FormKind::Login).is_some());
    }
}
