use crate::api::ApiClient;
use crate::models::User;
use crate::store::{ClientStore, FormErrors, FormKind, LoadingFlags};
use crate::view::View;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared by every handler. The store lock is never held across a backend call.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub store: Arc<Mutex<ClientStore>>,
    pub loading: Arc<LoadingFlags>,
}

impl AppState {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            store: Arc::new(Mutex::new(ClientStore::default())),
            loading: Arc::new(LoadingFlags::default()),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        let store = self.store.lock().await;

        let links = store
            .links
            .items()
            .iter()
            .map(|link| LinkView {
                short: link.short.clone(),
                url: link.url.clone(),
                short_url: self.api.short_url(&link.short),
                redirects: link.redirects,
                pending: link.pending,
                displayed_redirects: link.displayed_redirects(),
            })
            .collect();

        let selected = store.selected.as_ref().map(|selected| SelectionView {
            short: selected.short.clone(),
            loading: selected.is_loading(),
            error: selected.error.clone(),
            total: selected.timestamps.as_ref().map_or(0, Vec::len),
        });

        Snapshot {
            view: store.view,
            authenticated: store
                .session
                .as_ref()
                .is_some_and(|session| !session.token.is_empty()),
            user: store.user().cloned(),
            links,
            has_more: store.links.has_more(),
            draft_url: store.draft_url.clone(),
            errors: store.errors.clone(),
            notice: store.notice.clone(),
            loading: LoadingView {
                login: self.loading.is_loading(FormKind::Login),
                register: self.loading.is_loading(FormKind::Register),
                create_link: self.loading.is_loading(FormKind::CreateLink),
                link_list: self.loading.is_loading(FormKind::LinkList),
            },
            selected,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub view: View,
    pub authenticated: bool,
    pub user: Option<User>,
    pub links: Vec<LinkView>,
    pub has_more: bool,
    pub draft_url: String,
    pub errors: FormErrors,
    pub notice: Option<String>,
    pub loading: LoadingView,
    pub selected: Option<SelectionView>,
}

#[derive(Debug, Serialize)]
pub struct LinkView {
    pub short: String,
    pub url: String,
    pub short_url: String,
    pub redirects: u64,
    pub pending: u64,
    pub displayed_redirects: u64,
}

#[derive(Debug, Serialize)]
pub struct LoadingView {
    pub login: bool,
    pub register: bool,
    pub create_link: bool,
    pub link_list: bool,
}

#[derive(Debug, Serialize)]
pub struct SelectionView {
    pub short: String,
    pub loading: bool,
    pub error: Option<String>,
    pub total: usize,
}
