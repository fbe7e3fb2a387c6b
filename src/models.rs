use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A shortened link as listed by the backend.
///
/// `redirects` is the last server-confirmed count. `pending` holds clicks
/// recorded locally since that count was fetched; it is never read from or
/// written to the wire and is dropped whenever the server list is reloaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortLink {
    pub short: String,
    pub url: String,
    #[serde(default)]
    pub redirects: u64,
    #[serde(skip)]
    pub pending: u64,
}

impl ShortLink {
    pub fn displayed_redirects(&self) -> u64 {
        self.redirects.saturating_add(self.pending)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub grant_type: &'static str,
}

impl<'a> LoginRequest<'a> {
    pub fn password_grant(username: &'a str, password: &'a str) -> Self {
        Self {
            username,
            password,
            grant_type: "password",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub full_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct CreateLinkRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesPoint {
    /// Display label for the bucket.
    pub date: String,
    pub clicks: u64,
    /// Start of the bucket in the display time zone, `YYYY-MM-DDTHH:MM:SS`.
    pub bucket: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClickSeries {
    pub points: Vec<SeriesPoint>,
    /// Timestamps that could not be parsed and were left out.
    pub skipped: usize,
}

impl ClickSeries {
    pub fn total_clicks(&self) -> u64 {
        self.points.iter().map(|point| point.clicks).sum()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub short: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub total: usize,
    pub minute: ClickSeries,
    pub hour: ClickSeries,
    pub day: ClickSeries,
}
