//! HTTP client for the linker backend.

use crate::errors::ApiError;
use crate::models::{
    CreateLinkRequest, ErrorBody, LoginRequest, RegisterRequest, ShortLink, TokenResponse, User,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public address of a short link; the backend answers it with a redirect.
    pub fn short_url(&self, short: &str) -> String {
        match self.url_with_segments(&[short]) {
            Ok(url) => url.into(),
            Err(err) => {
                debug!("falling back to a plain short URL: {err}");
                format!("{}/{}", self.base_url, short)
            }
        }
    }

    /// Appends `segments` to the base URL, percent-encoding each one so a
    /// short code can never add path segments, a query or a fragment.
    fn url_with_segments(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Exchanges credentials for a bearer token (OAuth2 password grant).
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/api/login", self.base_url))
            .form(&LoginRequest::password_grant(username, password))
            .send()
            .await?;

        Self::decode(Self::check_response(response).await?).await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<User, ApiError> {
        let response = self
            .http
            .post(format!("{}/api/register", self.base_url))
            .json(&RegisterRequest {
                username,
                password,
                full_name,
            })
            .send()
            .await?;

        Self::decode(Self::check_response(response).await?).await
    }

    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        Self::decode(Self::check_response(response).await?).await
    }

    /// Lists one page of the user's links, newest first as ordered by the backend.
    pub async fn list_links(&self, token: &str, page: u32) -> Result<Vec<ShortLink>, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/me/urls", self.base_url))
            .query(&[("page", page)])
            .bearer_auth(token)
            .send()
            .await?;

        Self::decode(Self::check_response(response).await?).await
    }

    pub async fn create_link(&self, token: &str, url: &str) -> Result<ShortLink, ApiError> {
        let response = self
            .http
            .post(format!("{}/api/me/urls", self.base_url))
            .bearer_auth(token)
            .json(&CreateLinkRequest { url })
            .send()
            .await?;

        Self::decode(Self::check_response(response).await?).await
    }

    /// Fetches one timestamp per recorded redirect of `short`.
    pub async fn redirect_stats(&self, token: &str, short: &str) -> Result<Vec<String>, ApiError> {
        let response = self
            .http
            .get(self.url_with_segments(&["api", "me", "links", short, "redirects"])?)
            .bearer_auth(token)
            .send()
            .await?;

        Self::decode(Self::check_response(response).await?).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json().await.map_err(ApiError::Decode)
    }

    /// Turns a non-success status into `ApiError::Http`, keeping the body's
    /// `detail` when it is a plain string.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
            }) => Some(detail),
            Ok(_) => None,
            Err(err) => {
                debug!("error body was not JSON: {err}");
                None
            }
        };

        Err(ApiError::Http { status, detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.short_url("xYz12"), "http://localhost:8000/xYz12");
    }

    #[test]
    fn short_codes_are_encoded_as_one_path_segment() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.short_url("a/b?c#d"), "http://localhost:8000/a%2Fb%3Fc%23d");

        let url = client
            .url_with_segments(&["api", "me", "links", "../urls", "redirects"])
            .unwrap();
        assert_eq!(url.path(), "/api/me/links/..%2Furls/redirects");
    }

    #[test]
    fn base_path_is_kept_before_segments() {
        let client = ApiClient::new("http://example.test/shortener/");
        assert_eq!(client.short_url("abc"), "http://example.test/shortener/abc");
    }
}
