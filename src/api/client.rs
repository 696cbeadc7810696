use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::article::{ArticleShapeError, RawArticle, RawArticleList};
use crate::api::{
    Article, ArticleCreate, ArticleListResponse, ArticleQuery, ArticleUpdate, AuthProvider,
    ChatRequest, ChatResponse, ChatTurn, IndexReport, IndexRequest, IndexStats, SearchRequest,
    SearchResponse, TokenVerifyResponse, User,
};
use crate::core::chat_stream::{fragment_stream, FragmentStream};
use crate::utils::url::{construct_api_url, normalize_base_url};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Failures surfaced by backend calls.
#[derive(Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    Status { status: u16, message: String },
    /// The request never completed or the body could not be read.
    Network(reqwest::Error),
    /// A response body was not the JSON we expected.
    Json(serde_json::Error),
    /// An article payload decoded but could not be normalized.
    Shape(ArticleShapeError),
    /// A mutating call was attempted without a bearer token.
    Unauthenticated,
}

impl ApiError {
    pub fn is_parse(&self) -> bool {
        matches!(self, ApiError::Json(_) | ApiError::Shape(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status { message, .. } => write!(f, "{message}"),
            ApiError::Network(err) => write!(f, "Network error: {err}"),
            ApiError::Json(err) => write!(f, "Malformed response: {err}"),
            ApiError::Shape(err) => write!(f, "Malformed response: {err}"),
            ApiError::Unauthenticated => write!(f, "Not authenticated"),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Network(err) => Some(err),
            ApiError::Json(err) => Some(err),
            ApiError::Shape(err) => Some(err),
            ApiError::Status { .. } | ApiError::Unauthenticated => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Json(err)
    }
}

impl From<ArticleShapeError> for ApiError {
    fn from(err: ArticleShapeError) -> Self {
        ApiError::Shape(err)
    }
}

/// Pull a human readable message out of an error body.
///
/// The backend reports failures as `{"detail": "..."}`, or as a list of
/// validation entries each carrying a `msg`. A body that is not JSON at
/// all yields "Request failed"; JSON without a usable `detail` yields
/// `HTTP <status>`.
pub fn extract_error_detail(status: StatusCode, body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return "Request failed".to_string();
    };

    let detail = match value.get("detail") {
        Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(serde_json::Value::Array(entries)) => entries
            .iter()
            .find_map(|entry| entry.get("msg").and_then(|msg| msg.as_str()))
            .map(str::to_owned),
        _ => None,
    };

    detail.unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Thin wrapper over `reqwest` that knows the backend's base URL and
/// conventions.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        construct_api_url(&self.base_url, path)
    }

    /// Address the browser would be sent to in order to start a login.
    pub fn login_url(&self, provider: AuthProvider) -> String {
        self.endpoint(&provider.login_path())
    }

    fn build(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        debug!(method = %method, path = %path, authenticated = token.is_some(), "API request");
        let request = self
            .client
            .request(method, self.endpoint(path))
            .header("Content-Type", "application/json");
        match token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_detail(status, &body);
        debug!(status = status.as_u16(), message = %message, "API request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a JSON body, treating 204 as "no content".
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(request).await?;
        match Self::read_json(response).await? {
            Some(value) => Ok(value),
            // A 204 where a body was expected decodes like an empty JSON body.
            None => Ok(serde_json::from_slice(b"null")?),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        self.request(self.build(Method::GET, path, token)).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.request(self.build(method, path, token).json(body)).await
    }

    pub async fn verify(&self, token: &str) -> Result<TokenVerifyResponse, ApiError> {
        self.get("auth/verify", Some(token)).await
    }

    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        self.get("auth/me", Some(token)).await
    }

    pub async fn list_articles(
        &self,
        query: &ArticleQuery,
        token: Option<&str>,
    ) -> Result<ArticleListResponse, ApiError> {
        let request = self
            .build(Method::GET, "articles", token)
            .query(&query.to_pairs());
        let raw: RawArticleList = self.request(request).await?;
        Ok(raw.normalize()?)
    }

    pub async fn get_article(&self, slug: &str, token: Option<&str>) -> Result<Article, ApiError> {
        let raw: RawArticle = self.get(&format!("articles/{slug}"), token).await?;
        Ok(raw.normalize()?)
    }

    pub async fn create_article(
        &self,
        data: &ArticleCreate,
        token: &str,
    ) -> Result<Article, ApiError> {
        let raw: RawArticle = self
            .send_json(Method::POST, "articles", data, Some(token))
            .await?;
        Ok(raw.normalize()?)
    }

    pub async fn update_article(
        &self,
        id: &str,
        data: &ArticleUpdate,
        token: &str,
    ) -> Result<Article, ApiError> {
        let raw: RawArticle = self
            .send_json(Method::PUT, &format!("articles/{id}"), data, Some(token))
            .await?;
        Ok(raw.normalize()?)
    }

    pub async fn delete_article(&self, id: &str, token: &str) -> Result<(), ApiError> {
        let request = self.build(Method::DELETE, &format!("articles/{id}"), Some(token));
        let response = Self::send(request).await?;
        // Anything after a 204 is ignored.
        let _ = response.bytes().await;
        Ok(())
    }

    pub async fn search(&self, query: &str, limit: u32) -> Result<SearchResponse, ApiError> {
        self.send_json(
            Method::POST,
            "search",
            &SearchRequest { query, limit },
            None,
        )
        .await
    }

    pub async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<ChatResponse, ApiError> {
        self.send_json(
            Method::POST,
            "chat",
            &ChatRequest { message, history },
            None,
        )
        .await
    }

    /// Open the streaming chat endpoint.
    ///
    /// Fails before yielding anything when the status is not a success.
    pub async fn chat_stream(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<FragmentStream, ApiError> {
        let request = self
            .build(Method::POST, "chat/stream", None)
            .json(&ChatRequest { message, history });
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        Ok(fragment_stream(response.bytes_stream()))
    }

    pub async fn index_stats(&self) -> Result<IndexStats, ApiError> {
        self.get("admin/stats", None).await
    }

    pub async fn reindex(
        &self,
        directory: Option<&str>,
        base_url: &str,
    ) -> Result<IndexReport, ApiError> {
        self.send_json(
            Method::POST,
            "admin/reindex",
            &IndexRequest {
                directory,
                base_url,
            },
            None,
        )
        .await
    }
}
