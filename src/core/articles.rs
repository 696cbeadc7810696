use async_trait::async_trait;
use tracing::warn;

use crate::api::{
    Article, ArticleCreate, ArticleListResponse, ArticleQuery, ArticleStatus, ArticleUpdate,
    ApiClient, ApiError,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[async_trait]
pub trait ArticleBackend: Send + Sync {
    async fn list_articles(
        &self,
        query: &ArticleQuery,
        token: Option<&str>,
    ) -> Result<ArticleListResponse, ApiError>;
    async fn get_article(&self, slug: &str, token: Option<&str>) -> Result<Article, ApiError>;
    async fn create_article(&self, data: &ArticleCreate, token: &str) -> Result<Article, ApiError>;
    async fn update_article(
        &self,
        id: &str,
        data: &ArticleUpdate,
        token: &str,
    ) -> Result<Article, ApiError>;
    async fn delete_article(&self, id: &str, token: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ArticleBackend for ApiClient {
    async fn list_articles(
        &self,
        query: &ArticleQuery,
        token: Option<&str>,
    ) -> Result<ArticleListResponse, ApiError> {
        ApiClient::list_articles(self, query, token).await
    }

    async fn get_article(&self, slug: &str, token: Option<&str>) -> Result<Article, ApiError> {
        ApiClient::get_article(self, slug, token).await
    }

    async fn create_article(&self, data: &ArticleCreate, token: &str) -> Result<Article, ApiError> {
        ApiClient::create_article(self, data, token).await
    }

    async fn update_article(
        &self,
        id: &str,
        data: &ArticleUpdate,
        token: &str,
    ) -> Result<Article, ApiError> {
        ApiClient::update_article(self, id, data, token).await
    }

    async fn delete_article(&self, id: &str, token: &str) -> Result<(), ApiError> {
        ApiClient::delete_article(self, id, token).await
    }
}

/// Filters for [`ArticleStore::fetch_articles`]. A missing page means
/// "the page we are already on".
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub page: Option<u32>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<ArticleStatus>,
}

/// Cached article listing plus the article currently being viewed.
///
/// Every operation clears `error` on entry and records the message of
/// whatever failed. Reads swallow the failure after recording it; writes
/// also hand it back to the caller.
#[derive(Debug)]
pub struct ArticleStore {
    pub articles: Vec<Article>,
    pub current_article: Option<Article>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ArticleStore {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            current_article: None,
            total: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            loading: false,
            error: None,
        }
    }
}

/// Mutations need a non-empty bearer token.
fn require_token(token: Option<&str>) -> Result<&str, ApiError> {
    token
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthenticated)
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fail(&mut self, err: &ApiError, context: &str) {
        warn!(error = %err, "{context}");
        self.error = Some(err.to_string());
    }

    pub async fn fetch_articles(
        &mut self,
        backend: &dyn ArticleBackend,
        filter: &ArticleFilter,
        token: Option<&str>,
    ) {
        self.begin();
        let query = ArticleQuery {
            page: Some(filter.page.unwrap_or(self.page)),
            page_size: Some(self.page_size),
            category: filter.category.clone(),
            tag: filter.tag.clone(),
            status: filter.status,
        };
        match backend.list_articles(&query, token).await {
            Ok(list) => {
                self.articles = list.items;
                self.total = list.total;
                self.page = list.page;
            }
            Err(err) => self.fail(&err, "Failed to fetch articles"),
        }
        self.loading = false;
    }

    pub async fn fetch_article(
        &mut self,
        backend: &dyn ArticleBackend,
        slug: &str,
        token: Option<&str>,
    ) {
        self.begin();
        match backend.get_article(slug, token).await {
            Ok(article) => self.current_article = Some(article),
            Err(err) => {
                self.fail(&err, "Failed to fetch article");
                self.current_article = None;
            }
        }
        self.loading = false;
    }

    pub async fn create_article(
        &mut self,
        backend: &dyn ArticleBackend,
        data: &ArticleCreate,
        token: Option<&str>,
    ) -> Result<Article, ApiError> {
        let token = require_token(token)?;
        self.begin();
        let result = backend.create_article(data, token).await;
        self.loading = false;
        match result {
            Ok(article) => {
                self.articles.insert(0, article.clone());
                Ok(article)
            }
            Err(err) => {
                self.fail(&err, "Failed to create article");
                Err(err)
            }
        }
    }

    pub async fn update_article(
        &mut self,
        backend: &dyn ArticleBackend,
        id: &str,
        data: &ArticleUpdate,
        token: Option<&str>,
    ) -> Result<Article, ApiError> {
        let token = require_token(token)?;
        self.begin();
        let result = backend.update_article(id, data, token).await;
        self.loading = false;
        match result {
            Ok(article) => {
                if let Some(slot) = self.articles.iter_mut().find(|a| a.id == id) {
                    *slot = article.clone();
                }
                if self.current_article.as_ref().is_some_and(|a| a.id == id) {
                    self.current_article = Some(article.clone());
                }
                Ok(article)
            }
            Err(err) => {
                self.fail(&err, "Failed to update article");
                Err(err)
            }
        }
    }

    pub async fn delete_article(
        &mut self,
        backend: &dyn ArticleBackend,
        id: &str,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let token = require_token(token)?;
        self.begin();
        let result = backend.delete_article(id, token).await;
        self.loading = false;
        match result {
            Ok(()) => {
                self.articles.retain(|a| a.id != id);
                if self.current_article.as_ref().is_some_and(|a| a.id == id) {
                    self.current_article = None;
                }
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "Failed to delete article");
                Err(err)
            }
        }
    }
}
