//! Boundary adapter for article payloads.
//!
//! The backend and the older static fixtures disagree on field names:
//! `read_time` vs `readTime`, `created_at` vs `date`, an embedded author
//! object vs a bare name, and tags as a list vs a JSON-encoded string.
//! [`RawArticle`] accepts all of them and [`RawArticle::normalize`] turns
//! the result into the one canonical [`Article`].

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::{
    Article, ArticleAuthor, ArticleListResponse, ArticleStatus, User, DEFAULT_CATEGORY,
    DEFAULT_GRADIENT,
};

#[derive(Debug)]
pub struct ArticleShapeError {
    pub slug: String,
    pub reason: String,
}

impl fmt::Display for ArticleShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid article '{}': {}", self.slug, self.reason)
    }
}

impl std::error::Error for ArticleShapeError {}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTags {
    List(Vec<String>),
    Encoded(String),
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::List(Vec::new())
    }
}

impl RawTags {
    fn into_list(self) -> Vec<String> {
        match self {
            RawTags::List(tags) => tags,
            RawTags::Encoded(text) if text.trim().is_empty() => Vec::new(),
            RawTags::Encoded(text) => serde_json::from_str(&text).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAuthor {
    User(User),
    Name(String),
}

#[derive(Debug, Deserialize)]
pub struct RawArticle {
    id: String,
    slug: String,
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: RawTags,
    #[serde(default)]
    status: Option<ArticleStatus>,
    #[serde(default, alias = "readTime")]
    read_time: Option<u32>,
    #[serde(default)]
    gradient: Option<String>,
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawArticleList {
    items: Vec<RawArticle>,
    total: u64,
    page: u32,
    page_size: u32,
}

/// Parse the timestamp shapes the backend emits: RFC 3339, a naive
/// ISO datetime (assumed UTC), or a bare `YYYY-MM-DD` date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl RawArticle {
    pub fn normalize(self) -> Result<Article, ArticleShapeError> {
        let slug = self.slug;
        let shape_error = |reason: String| ArticleShapeError {
            slug: slug.clone(),
            reason,
        };

        let created_raw = self
            .created_at
            .or(self.date)
            .ok_or_else(|| shape_error("missing created_at".to_string()))?;
        let created_at = parse_timestamp(&created_raw)
            .ok_or_else(|| shape_error(format!("unparseable timestamp '{created_raw}'")))?;

        let updated_at = match self.updated_at {
            Some(raw) => parse_timestamp(&raw)
                .ok_or_else(|| shape_error(format!("unparseable timestamp '{raw}'")))?,
            None => created_at,
        };

        let published_at = match self.published_at {
            Some(raw) => Some(
                parse_timestamp(&raw)
                    .ok_or_else(|| shape_error(format!("unparseable timestamp '{raw}'")))?,
            ),
            None => None,
        };

        let author = match self.author {
            Some(RawAuthor::User(user)) => ArticleAuthor {
                id: Some(user.id),
                name: user.name,
                avatar: user.avatar,
            },
            Some(RawAuthor::Name(name)) => ArticleAuthor {
                id: None,
                name,
                avatar: None,
            },
            None => ArticleAuthor {
                id: None,
                name: self.author_name.unwrap_or_default(),
                avatar: None,
            },
        };

        Ok(Article {
            id: self.id,
            slug: slug.clone(),
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: self.tags.into_list(),
            status: self.status.unwrap_or_default(),
            read_time: self.read_time.unwrap_or(0),
            gradient: self
                .gradient
                .unwrap_or_else(|| DEFAULT_GRADIENT.to_string()),
            author,
            created_at,
            updated_at,
            published_at,
        })
    }
}

impl RawArticleList {
    pub fn normalize(self) -> Result<ArticleListResponse, ArticleShapeError> {
        let items = self
            .items
            .into_iter()
            .map(RawArticle::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ArticleListResponse {
            items,
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn normalize(json: &str) -> Result<Article, ArticleShapeError> {
        serde_json::from_str::<RawArticle>(json)
            .expect("payload should deserialize")
            .normalize()
    }

    #[test]
    fn backend_shape_normalizes() {
        let article = normalize(
            r#"{
                "id": "a1", "slug": "rag-implementation", "title": "RAG in Practice",
                "excerpt": "ex", "content": "body", "category": "agents",
                "tags": ["RAG", "LangChain"], "status": "draft", "read_time": 12,
                "gradient": "g",
                "author": {"id": "u1", "email": "r@x.io", "name": "Robert",
                           "avatar": null, "role": "admin", "provider": "github"},
                "created_at": "2024-11-25T08:30:00",
                "updated_at": "2024-11-26T09:00:00.123456",
                "published_at": null
            }"#,
        )
        .unwrap();

        assert_eq!(article.read_time, 12);
        assert_eq!(article.status, ArticleStatus::Draft);
        assert_eq!(article.author.name, "Robert");
        assert_eq!(article.author.id.as_deref(), Some("u1"));
        assert_eq!(article.tags, vec!["RAG", "LangChain"]);
        assert_eq!(
            article.created_at,
            Utc.with_ymd_and_hms(2024, 11, 25, 8, 30, 0).unwrap()
        );
        assert!(article.updated_at > article.created_at);
        assert_eq!(article.published_at, None);
    }

    #[test]
    fn legacy_shape_normalizes() {
        let article = normalize(
            r#"{
                "id": "1", "slug": "building-ai-agents", "title": "Building Your First AI Agent",
                "excerpt": "Learn", "content": "", "category": "agents",
                "tags": "[\"Agent\", \"Claude\"]", "author": "Robert",
                "date": "2024-12-01", "readTime": 10
            }"#,
        )
        .unwrap();

        assert_eq!(article.read_time, 10);
        assert_eq!(article.author.name, "Robert");
        assert_eq!(article.author.id, None);
        assert_eq!(article.tags, vec!["Agent", "Claude"]);
        assert_eq!(article.status, ArticleStatus::Published);
        assert_eq!(article.gradient, DEFAULT_GRADIENT);
        assert_eq!(article.created_at, article.updated_at);
        assert_eq!(
            article.created_at,
            Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn malformed_encoded_tags_become_empty() {
        let article = normalize(
            r#"{"id":"1","slug":"s","title":"t","tags":"not json","created_at":"2024-01-01"}"#,
        )
        .unwrap();
        assert!(article.tags.is_empty());
        assert_eq!(article.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let err = normalize(r#"{"id":"1","slug":"orphan","title":"t"}"#).unwrap_err();
        assert_eq!(err.slug, "orphan");
        assert!(err.to_string().contains("missing created_at"));
    }

    #[test]
    fn parse_timestamp_accepts_offsets() {
        assert_eq!(
            parse_timestamp("2024-11-25T08:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 11, 25, 6, 30, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
