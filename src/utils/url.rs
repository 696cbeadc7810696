//! URL utilities for consistent URL handling
//!
//! This module provides utilities for normalizing the backend base URL and
//! for editing the query string of a page address.

use reqwest::Url;

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use fisherman::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/api"), "http://localhost:8000/api");
/// assert_eq!(normalize_base_url("http://localhost:8000/api/"), "http://localhost:8000/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use fisherman::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/api/", "/articles"),
///     "http://localhost:8000/api/articles"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Look up the first value of a query parameter, percent-decoded.
pub fn query_param(address: &Url, name: &str) -> Option<String> {
    address
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Return a copy of `address` with every query parameter named in `names`
/// removed. The query string is dropped entirely when nothing is left.
pub fn strip_query_params(address: &Url, names: &[&str]) -> Url {
    let kept: Vec<(String, String)> = address
        .query_pairs()
        .filter(|(key, _)| !names.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut cleaned = address.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:8000/api"),
            "http://localhost:8000/api"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8000/api///"),
            "http://localhost:8000/api"
        );
        assert_eq!(normalize_base_url("/api/"), "/api");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("http://localhost:8000/api", "articles"),
            "http://localhost:8000/api/articles"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000/api/", "/auth/verify"),
            "http://localhost:8000/api/auth/verify"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000/api", "///chat/stream"),
            "http://localhost:8000/api/chat/stream"
        );
    }

    #[test]
    fn query_param_decodes_values() {
        let url = Url::parse("http://localhost:5173/?user=%7B%22a%22%3A1%7D&token=abc").unwrap();
        assert_eq!(query_param(&url, "user").as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(query_param(&url, "token").as_deref(), Some("abc"));
        assert_eq!(query_param(&url, "missing"), None);
    }

    #[test]
    fn strip_query_params_keeps_unrelated_parameters() {
        let url = Url::parse("http://localhost:5173/articles?token=abc&page=2&user=x").unwrap();
        let cleaned = strip_query_params(&url, &["token", "user"]);
        assert_eq!(cleaned.as_str(), "http://localhost:5173/articles?page=2");
    }

    #[test]
    fn strip_query_params_drops_empty_query() {
        let url = Url::parse("http://localhost:5173/?token=abc&user=x").unwrap();
        let cleaned = strip_query_params(&url, &["token", "user"]);
        assert_eq!(cleaned.as_str(), "http://localhost:5173/");
        assert_eq!(cleaned.query(), None);
    }
}
