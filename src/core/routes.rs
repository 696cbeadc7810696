//! Site navigation table and the admin guard.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Articles,
    ArticleDetail { slug: String },
    Courses,
    Projects,
    About,
    Admin,
    AdminArticles,
    AdminArticleNew,
    AdminArticleEdit { id: String },
    AdminCourses,
    NotFound { path: String },
}

impl Route {
    /// Match a site path. Query strings, fragments and a trailing slash
    /// are ignored; fixed segments match case-insensitively.
    pub fn resolve(path: &str) -> Route {
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = bare.split('/').filter(|s| !s.is_empty()).collect();
        let fixed: Vec<String> = segments.iter().map(|s| s.to_ascii_lowercase()).collect();
        let fixed: Vec<&str> = fixed.iter().map(String::as_str).collect();

        match fixed.as_slice() {
            [] => Route::Home,
            ["articles"] => Route::Articles,
            ["articles", _] => Route::ArticleDetail {
                slug: segments[1].to_string(),
            },
            ["courses"] => Route::Courses,
            ["projects"] => Route::Projects,
            ["about"] => Route::About,
            ["admin"] => Route::Admin,
            ["admin", "articles"] => Route::AdminArticles,
            ["admin", "articles", "new"] => Route::AdminArticleNew,
            ["admin", "articles", _, "edit"] => Route::AdminArticleEdit {
                id: segments[2].to_string(),
            },
            ["admin", "courses"] => Route::AdminCourses,
            _ => Route::NotFound {
                path: path.to_string(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Articles => "articles",
            Route::ArticleDetail { .. } => "article-detail",
            Route::Courses => "courses",
            Route::Projects => "projects",
            Route::About => "about",
            Route::Admin => "admin",
            Route::AdminArticles => "admin-articles",
            Route::AdminArticleNew => "admin-article-new",
            Route::AdminArticleEdit { .. } => "admin-article-edit",
            Route::AdminCourses => "admin-courses",
            Route::NotFound { .. } => "not-found",
        }
    }

    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Route::Admin
                | Route::AdminArticles
                | Route::AdminArticleNew
                | Route::AdminArticleEdit { .. }
                | Route::AdminCourses
        )
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Articles => "/articles".to_string(),
            Route::ArticleDetail { slug } => format!("/articles/{slug}"),
            Route::Courses => "/courses".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::About => "/about".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::AdminArticles => "/admin/articles".to_string(),
            Route::AdminArticleNew => "/admin/articles/new".to_string(),
            Route::AdminArticleEdit { id } => format!("/admin/articles/{id}/edit"),
            Route::AdminCourses => "/admin/courses".to_string(),
            Route::NotFound { path } => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Non-admins asking for an admin page are sent home.
pub fn guard(route: Route, is_admin: bool) -> Route {
    if route.requires_admin() && !is_admin {
        Route::Home
    } else {
        route
    }
}
