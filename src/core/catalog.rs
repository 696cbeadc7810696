//! Built-in course and project catalog
//!
//! Courses and projects are not served by the backend; they ship with the
//! binary in `builtins/catalog.toml`.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FEATURED_PROJECTS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub name: String,
    pub avatar: String,
    pub bio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumModule {
    pub title: String,
    pub duration: String,
    pub lessons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub price: u32,
    pub original_price: Option<u32>,
    pub badge: Option<String>,
    pub gradient: String,
    pub features: Vec<String>,
    pub curriculum: Vec<CurriculumModule>,
    pub instructor: Instructor,
}

impl Course {
    pub fn lesson_count(&self) -> usize {
        self.curriculum.iter().map(|module| module.lessons.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub github: String,
    pub demo: Option<String>,
    pub stars: u32,
    pub tags: Vec<String>,
    pub gradient: String,
}

#[derive(Debug, Deserialize)]
struct Catalog {
    courses: Vec<Course>,
    projects: Vec<Project>,
}

fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        const CONFIG_CONTENT: &str = include_str!("../builtins/catalog.toml");
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/catalog.toml")
    })
}

pub fn courses() -> &'static [Course] {
    &catalog().courses
}

/// Find a course by ID (case-insensitive)
pub fn course(id: &str) -> Option<&'static Course> {
    courses().iter().find(|c| c.id.eq_ignore_ascii_case(id))
}

pub fn featured_courses(count: usize) -> &'static [Course] {
    let courses = courses();
    &courses[..count.min(courses.len())]
}

pub fn projects() -> &'static [Project] {
    &catalog().projects
}

pub fn project(id: &str) -> Option<&'static Project> {
    projects().iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

/// The first `count` projects, in catalog order.
pub fn featured_projects(count: usize) -> &'static [Project] {
    let projects = projects();
    &projects[..count.min(projects.len())]
}
