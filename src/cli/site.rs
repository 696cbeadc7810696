use std::error::Error;

use crate::cli::{AdminCommands, Context, LocaleCommands, ThemeCommands};
use crate::core::appearance::OsAppearance;
use crate::core::catalog::{self, Course, DEFAULT_FEATURED_PROJECTS};
use crate::core::routes::{guard, Route};
use crate::core::theme::ThemeStore;

pub async fn search(ctx: &Context, query: &str, limit: u32) -> Result<(), Box<dyn Error>> {
    let response = ctx.client.search(query, limit).await?;
    if response.results.is_empty() {
        println!("No results for '{}'", response.query);
        return Ok(());
    }
    for (index, result) in response.results.iter().enumerate() {
        println!("{}. {} ({:.2})", index + 1, result.title, result.score);
        println!("   {}", result.url);
    }
    Ok(())
}

/// Discount as a whole percentage, when the course has an original price
/// above its current one.
pub fn discount_percent(course: &Course) -> Option<u32> {
    let original = course.original_price?;
    if original == 0 || original <= course.price {
        return None;
    }
    Some(((original - course.price) * 100 + original / 2) / original)
}

pub fn courses(ctx: &Context, id: Option<&str>) -> Result<(), Box<dyn Error>> {
    let locale = ctx.locale();
    let Some(id) = id else {
        println!("{}", locale.t("courses.title"));
        for course in catalog::courses() {
            let badge = course
                .badge
                .as_deref()
                .map(|badge| {
                    let key = format!("courses.{}", badge.to_ascii_lowercase());
                    format!(" [{}]", locale.t(&key))
                })
                .unwrap_or_default();
            println!("  {} ({}){badge} · ¥{}", course.title, course.id, course.price);
            println!("    {}", course.subtitle);
        }
        return Ok(());
    };

    let course = catalog::course(id).ok_or_else(|| format!("Unknown course: {id}"))?;
    println!("{}", course.title);
    println!("{}", course.subtitle);
    println!();
    println!("{}", course.description);
    println!();
    print!("{}: ¥{}", locale.t("courses.price"), course.price);
    if let (Some(original), Some(percent)) = (course.original_price, discount_percent(course)) {
        let saving = locale.t_with("courses.discount", &[("percent", &percent.to_string())]);
        print!(" ({} ¥{original}, {saving})", locale.t("courses.originalPrice"));
    }
    println!();
    for feature in &course.features {
        println!("  • {feature}");
    }
    println!();
    println!("{} ({} lessons)", locale.t("courses.curriculum"), course.lesson_count());
    for module in &course.curriculum {
        println!("  {} · {}", module.title, module.duration);
        for lesson in &module.lessons {
            println!("    - {lesson}");
        }
    }
    println!();
    println!(
        "{}: {} · {}",
        locale.t("courses.instructor"),
        course.instructor.name,
        course.instructor.bio
    );
    Ok(())
}

pub fn projects(ctx: &Context, featured: bool) -> Result<(), Box<dyn Error>> {
    let locale = ctx.locale();
    let projects = if featured {
        catalog::featured_projects(DEFAULT_FEATURED_PROJECTS)
    } else {
        catalog::projects()
    };
    println!("{}", locale.t("projects.title"));
    for project in projects {
        println!("  {} · ★ {}", project.name, project.stars);
        println!("    {}", project.description);
        println!("    {}: {}", locale.t("projects.viewGithub"), project.github);
        if let Some(demo) = &project.demo {
            println!("    {}: {demo}", locale.t("projects.liveDemo"));
        }
        if !project.tags.is_empty() {
            println!("    {}", project.tags.join(", "));
        }
    }
    Ok(())
}

pub fn theme(ctx: &Context, command: ThemeCommands) -> Result<(), Box<dyn Error>> {
    let locale = ctx.locale();
    let mut theme = ThemeStore::load(ctx.store.clone(), Box::new(OsAppearance));
    match command {
        ThemeCommands::Toggle => {
            theme.toggle()?;
        }
        ThemeCommands::Set { theme: preference } => {
            theme.set(preference)?;
        }
        ThemeCommands::Show => {
            theme.refresh_system();
        }
    }
    let resolved = theme.resolved();
    println!(
        "{} → {} ({})",
        locale.t(&format!("theme.{}", theme.preference())),
        locale.t(&format!("theme.{resolved}")),
        resolved.theme_color()
    );
    Ok(())
}

pub fn locale(ctx: &Context, command: LocaleCommands) -> Result<(), Box<dyn Error>> {
    let mut locale = ctx.locale();
    if let LocaleCommands::Set { locale: choice } = command {
        locale.set(choice)?;
    }
    let current = locale.locale();
    println!("{} ({current})", locale.t(&format!("language.{current}")));
    Ok(())
}

pub async fn route(ctx: &Context, path: &str) -> Result<(), Box<dyn Error>> {
    let session = ctx.session().await?;
    let requested = Route::resolve(path);
    let granted = guard(requested.clone(), session.is_admin());
    if granted == requested {
        println!("{} → {}", requested.name(), granted.path());
    } else {
        println!(
            "{} → {} (admin only; redirected to {})",
            requested.name(),
            requested.path(),
            granted.path()
        );
    }
    Ok(())
}

pub async fn admin(ctx: &Context, command: AdminCommands) -> Result<(), Box<dyn Error>> {
    let session = ctx.session().await?;
    if !session.is_admin() {
        return Err("This command needs an admin session; run `fisherman login` first".into());
    }
    match command {
        AdminCommands::Stats => {
            let stats = ctx.client.index_stats().await?;
            println!("Indexed documents: {}", stats.total_documents);
        }
        AdminCommands::Reindex {
            directory,
            base_url,
        } => {
            let report = ctx.client.reindex(directory.as_deref(), &base_url).await?;
            println!(
                "✅ {} ({} files, {} chunks)",
                report.message, report.files, report.chunks
            );
        }
    }
    Ok(())
}
