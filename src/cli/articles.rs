use std::error::Error;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Subcommand};

use crate::api::{Article, ArticleCreate, ArticleStatus, ArticleUpdate, DEFAULT_CATEGORY};
use crate::cli::Context;
use crate::core::articles::{ArticleFilter, ArticleStore};
use crate::core::locale::LocaleStore;

#[derive(Subcommand)]
pub enum ArticleCommands {
    /// List articles
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// draft or published (drafts need an admin session)
        #[arg(long)]
        status: Option<ArticleStatus>,
    },
    /// Show one article by slug
    Show { slug: String },
    /// Create an article
    Create(CreateArgs),
    /// Change fields of an existing article
    Update {
        id: String,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete an article
    Delete { id: String },
}

#[derive(ClapArgs)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub slug: String,
    #[arg(long, default_value = "")]
    pub excerpt: String,
    /// Markdown body; use --content-file to read it from disk
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,
    /// May be repeated
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long, default_value = "draft")]
    pub status: ArticleStatus,
    #[arg(long)]
    pub gradient: Option<String>,
}

#[derive(ClapArgs, Default)]
pub struct UpdateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
    #[arg(long)]
    pub excerpt: Option<String>,
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,
    #[arg(long)]
    pub category: Option<String>,
    /// Replaces all tags; may be repeated
    #[arg(long = "tag")]
    pub tags: Option<Vec<String>>,
    #[arg(long)]
    pub status: Option<ArticleStatus>,
    #[arg(long)]
    pub gradient: Option<String>,
}

fn read_content(
    inline: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, Box<dyn Error>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| format!("failed to read {}: {err}", path.display()).into()),
        (None, None) => Ok(None),
    }
}

impl CreateArgs {
    pub fn into_payload(self) -> Result<ArticleCreate, Box<dyn Error>> {
        let content = read_content(self.content, self.content_file)?.unwrap_or_default();
        Ok(ArticleCreate {
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            content,
            category: self.category,
            tags: self.tags,
            status: self.status,
            gradient: self.gradient,
        })
    }
}

impl UpdateArgs {
    pub fn into_payload(self) -> Result<ArticleUpdate, Box<dyn Error>> {
        Ok(ArticleUpdate {
            content: read_content(self.content, self.content_file)?,
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            category: self.category,
            tags: self.tags,
            status: self.status,
            gradient: self.gradient,
        })
    }
}

/// One listing line: title, slug, category, read time and publish date.
pub fn summary_line(article: &Article, locale: &LocaleStore) -> String {
    let category_key = format!("articles.categories.{}", article.category);
    let category = match locale.t(&category_key) {
        missing if missing == category_key => article.category.as_str(),
        label => label,
    };
    let read_time = locale.t_with("articles.readTime", &[("time", &article.read_time.to_string())]);
    let date = article
        .published_at
        .unwrap_or(article.created_at)
        .format("%Y-%m-%d");
    let draft = if article.status == ArticleStatus::Draft {
        " [draft]"
    } else {
        ""
    };
    format!(
        "{} ({}){draft} · {category} · {read_time} · {date}",
        article.title, article.slug
    )
}

pub async fn run(ctx: &Context, command: ArticleCommands) -> Result<(), Box<dyn Error>> {
    let locale = ctx.locale();
    let session = ctx.session().await?;
    let mut store = ArticleStore::new();

    match command {
        ArticleCommands::List {
            page,
            category,
            tag,
            status,
        } => {
            let filter = ArticleFilter {
                page,
                category,
                tag,
                status,
            };
            store.fetch_articles(&ctx.client, &filter, session.token()).await;
            if let Some(error) = store.error.take() {
                return Err(error.into());
            }
            println!("{}", locale.t("articles.title"));
            for article in &store.articles {
                println!("  {}", summary_line(article, &locale));
            }
            let pages = store.total.div_ceil(u64::from(store.page_size.max(1)));
            println!("  page {} of {} ({} total)", store.page, pages.max(1), store.total);
        }
        ArticleCommands::Show { slug } => {
            store.fetch_article(&ctx.client, &slug, session.token()).await;
            if let Some(error) = store.error.take() {
                return Err(error.into());
            }
            if let Some(article) = &store.current_article {
                println!("{}", article.title);
                println!("{}", summary_line(article, &locale));
                println!("by {}", article.author.name);
                if !article.tags.is_empty() {
                    println!("tags: {}", article.tags.join(", "));
                }
                println!();
                println!("{}", article.content);
            }
        }
        ArticleCommands::Create(args) => {
            let payload = args.into_payload()?;
            let article = store
                .create_article(&ctx.client, &payload, session.token())
                .await?;
            println!("✅ Created {} ({})", article.slug, article.id);
        }
        ArticleCommands::Update { id, fields } => {
            let payload = fields.into_payload()?;
            if payload.is_empty() {
                return Err("Nothing to update; pass at least one field".into());
            }
            let article = store
                .update_article(&ctx.client, &id, &payload, session.token())
                .await?;
            println!("✅ Updated {} ({})", article.slug, article.id);
        }
        ArticleCommands::Delete { id } => {
            store.delete_article(&ctx.client, &id, session.token()).await?;
            println!("✅ Deleted {id}");
        }
    }
    Ok(())
}
