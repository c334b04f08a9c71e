//! The interactive import flow: ask for the export and the book, confirm the
//! target, then normalize and publish.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};

use crate::clippings::load_highlights;
use crate::config::Config;
use crate::model::Target;
use crate::notion::DocumentStore;
use crate::prompt::Prompter;
use crate::publisher::{PublishStats, Publisher, log_lookup_error};
use crate::resolver::{Resolution, SourceResolver};
use crate::unpack_error;

#[derive(Debug, Default, Clone)]
pub struct ImportOptions {
    pub csv: Option<String>,
    pub book: Option<String>,
    pub target: Option<Target>,
    pub assume_yes: bool,
    pub cache_lookups: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    Cancelled,
    Completed {
        stats: PublishStats,
        database_name: String,
    },
}

#[derive(Debug)]
struct DatabaseNames {
    highlights: String,
    library: String,
    test: String,
}

impl DatabaseNames {
    fn for_target(&self, target: Target) -> &str {
        match target {
            Target::Test => &self.test,
            Target::Production => &self.highlights,
        }
    }
}

/// Database titles are only shown to the user. A rejected token is fatal here
/// because it is the first call of the run; anything else falls back to the id.
async fn database_name(store: &dyn DocumentStore, database_id: &str) -> Result<String> {
    match store.database_title(database_id).await {
        Ok(title) if !title.is_empty() => Ok(title),
        Ok(_) => Ok(database_id.to_string()),
        Err(e) if e.is_unauthorized() => {
            Err(e).context("notion rejected the access token, check NOTION_AUTH")
        }
        Err(e) => {
            tracing::warn!(database_id, error = %unpack_error(&e), "failed to retrieve database name");
            Ok(database_id.to_string())
        }
    }
}

async fn database_names(store: &dyn DocumentStore, config: &Config) -> Result<DatabaseNames> {
    Ok(DatabaseNames {
        highlights: database_name(store, &config.notion.highlights_db_id).await?,
        library: database_name(store, &config.notion.library_db_id).await?,
        test: database_name(store, &config.notion.test_db_id).await?,
    })
}

fn answer_or_ask<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    given: Option<String>,
    question: &str,
) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => Ok(prompter.ask(question)?),
    }
}

/// Resolves the book, asking for the name once more if the first one is not in
/// the library. Returns the name that resolved.
async fn resolve_book<R: BufRead, W: Write>(
    resolver: &mut SourceResolver<'_>,
    prompter: &mut Prompter<R, W>,
    first_name: String,
) -> Result<String> {
    let mut name = first_name;
    for attempt in 0..2 {
        match resolver.resolve(&name).await {
            Resolution::Found(id) => {
                tracing::info!(book = %name, id = %id, "resolved book");
                return Ok(name);
            }
            Resolution::NotFound => {
                prompter.say(&format!("Book '{}' not found in the library database.", name))?;
            }
            Resolution::LookupError(e) => {
                log_lookup_error(&name, &e);
                prompter.say(&format!(
                    "Could not look up book '{}' in the library database: {}",
                    name,
                    unpack_error(&e)
                ))?;
            }
        }

        if attempt == 0 {
            name = prompter.ask("Enter the book name: ")?;
        }
    }
    bail!("book '{}' not found in the library database", name)
}

pub async fn run<R: BufRead, W: Write>(
    config: &Config,
    store: &dyn DocumentStore,
    prompter: &mut Prompter<R, W>,
    options: ImportOptions,
) -> Result<ImportOutcome> {
    let csv_name = answer_or_ask(prompter, options.csv, "Enter the CSV filename: ")?;
    let book = answer_or_ask(prompter, options.book, "Enter the book name: ")?;

    let names = database_names(store, config).await?;
    prompter.say("\nSelected databases:")?;
    prompter.say(&format!("1. Highlights Database: {}", names.highlights))?;
    prompter.say(&format!("2. Library Database: {}", names.library))?;
    prompter.say(&format!("3. Test Database: {}\n", names.test))?;

    let target = match options.target {
        Some(target) => target,
        None => Target::from_test_flag(prompter.confirm(&format!(
            "Do you want to add highlights to the test database '{}'?",
            names.test
        ))?),
    };
    tracing::info!(%target, "selected target database");

    let mut resolver = SourceResolver::new(
        store,
        config.notion.library_db_id.as_str(),
        config.notion.title_property.as_str(),
    )
    .with_cache(options.cache_lookups);
    let book = resolve_book(&mut resolver, prompter, book).await?;

    let proceed = options.assume_yes
        || prompter.confirm(&format!(
            "Are you sure you want to proceed with adding highlights to the '{}'?",
            book
        ))?;
    if !proceed {
        prompter.say("Operation canceled.")?;
        return Ok(ImportOutcome::Cancelled);
    }

    let path = config.csv_path(&csv_name);
    let records = load_highlights(&path)
        .with_context(|| format!("failed to import highlights from {}", path.display()))?;
    tracing::info!(path = %path.display(), count = records.len(), "loaded highlights");

    let mut publisher = Publisher::for_target(store, resolver, &config.notion, target);
    let stats = publisher.publish_all(records, Some(book.as_str())).await;

    let database_name = names.for_target(target).to_string();
    prompter.say(&format!(
        "\n{} highlights were successfully added to '{}'.",
        stats.created, database_name
    ))?;

    Ok(ImportOutcome::Completed {
        stats,
        database_name,
    })
}
