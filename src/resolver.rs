use std::collections::HashMap;

use crate::error::NotionError;
use crate::notion::DocumentStore;

/// Outcome of looking a source up by name.
///
/// `LookupError` never blocks publishing; callers treat it like `NotFound`
/// but can still tell the two apart in logs.
#[derive(Debug)]
pub enum Resolution {
    Found(String),
    NotFound,
    LookupError(NotionError),
}

impl Resolution {
    pub fn id(&self) -> Option<&str> {
        match self {
            Resolution::Found(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Maps a source display name to its page id in the library database by exact
/// title match.
pub struct SourceResolver<'a> {
    store: &'a dyn DocumentStore,
    library_db_id: String,
    title_property: String,
    cache: Option<HashMap<String, Option<String>>>,
}

impl<'a> SourceResolver<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        library_db_id: impl Into<String>,
        title_property: impl Into<String>,
    ) -> Self {
        Self {
            store,
            library_db_id: library_db_id.into(),
            title_property: title_property.into(),
            cache: None,
        }
    }

    /// Remember found and not-found answers for the rest of the run. Lookup
    /// errors are never remembered.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(HashMap::new);
        self
    }

    pub async fn resolve(&mut self, name: &str) -> Resolution {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(name)) {
            tracing::debug!(source = name, "source lookup served from cache");
            return match cached {
                Some(id) => Resolution::Found(id.clone()),
                None => Resolution::NotFound,
            };
        }

        let resolution = match self
            .store
            .query_by_title(&self.library_db_id, &self.title_property, name)
            .await
        {
            Ok(pages) => match pages.into_iter().next() {
                Some(page) => Resolution::Found(page.id),
                None => Resolution::NotFound,
            },
            Err(e) => return Resolution::LookupError(e),
        };

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(name.to_string(), resolution.id().map(str::to_string));
        }
        resolution
    }
}
