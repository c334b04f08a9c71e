use crate::document::HighlightDocument;
use crate::error::NotionError;
use crate::model::{HighlightRecord, Target};
use crate::notion::DocumentStore;
use crate::resolver::{Resolution, SourceResolver};
use crate::unpack_error;

pub enum PublishResult {
    Created { linked: bool },
    Error,
}

impl PublishResult {
    pub fn record(self, stats: &mut PublishStats) {
        match self {
            PublishResult::Created { linked } => {
                stats.created += 1;
                if !linked {
                    stats.unlinked += 1;
                }
            }
            PublishResult::Error => stats.failed += 1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    pub created: u32,
    pub failed: u32,
    /// Created without a Source link because the source did not resolve.
    pub unlinked: u32,
}

impl PublishStats {
    pub fn attempted(&self) -> u32 {
        self.created + self.failed
    }
}

pub fn log_lookup_miss(source: &str) {
    tracing::warn!(source, "no source found with this name, creating highlight without a link");
}

pub fn log_lookup_error(source: &str, e: &NotionError) {
    tracing::error!(
        source,
        error = %unpack_error(e),
        "source lookup failed, creating highlight without a link"
    );
}

pub fn log_create_error(page: u64, e: &NotionError) {
    tracing::error!(page, error = %unpack_error(e), "failed to create highlight");
}

/// Writes highlight pages into one highlights database, one record at a time.
pub struct Publisher<'a> {
    store: &'a dyn DocumentStore,
    resolver: SourceResolver<'a>,
    database_id: String,
    favorite: bool,
}

impl<'a> Publisher<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        resolver: SourceResolver<'a>,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            resolver,
            database_id: database_id.into(),
            favorite: false,
        }
    }

    pub fn for_target(
        store: &'a dyn DocumentStore,
        resolver: SourceResolver<'a>,
        config: &crate::config::NotionConfig,
        target: Target,
    ) -> Self {
        Self::new(store, resolver, config.database_for(target))
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    async fn source_id(&mut self, source_name: Option<&str>) -> Option<String> {
        let name = source_name.filter(|n| !n.is_empty())?;
        match self.resolver.resolve(name).await {
            Resolution::Found(id) => Some(id),
            Resolution::NotFound => {
                log_lookup_miss(name);
                None
            }
            Resolution::LookupError(e) => {
                log_lookup_error(name, &e);
                None
            }
        }
    }

    pub async fn publish_one(
        &mut self,
        record: &HighlightRecord,
        source_name: Option<&str>,
    ) -> PublishResult {
        let source_id = self.source_id(source_name).await;
        let document = HighlightDocument::builder(record)
            .favorite(self.favorite)
            .source(source_id.as_deref())
            .build();

        match self.store.create_page(&self.database_id, &document).await {
            Ok(page) => {
                tracing::info!(
                    page = record.page_number,
                    id = %page.id,
                    linked = source_id.is_some(),
                    "created highlight"
                );
                PublishResult::Created {
                    linked: source_id.is_some(),
                }
            }
            Err(e) => {
                log_create_error(record.page_number, &e);
                PublishResult::Error
            }
        }
    }

    /// Creates one highlight page. Never fails the caller: errors are logged
    /// and reported as `false`.
    pub async fn publish(&mut self, record: &HighlightRecord, source_name: Option<&str>) -> bool {
        matches!(
            self.publish_one(record, source_name).await,
            PublishResult::Created { .. }
        )
    }

    /// Publishes every record in order. A failed record does not stop the rest.
    pub async fn publish_all<I>(&mut self, records: I, source_name: Option<&str>) -> PublishStats
    where
        I: IntoIterator<Item = HighlightRecord>,
    {
        let mut stats = PublishStats::default();
        for record in records {
            self.publish_one(&record, source_name)
                .await
                .record(&mut stats);
        }
        tracing::info!(
            created = stats.created,
            failed = stats.failed,
            unlinked = stats.unlinked,
            database_id = %self.database_id,
            "publish finished"
        );
        stats
    }
}
