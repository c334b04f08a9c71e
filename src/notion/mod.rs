//! Notion Store
//!
//! The hosted database the highlights end up in. Only three operations are
//! used: querying a database by exact title, creating a page in a database,
//! and retrieving a database's title for display.
//!
//! Everything above this module talks to [`DocumentStore`], so tests can swap
//! in a fake store and the importer never touches HTTP directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use clippings::notion::{DocumentStore, NotionClient};
//!
//! let client = NotionClient::new(&config.notion)?;
//! let name = client.database_title(&config.notion.library_db_id).await?;
//! let hits = client
//!     .query_by_title(&config.notion.library_db_id, "Name", "Dune")
//!     .await?;
//! ```

pub mod api;
mod client;

use async_trait::async_trait;

pub use api::PageRef;
pub use client::{DEFAULT_BASE_URL, NOTION_VERSION, NotionClient};

use crate::document::HighlightDocument;
use crate::error::NotionError;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Pages in `database_id` whose title property equals `title` exactly.
    async fn query_by_title(
        &self,
        database_id: &str,
        title_property: &str,
        title: &str,
    ) -> Result<Vec<PageRef>, NotionError>;

    async fn create_page(
        &self,
        database_id: &str,
        document: &HighlightDocument,
    ) -> Result<PageRef, NotionError>;

    async fn database_title(&self, database_id: &str) -> Result<String, NotionError>;
}
