use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::DocumentStore;
use super::api::{CreatePageRequest, Database, ErrorBody, PageRef, Parent, QueryRequest, QueryResponse};
use crate::config::NotionConfig;
use crate::document::HighlightDocument;
use crate::error::NotionError;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct NotionClient {
    client: Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Result<Self, NotionError> {
        Self::with_base_url(&config.token, &config.base_url)
    }

    /// Builds a client against a custom base URL (wiremock in tests).
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, NotionError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| NotionError::InvalidCredential)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("clippings/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, NotionError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| NotionError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => (err.code, err.message),
        Err(_) => ("unknown".to_string(), body),
    };

    if status == StatusCode::UNAUTHORIZED {
        return Err(NotionError::Unauthorized(message));
    }

    Err(NotionError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

#[async_trait]
impl DocumentStore for NotionClient {
    async fn query_by_title(
        &self,
        database_id: &str,
        title_property: &str,
        title: &str,
    ) -> Result<Vec<PageRef>, NotionError> {
        let response = self
            .client
            .post(self.url(&format!("databases/{}/query", database_id)))
            .json(&QueryRequest::title_equals(title_property, title))
            .send()
            .await?;

        let page: QueryResponse = read_json(response).await?;
        tracing::debug!(
            database_id,
            title,
            results = page.results.len(),
            has_more = page.has_more,
            "queried database"
        );
        Ok(page.results)
    }

    async fn create_page(
        &self,
        database_id: &str,
        document: &HighlightDocument,
    ) -> Result<PageRef, NotionError> {
        let body = CreatePageRequest {
            parent: Parent { database_id },
            properties: &document.properties,
            children: &document.children,
        };

        let response = self.client.post(self.url("pages")).json(&body).send().await?;
        read_json(response).await
    }

    async fn database_title(&self, database_id: &str) -> Result<String, NotionError> {
        let response = self
            .client
            .get(self.url(&format!("databases/{}", database_id)))
            .send()
            .await?;

        let database: Database = read_json(response).await?;
        Ok(database.display_title())
    }
}
