//! Notion database client.
//!
//! Each plan item becomes one page in the configured database: the title goes
//! into the database's title property and the body into a rich-text property.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{NoteStore, NoteStoreError};
use crate::extract::PlanItem;

/// API version sent in the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2022-06-28";
/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
/// Notion rejects text objects longer than this, counted in UTF-16 code units.
pub const MAX_TEXT_UNITS: usize = 2000;

const STORE_NAME: &str = "notion";

/// Settings for writing plan items into one Notion database.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token (`secret_...` / `ntn_...`).
    pub token: String,
    pub database_id: String,
    /// Name of the database's title property.
    pub title_property: String,
    /// Name of the rich-text property receiving the body.
    pub body_property: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl NotionConfig {
    pub const DEFAULT_TITLE_PROPERTY: &str = "제목";
    pub const DEFAULT_BODY_PROPERTY: &str = "내용";

    /// Build a config when both the token and the database ID are present.
    ///
    /// Returns `None` if either is missing or blank, which disables the
    /// integration.
    pub fn from_parts(token: Option<String>, database_id: Option<String>) -> Option<Self> {
        let token = token.filter(|t| !t.trim().is_empty())?;
        let database_id = database_id.filter(|d| !d.trim().is_empty())?;
        Some(Self {
            token,
            database_id,
            title_property: Self::DEFAULT_TITLE_PROPERTY.to_string(),
            body_property: Self::DEFAULT_BODY_PROPERTY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_properties(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.title_property = title.into();
        self.body_property = body.into();
        self
    }
}

fn text_object(content: &str) -> Value {
    json!({ "text": { "content": content } })
}

/// Split `text` into Notion text objects of at most [`MAX_TEXT_UNITS`]
/// UTF-16 code units each, never splitting a character.
fn text_objects(text: &str) -> Vec<Value> {
    let mut objects = Vec::new();
    let mut start = 0;
    let mut units = 0;
    for (i, c) in text.char_indices() {
        let width = c.len_utf16();
        if units + width > MAX_TEXT_UNITS {
            objects.push(text_object(&text[start..i]));
            start = i;
            units = 0;
        }
        units += width;
    }
    objects.push(text_object(&text[start..]));
    objects
}

/// Body text for a failed response. A body that cannot be read is reported
/// in place of the body.
fn error_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    match read {
        Ok(body) => crate::generator::truncate_body(&body),
        Err(e) => {
            debug!("failed to read notion error body: {e}");
            format!("<unreadable body: {e}>")
        }
    }
}

/// Request body for `POST /v1/pages`.
pub(crate) fn page_body(config: &NotionConfig, item: &PlanItem) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        config.title_property.clone(),
        json!({ "title": text_objects(&item.title) }),
    );
    properties.insert(
        config.body_property.clone(),
        json!({ "rich_text": text_objects(&item.body) }),
    );
    json!({
        "parent": { "database_id": config.database_id },
        "properties": properties,
    })
}

/// Writes plan items as pages of a Notion database.
#[derive(Debug)]
pub struct NotionClient {
    config: NotionConfig,
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self, NoteStoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| NoteStoreError::Transport {
                store: STORE_NAME.to_string(),
                source,
            })?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/pages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NoteStore for NotionClient {
    fn name(&self) -> &str {
        STORE_NAME
    }

    async fn create_item(&self, item: &PlanItem) -> Result<(), NoteStoreError> {
        debug!(title = %item.title, "creating notion page");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&page_body(&self.config, item))
            .send()
            .await
            .map_err(|source| NoteStoreError::Transport {
                store: STORE_NAME.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(NoteStoreError::Status {
            store: STORE_NAME.to_string(),
            status: status.as_u16(),
            body: error_body(response.text().await),
        })
    }
}
