//! Note-store write-back for extracted plan items.
//!
//! [`NoteStore`] is the seam; [`NotionClient`] writes one page per item into
//! a Notion database.

pub mod notion;

use async_trait::async_trait;
use thiserror::Error;

use crate::extract::PlanItem;

pub use notion::{NotionClient, NotionConfig};

/// Errors from a single create-record call.
#[derive(Debug, Error)]
pub enum NoteStoreError {
    #[error("request to {store} failed: {source}")]
    Transport {
        store: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{store} returned HTTP {status}: {body}")]
    Status {
        store: String,
        status: u16,
        body: String,
    },
}

/// Destination for extracted plan items.
///
/// One call creates one record. Implementors never retry.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Human-readable name for this store (e.g. "notion").
    fn name(&self) -> &str;

    /// Create one record holding `item`.
    async fn create_item(&self, item: &PlanItem) -> Result<(), NoteStoreError>;
}

// Compile-time assertion: NoteStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn NoteStore) {}
};
