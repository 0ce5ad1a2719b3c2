//! Data-access capability for the remote expenses collection

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::SourceError;
use crate::models::ExpenseDraft;

/// Resource path of the collection, relative to the API base
pub const COLLECTION_PATH: &str = "/expenses";

/// Shared source reference
pub type SourceRef = Arc<dyn ExpenseSource>;

/// Path of a single record, with the id percent-encoded
pub fn expense_path(id: &str) -> String {
    format!("{}/{}", COLLECTION_PATH, urlencoding::encode(id))
}

/// Remote CRUD collection of expenses
///
/// Every call reports failure as a `SourceError`; the session decides how
/// to degrade.
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// Normalized base URL, `None` when missing or unusable
    fn base_url(&self) -> Option<&str>;

    /// Full URL for a resource path, used in status lines
    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url().unwrap_or_default(), path)
    }

    /// Reachability check on the collection; only the status matters
    async fn probe(&self) -> Result<(), SourceError>;

    /// Fetch the collection as raw JSON
    async fn list(&self) -> Result<Value, SourceError>;

    /// Create a record; the response body is not interpreted
    async fn create(&self, draft: &ExpenseDraft) -> Result<Value, SourceError>;

    /// Replace the record with the given id
    async fn update(&self, id: &str, draft: &ExpenseDraft) -> Result<Value, SourceError>;

    /// Delete the record with the given id
    async fn delete(&self, id: &str) -> Result<(), SourceError>;
}
