//! Persistence seam for bills and receipts.
//!
//! Containers only talk to [`Store`]; [`PgStore`] is the PostgreSQL backend
//! used by the application.

mod postgres;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Bill, BillRecord, FileRef, UploadRequest};

pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// All bills belonging to `email`.
    async fn list_bills(&self, email: &str) -> Result<Vec<Bill>, StoreError>;

    /// Store a receipt and reserve the bill it belongs to.
    async fn create_upload(&self, upload: UploadRequest) -> Result<FileRef, StoreError>;

    async fn create_bill(&self, record: &BillRecord) -> Result<Bill, StoreError>;

    /// Fill in or replace the bill stored under `id`.
    async fn update_bill(&self, id: &str, record: &BillRecord) -> Result<Bill, StoreError>;
}
