use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Bill, BillRecord, FileRef, UploadRequest};
use crate::store::Store;

const BILL_COLUMNS: &str = r#"
    id::text AS id,
    email,
    type,
    COALESCE(name, '') AS name,
    COALESCE(amount, 0.0) AS amount,
    COALESCE(date, '') AS date,
    vat,
    pct,
    commentary,
    status,
    file_url,
    file_name
"#;

/// Bills in PostgreSQL, receipts on the local filesystem.
pub struct PgStore {
    pool: PgPool,
    upload_dir: PathBuf,
}

impl PgStore {
    /// Connect to the database, apply migrations and prepare the upload directory
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(config.database_url())
            .await?;

        sqlx::migrate!().run(&pool).await?;

        tokio::fs::create_dir_all(&config.upload_dir).await?;
        info!("Connected to database, receipts stored in {}", config.upload_dir.display());

        Ok(Self {
            pool,
            upload_dir: config.upload_dir.clone(),
        })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    fn receipt_path(&self, key: &str, file_name: &str) -> PathBuf {
        // Only keep the final component so a crafted name cannot escape the directory
        let file_name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receipt".to_string());

        self.upload_dir.join(format!("{}-{}", key, file_name))
    }
}

async fn finish_upload(mut tx: Transaction<'_, Postgres>, id: i32, file_url: &str) -> Result<(), StoreError> {
    sqlx::query("UPDATE bills SET file_url = $1 WHERE id = $2")
        .bind(file_url)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Remove the receipt at `path` when its row was rolled back.
async fn discard_on_error<T>(path: &Path, result: Result<T, StoreError>) -> Result<T, StoreError> {
    if let Err(err) = &result {
        warn!("Upload not recorded ({}), removing {}", err, path.display());
        if let Err(io) = tokio::fs::remove_file(path).await {
            warn!("Could not remove {}: {}", path.display(), io);
        }
    }
    result
}

#[async_trait]
impl Store for PgStore {
    async fn list_bills(&self, email: &str) -> Result<Vec<Bill>, StoreError> {
        let query = format!(
            "SELECT {} FROM bills WHERE email = $1 AND date IS NOT NULL ORDER BY id ASC",
            BILL_COLUMNS
        );
        let bills = sqlx::query_as::<_, Bill>(&query)
            .bind(email)
            .fetch_all(self.get_pool())
            .await?;

        debug!("Loaded {} bills for {}", bills.len(), email);
        Ok(bills)
    }

    async fn create_upload(&self, upload: UploadRequest) -> Result<FileRef, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Reserve the bill first so the receipt can be named after its key
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO bills (email, status, file_name)
            VALUES ($1, 'pending', $2)
            RETURNING id
            "#,
        )
        .bind(&upload.email)
        .bind(&upload.file_name)
        .fetch_one(&mut *tx)
        .await?;

        let key = id.to_string();
        let path = self.receipt_path(&key, &upload.file_name);
        let file_url = format!("file://{}", path.display());

        let recorded = match tokio::fs::write(&path, &upload.bytes).await {
            Ok(()) => finish_upload(tx, id, &file_url).await,
            Err(err) => Err(err.into()),
        };
        discard_on_error(&path, recorded).await?;

        info!(
            "Stored receipt {} ({}, {} bytes) under key {}",
            upload.file_name,
            upload.content_type,
            upload.bytes.len(),
            key
        );
        Ok(FileRef { file_url, key })
    }

    async fn create_bill(&self, record: &BillRecord) -> Result<Bill, StoreError> {
        let query = format!(
            r#"
            INSERT INTO bills (email, type, name, amount, date, vat, pct, commentary, status, file_url, file_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            BILL_COLUMNS
        );
        let bill = sqlx::query_as::<_, Bill>(&query)
            .bind(&record.email)
            .bind(&record.expense_type)
            .bind(&record.name)
            .bind(record.amount)
            .bind(&record.date)
            .bind(&record.vat)
            .bind(record.pct)
            .bind(&record.commentary)
            .bind(record.status.as_str())
            .bind(&record.file_url)
            .bind(&record.file_name)
            .fetch_one(self.get_pool())
            .await?;

        Ok(bill)
    }

    async fn update_bill(&self, id: &str, record: &BillRecord) -> Result<Bill, StoreError> {
        let id: i32 = id.parse().map_err(|_| StoreError::not_found())?;
        let query = format!(
            r#"
            UPDATE bills
            SET email = $1, type = $2, name = $3, amount = $4, date = $5, vat = $6,
                pct = $7, commentary = $8, status = $9, file_url = $10, file_name = $11
            WHERE id = $12
            RETURNING {}
            "#,
            BILL_COLUMNS
        );
        let bill = sqlx::query_as::<_, Bill>(&query)
            .bind(&record.email)
            .bind(&record.expense_type)
            .bind(&record.name)
            .bind(record.amount)
            .bind(&record.date)
            .bind(&record.vat)
            .bind(record.pct)
            .bind(&record.commentary)
            .bind(record.status.as_str())
            .bind(&record.file_url)
            .bind(&record.file_name)
            .bind(id)
            .fetch_one(self.get_pool())
            .await?;

        Ok(bill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receipt_is_removed_when_the_row_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1234-hello.png");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let result: Result<(), StoreError> = discard_on_error(&path, Err(StoreError::internal())).await;

        assert_eq!(result.unwrap_err().to_string(), "Erreur 500");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn receipt_is_kept_once_the_row_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1234-hello.png");
        tokio::fs::write(&path, b"hello").await.unwrap();

        assert!(discard_on_error(&path, Ok(())).await.is_ok());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn missing_receipt_keeps_the_original_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.png");

        let result: Result<(), StoreError> = discard_on_error(&path, Err(StoreError::not_found())).await;

        assert_eq!(result.unwrap_err().to_string(), "Erreur 404");
    }
}
