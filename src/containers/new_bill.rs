use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{FormError, ValidationError};
use crate::format::parse_date;
use crate::models::{BillRecord, BillStatus, ExpenseType, FileRef, SelectedFile, Session, UploadRequest};
use crate::router::Route;
use crate::store::Store;

const DEFAULT_PCT: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStage {
    Empty,
    FileValidated,
    Uploaded,
    Submitted,
    Failed,
}

/// Values typed into the form, as entered.
#[derive(Debug, Clone, Default)]
pub struct NewBillFields {
    pub expense_type: ExpenseType,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

pub struct NewBillForm {
    store: Arc<dyn Store>,
    session: Session,
    file_ref: Option<FileRef>,
    file_name: Option<String>,
    stage: DraftStage,
    error: Option<FormError>,
}

impl NewBillForm {
    pub fn new(store: Arc<dyn Store>, session: Session) -> Self {
        Self {
            store,
            session,
            file_ref: None,
            file_name: None,
            stage: DraftStage::Empty,
            error: None,
        }
    }

    pub fn stage(&self) -> DraftStage {
        self.stage
    }

    pub fn file_ref(&self) -> Option<&FileRef> {
        self.file_ref.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    /// Validate the receipt and upload it. Only jpg, jpeg and png are accepted.
    pub async fn handle_file_selected(&mut self, file: SelectedFile) {
        let content_type = match file.extension().as_deref() {
            Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
            Some("png") => mime::IMAGE_PNG,
            _ => {
                warn!("Rejected receipt {}: unsupported format", file.name);
                self.file_ref = None;
                self.file_name = None;
                self.stage = DraftStage::Empty;
                self.error = Some(ValidationError::UnsupportedFileType.into());
                return;
            }
        };

        self.stage = DraftStage::FileValidated;
        let file_name = file.name.clone();
        let upload = UploadRequest {
            email: self.session.email.clone(),
            file_name: file.name,
            content_type,
            bytes: file.bytes,
        };

        match self.store.create_upload(upload).await {
            Ok(file_ref) => {
                info!("Uploaded receipt {} as {}", file_name, file_ref.key);
                self.file_ref = Some(file_ref);
                self.file_name = Some(file_name);
                self.stage = DraftStage::Uploaded;
                self.error = None;
            }
            Err(err) => {
                error!("Receipt upload failed: {}", err);
                // An earlier receipt must not be submitted in place of this one
                self.file_ref = None;
                self.file_name = None;
                self.error = Some(err.into());
            }
        }
    }

    /// Persist the drafted bill. Returns the route to navigate to on success.
    ///
    /// Nothing happens until a receipt has been uploaded.
    pub async fn handle_submit(&mut self, fields: &NewBillFields) -> Option<Route> {
        let Some(file_ref) = self.file_ref.clone() else {
            warn!("Submit ignored: no receipt uploaded yet");
            return None;
        };

        let record = match self.build_record(fields, &file_ref) {
            Ok(record) => record,
            Err(err) => {
                self.error = Some(err.into());
                return None;
            }
        };

        match self.store.update_bill(&file_ref.key, &record).await {
            Ok(bill) => {
                info!("Submitted bill {} ({})", bill.id, bill.name);
                self.stage = DraftStage::Submitted;
                self.error = None;
                Some(Route::Bills)
            }
            Err(err) => {
                error!("Bill submission failed: {}", err);
                self.stage = DraftStage::Failed;
                self.error = Some(err.into());
                None
            }
        }
    }

    fn build_record(&self, fields: &NewBillFields, file_ref: &FileRef) -> Result<BillRecord, ValidationError> {
        let amount = fields
            .amount
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite() && *a >= 0.0)
            .ok_or_else(|| ValidationError::InvalidAmount(fields.amount.clone()))?;

        let date = parse_date(&fields.date)
            .ok_or_else(|| ValidationError::InvalidDate(fields.date.clone()))?;

        let pct = fields.pct.trim().parse::<i32>().unwrap_or(DEFAULT_PCT);

        Ok(BillRecord {
            email: self.session.email.clone(),
            expense_type: Some(fields.expense_type.label().to_string()),
            name: fields.name.trim().to_string(),
            amount,
            date: date.format("%Y-%m-%d").to_string(),
            vat: non_empty(&fields.vat),
            pct: Some(pct),
            commentary: non_empty(&fields.commentary),
            status: BillStatus::Pending,
            file_url: Some(file_ref.file_url.clone()),
            file_name: self.file_name.clone(),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
