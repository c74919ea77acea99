use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Bill, BillRecord, FileRef, UploadRequest};
use crate::store::Store;

/// In-memory store for tests. Records every call and can be told to fail.
#[derive(Default)]
pub struct MockStore {
    pub bills: Mutex<Vec<Bill>>,
    pub list_error: Mutex<Option<StoreError>>,
    pub upload_error: Mutex<Option<StoreError>>,
    pub update_error: Mutex<Option<StoreError>>,
    pub list_calls: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub updates: Mutex<Vec<(String, BillRecord)>>,
    pub created: Mutex<Vec<BillRecord>>,
}

impl MockStore {
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: Mutex::new(bills),
            ..Default::default()
        }
    }

    pub fn fail_list(self, err: StoreError) -> Self {
        *self.list_error.lock().unwrap() = Some(err);
        self
    }

    pub fn fail_upload(self, err: StoreError) -> Self {
        *self.upload_error.lock().unwrap() = Some(err);
        self
    }

    pub fn fail_update(self, err: StoreError) -> Self {
        *self.update_error.lock().unwrap() = Some(err);
        self
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

pub fn bill(id: &str, name: &str, date: &str, status: &str) -> Bill {
    Bill {
        id: id.to_string(),
        email: "a@a".to_string(),
        expense_type: Some("Transports".to_string()),
        name: name.to_string(),
        amount: 100.0,
        date: date.to_string(),
        vat: Some("20".to_string()),
        pct: Some(20),
        commentary: None,
        status: status.to_string(),
        file_url: Some(format!("https://localhost:3456/images/{}.jpg", id)),
        file_name: Some(format!("{}.jpg", id)),
    }
}

fn from_record(id: String, record: &BillRecord) -> Bill {
    Bill {
        id,
        email: record.email.clone(),
        expense_type: record.expense_type.clone(),
        name: record.name.clone(),
        amount: record.amount,
        date: record.date.clone(),
        vat: record.vat.clone(),
        pct: record.pct,
        commentary: record.commentary.clone(),
        status: record.status.to_string(),
        file_url: record.file_url.clone(),
        file_name: record.file_name.clone(),
    }
}

#[async_trait]
impl Store for MockStore {
    async fn list_bills(&self, email: &str) -> Result<Vec<Bill>, StoreError> {
        self.list_calls.lock().unwrap().push(email.to_string());
        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        // Rows reserved by an upload have no date until the bill is submitted
        Ok(self
            .bills
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.email == email && !b.date.is_empty())
            .cloned()
            .collect())
    }

    async fn create_upload(&self, upload: UploadRequest) -> Result<FileRef, StoreError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(upload.clone());
        if let Some(err) = self.upload_error.lock().unwrap().clone() {
            return Err(err);
        }

        let key = (1233 + uploads.len()).to_string();
        let file_url = "https://localhost:3456/images/test.jpg".to_string();
        self.bills.lock().unwrap().push(Bill {
            id: key.clone(),
            email: upload.email,
            expense_type: None,
            name: String::new(),
            amount: 0.0,
            date: String::new(),
            vat: None,
            pct: None,
            commentary: None,
            status: "pending".to_string(),
            file_url: Some(file_url.clone()),
            file_name: Some(upload.file_name),
        });
        Ok(FileRef { file_url, key })
    }

    async fn create_bill(&self, record: &BillRecord) -> Result<Bill, StoreError> {
        self.created.lock().unwrap().push(record.clone());
        let mut bills = self.bills.lock().unwrap();
        let bill = from_record(format!("created-{}", bills.len()), record);
        bills.push(bill.clone());
        Ok(bill)
    }

    async fn update_bill(&self, id: &str, record: &BillRecord) -> Result<Bill, StoreError> {
        self.updates.lock().unwrap().push((id.to_string(), record.clone()));
        if let Some(err) = self.update_error.lock().unwrap().clone() {
            return Err(err);
        }
        let bill = from_record(id.to_string(), record);
        let mut bills = self.bills.lock().unwrap();
        match bills.iter_mut().find(|b| b.id == id) {
            Some(existing) => *existing = bill.clone(),
            None => bills.push(bill.clone()),
        }
        Ok(bill)
    }
}
