use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::StoreError;
use crate::format::{format_date, format_status, parse_date};
use crate::models::{Bill, Session};
use crate::store::Store;

/// A bill ready for display. `bill` keeps the values as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedBill {
    pub bill: Bill,
    pub date: String,
    pub status: String,
}

impl FormattedBill {
    pub fn from_bill(bill: Bill) -> Self {
        let date = format_date(&bill.date).unwrap_or_else(|err| {
            warn!("Keeping raw date for bill {}: {}", bill.id, err);
            bill.date.clone()
        });
        let status = match format_status(&bill.status) {
            Ok(label) => label.to_string(),
            Err(err) => {
                warn!("Keeping raw status for bill {}: {}", bill.id, err);
                bill.status.clone()
            }
        };

        Self { bill, date, status }
    }
}

pub struct BillsList {
    store: Arc<dyn Store>,
    session: Session,
}

impl BillsList {
    pub fn new(store: Arc<dyn Store>, session: Session) -> Self {
        Self { store, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Bills of the current session, most recent first.
    pub async fn fetch_formatted_bills(&self) -> Result<Vec<FormattedBill>, StoreError> {
        let mut bills = self.store.list_bills(&self.session.email).await?;
        sort_by_date_desc(&mut bills);
        info!("Fetched {} bills for {}", bills.len(), self.session.email);

        Ok(bills.into_iter().map(FormattedBill::from_bill).collect())
    }
}

// Stable: equal dates keep store order, unparseable dates go last
fn sort_by_date_desc(bills: &mut [Bill]) {
    bills.sort_by(|a, b| match (parse_date(&a.date), parse_date(&b.date)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
