pub mod bills;
pub mod new_bill;

pub use bills::{BillsList, FormattedBill};
pub use new_bill::{DraftStage, NewBillFields, NewBillForm};
