mod bill;
mod file_ref;
mod session;

pub use bill::{Bill, BillRecord, BillStatus, ExpenseType};
pub use file_ref::{FileRef, SelectedFile, UploadRequest};
pub use session::{Session, UserType};
