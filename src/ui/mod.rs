pub mod bills;
pub mod components;
pub mod new_bill;
