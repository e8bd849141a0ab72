pub mod amount;
pub mod error;
pub mod payload;
pub mod voucher;
