pub mod dispatch;
pub mod health;
pub mod json_body;
pub mod path_not_found;
pub mod vouchers;
