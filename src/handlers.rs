pub mod accounts;
pub mod api;
pub mod dashboard;
pub mod health;
