pub mod appointments;
pub mod auth;
pub mod catalog;
pub mod requests;
