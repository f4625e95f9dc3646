pub mod appointments;
pub mod auth;
pub mod catalog;
pub mod documents;
pub mod requests;
