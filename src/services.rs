pub mod appointment_service;
pub mod auth;
pub mod catalog_service;
pub mod document_service;
pub mod request_service;
