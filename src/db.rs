pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
