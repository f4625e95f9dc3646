pub mod expr;
pub mod ordering;
pub mod pagination;
pub mod params;
pub mod request_filter;
pub mod service_filter;

pub use expr::{push_where, Expr};
pub use pagination::{PageRequest, Paginated};
pub use params::Params;
pub use request_filter::{RequestPredicate, RequestQuery};
pub use service_filter::ServiceQuery;
