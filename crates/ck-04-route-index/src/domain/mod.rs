//! Domain layer for the Route Index.

pub mod entry;
pub mod query;

pub use entry::{derive_domain, RouteEntry};
pub use query::RouteQuery;
