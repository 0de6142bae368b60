pub mod schema;
pub mod store;

pub use schema::BehaviorReport;
pub use store::{ReportDigest, ReportListing, ReportStore};
