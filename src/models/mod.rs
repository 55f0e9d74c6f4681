//! Data models shared by the client, the services, and the presentation layer
//!
//! Everything here is request-scoped: built fresh for each report and dropped
//! once it has been rendered.

pub mod price;
pub mod report;

pub use report::Report;
