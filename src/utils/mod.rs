pub mod table;
pub mod format;
pub mod errors;

pub use table::Table;
