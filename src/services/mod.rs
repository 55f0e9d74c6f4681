pub mod time_service;
pub mod comparison_service;
pub mod report_service;
pub mod refresh_service;
