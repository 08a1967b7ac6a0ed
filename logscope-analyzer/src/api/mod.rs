//! HTTP API handlers for logscope-analyzer

pub mod analysis;
pub mod files;
pub mod health;
pub mod results;

pub use analysis::analysis_routes;
pub use files::file_routes;
pub use health::health_routes;
pub use results::result_routes;
