//! HTTP API for aerial-sr

pub mod health;
pub mod reports;
pub mod ui;

pub use health::health_routes;
pub use reports::report_routes;
pub use ui::ui_routes;
