pub mod app_config;
pub mod network_config;
pub mod sheets_config;
pub mod telemetry_config;
