pub mod auth;
pub mod client_context;
pub mod google_store;
pub mod grid;
pub mod http_client;
pub mod spreadsheet_manager;
pub mod value_range_factory;
