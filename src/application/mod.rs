pub mod client_evaluations;
pub mod dashboard;
pub mod projects;
pub mod record_store;
pub mod sales;
