pub mod command_handler;
pub mod tabular_store;
