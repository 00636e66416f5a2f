pub mod credentials;
pub mod sheets;
pub mod smartfarm;
