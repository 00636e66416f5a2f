pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod prettyprint;

pub use application::{
    client_evaluations::ClientEvaluations, dashboard::Dashboard, projects::ProjectTracker,
    record_store::SheetRecordStore, sales::SalesPipeline,
};
