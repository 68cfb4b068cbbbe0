pub mod config;
pub mod event;
pub mod ingest;
pub mod notify;
pub mod processor;
pub mod run;
