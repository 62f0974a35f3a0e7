pub mod apis;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod tasks;
pub mod types;
