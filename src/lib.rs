pub mod api_client;
pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod envelope;
pub mod inspection;
pub mod runner;
pub mod schema;
pub mod suites;
pub mod telemetry;
pub mod utils;
