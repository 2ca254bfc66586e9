pub mod authentication;
pub mod configuration;
pub mod routes;
pub mod startup;
pub mod telemetry;
mod utils;
