pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geo;
pub mod infra;
pub mod narrative;
pub mod output;
pub mod registry;
pub mod services;
pub mod snapshot;
pub mod usage;
pub mod validation;
