pub mod api;
pub mod auth;
pub mod codec;
pub mod db;
pub mod errors;
pub mod featured;
pub mod hub_config;
pub mod models;
pub mod search;
pub mod sections;
pub mod server;
pub mod telemetry;
pub mod uploads;
