// Common library for the EventTrap data-access core: pool, sessions, queries, and sanitization

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod geo;
pub mod models;
pub mod sanitize;
pub mod telemetry;
