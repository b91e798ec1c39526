pub mod config;
pub mod error;
pub mod indicator;
pub mod market_hours;
pub mod model;
pub mod runner;
pub mod strategy;
pub mod tradier;
pub mod webhook;
