pub mod analysis;
pub mod api;
pub mod app;
pub mod config;
pub mod dashboard_error;
pub mod importers;
pub mod models;
pub mod services;
pub mod utils;
