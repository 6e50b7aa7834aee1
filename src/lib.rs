pub mod api;
pub mod comparison;
pub mod config;
pub mod fetch_error;
pub mod fetcher;
pub mod model;
pub mod parser;
pub mod services;
