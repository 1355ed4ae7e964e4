pub mod config;
pub mod error;
pub mod logging;
pub mod memo_models;
pub mod repositories;
pub mod routes;
pub mod server;
pub mod services;
pub mod viewer;
