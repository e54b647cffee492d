pub mod api;
pub mod calc;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod state;
