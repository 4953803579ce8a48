pub mod admin;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod output;
pub mod poller;
pub mod store;
