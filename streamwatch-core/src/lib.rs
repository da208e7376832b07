// src/lib.rs

pub mod config;
pub mod db;
pub mod eventbus;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod test_utils;

pub use config::PresenceConfig;
pub use db::Database;
pub use streamwatch_common::error::Error;
