// File: streamwatch-core/src/platforms/twitch/mod.rs

pub mod auth;
pub mod client;
pub mod requests;

pub use auth::AppTokenProvider;
pub use client::TwitchHelixClient;
