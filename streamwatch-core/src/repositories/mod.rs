pub mod postgres;

pub use postgres::{PostgresChannelRepository, PostgresIntegrationRepository, PostgresStreamRepository};
