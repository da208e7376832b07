pub mod channel;
pub mod integration;
pub mod stream;

pub use channel::PostgresChannelRepository;
pub use integration::PostgresIntegrationRepository;
pub use stream::PostgresStreamRepository;
