use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use streamwatch_common::traits::api::{EventPublisher, MAX_LIVE_STATUS_BATCH};
use streamwatch_core::eventbus::{EventBus, RedisPublisher};
use streamwatch_core::platforms::twitch::TwitchHelixClient;
use streamwatch_core::repositories::{
    PostgresChannelRepository, PostgresIntegrationRepository, PostgresStreamRepository,
};
use streamwatch_core::services::StreamPresenceService;
use streamwatch_core::tasks::spawn_stream_presence_task;
use streamwatch_core::{Database, Error, PresenceConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "streamwatch")]
#[command(author, version, about = "Streamwatch - keeps live stream state in sync with Twitch")]
struct Args {
    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://streamwatch@localhost:5432/streamwatch")]
    database_url: String,

    /// Redis URL for publishing stream events. Without it events stay in-process.
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// "production" selects the production interval.
    #[arg(long, env = "APP_ENV", default_value = "development")]
    app_env: String,

    #[arg(long, env = "TWITCH_CLIENT_ID")]
    twitch_client_id: String,

    #[arg(long, env = "TWITCH_CLIENT_SECRET")]
    twitch_client_secret: String,

    #[arg(long, env = "PRODUCTION_INTERVAL_SECS", default_value_t = 300)]
    production_interval_secs: u64,

    #[arg(long, env = "DEVELOPMENT_INTERVAL_SECS", default_value_t = 15)]
    development_interval_secs: u64,

    /// Timeout for a single Helix batch call.
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 10)]
    fetch_timeout_secs: u64,

    /// User ids per Helix call (at most 100).
    #[arg(long, env = "BATCH_SIZE", default_value_t = MAX_LIVE_STATUS_BATCH)]
    batch_size: usize,

    /// Skip applying migrations at startup.
    #[arg(long, default_value = "false")]
    skip_migrations: bool,
}

impl Args {
    fn presence_config(&self) -> PresenceConfig {
        PresenceConfig {
            app_env: self.app_env.clone(),
            production_interval: Duration::from_secs(self.production_interval_secs),
            development_interval: Duration::from_secs(self.development_interval_secs),
            batch_size: self.batch_size,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}

fn init_tracing() {
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("streamwatch=info,sqlx=warn"));
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("Streamwatch starting. app_env={}", args.app_env);

    if let Err(e) = run(args).await {
        error!("Streamwatch error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let config = args.presence_config();
    if config.batch_size != config.effective_batch_size() {
        warn!(
            "batch_size {} is outside 1..={}; using {}",
            config.batch_size,
            MAX_LIVE_STATUS_BATCH,
            config.effective_batch_size()
        );
    }

    let db = Database::new(&args.database_url).await?;
    if !args.skip_migrations {
        db.migrate().await?;
    }

    let event_bus = EventBus::new();
    let publisher: Arc<dyn EventPublisher> = match &args.redis_url {
        Some(url) => Arc::new(RedisPublisher::connect(url).await?),
        None => {
            warn!("No REDIS_URL configured; stream events are only published in-process");
            Arc::new(event_bus.clone())
        }
    };

    let helix = TwitchHelixClient::new(&args.twitch_client_id, &args.twitch_client_secret);

    let service = Arc::new(StreamPresenceService::new(
        Arc::new(PostgresChannelRepository::new(db.pool().clone())),
        Arc::new(PostgresIntegrationRepository::new(db.pool().clone())),
        Arc::new(PostgresStreamRepository::new(db.pool().clone())),
        Arc::new(helix),
        publisher,
        config,
    ));

    let cancel = CancellationToken::new();
    let handle = spawn_stream_presence_task(service, cancel.clone());

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received; waiting for the current cycle to finish...");
    cancel.cancel();

    if let Err(e) = handle.await {
        error!("Stream presence task ended abnormally: {:?}", e);
    }
    event_bus.shutdown();
    Ok(())
}
