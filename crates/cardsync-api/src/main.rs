//! cardsync server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, starts one status-subscriber worker per channel partition, and
//! serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use cardsync_api::{AppState, ServerConfig};
use cardsync_lifecycle::{
  CardLifecycle, ClientLifecycle, HttpCardRequester, PartitionedChannel,
  StatusPublisher, StatusSubscriber,
};
use cardsync_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "cardsync client and card service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CARDSYNC")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors_allowed_origins"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Lifecycles.
  let card_request_url = server_cfg.card_request_url();
  let requester = HttpCardRequester::new(
    card_request_url.clone(),
    server_cfg.card_request_timeout(),
  )
  .context("failed to build card request client")?;
  let cards = Arc::new(CardLifecycle::new(Arc::clone(&store)));
  let clients = Arc::new(
    ClientLifecycle::new(Arc::clone(&store), Arc::new(requester))
      .with_card_request_timeout(server_cfg.card_request_timeout()),
  );

  // Status synchronization.
  let (channel, partitions) =
    PartitionedChannel::new(server_cfg.topic.clone(), server_cfg.partitions);
  tracing::info!(
    topic = %server_cfg.topic,
    partitions = channel.partition_count(),
    %card_request_url,
    "starting status subscriber"
  );
  let subscriber =
    Arc::new(StatusSubscriber::new(Arc::clone(&clients), Arc::clone(&cards)));
  let _workers = subscriber.spawn(partitions);

  let state = AppState {
    clients,
    cards,
    publisher: StatusPublisher::new(Arc::new(channel)),
  };

  let cors = server_cfg
    .cors_layer()
    .context("invalid origin in cors_allowed_origins")?;
  let app = cardsync_api::router(state, cors);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let Ok(home) = std::env::var("HOME") else {
    return path.to_path_buf();
  };
  let s = path.to_string_lossy();
  if s == "~" {
    return PathBuf::from(home);
  }
  if let Some(rest) = s.strip_prefix("~/") {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
