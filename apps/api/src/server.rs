use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::ServeArgs;
use crate::config::Config;
use crate::db::create_pool;
use crate::reports::queue::spawn_worker;
use crate::reports::store::S3ArtifactStore;
use crate::routes::build_router;
use crate::scoring::catalog::InstrumentCatalog;
use crate::state::AppState;

/// Filter directive for this binary's own log targets. Targets are module
/// paths rooted at the binary crate, not the package name.
fn default_directive(level: &str) -> String {
    let root = module_path!().split("::").next().unwrap_or("questionarios");
    format!("{root}={level}")
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `default_level` when set.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run(args: ServeArgs) -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);

    info!("Starting questionarios API v{}", env!("CARGO_PKG_VERSION"));

    let mut catalog = InstrumentCatalog::builtin()?;
    if let Some(path) = &config.instruments_path {
        let loaded = catalog.load_overrides(path)?;
        info!("Loaded {loaded} instrument definition(s) from {}", path.display());
    }
    info!("Instrument catalog ready ({} instruments)", catalog.len());

    let db = create_pool(&config.database_url).await?;

    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    let s3 = build_s3_client(&config).await;
    let artifacts = Arc::new(S3ArtifactStore::new(s3, config.s3_bucket.clone()));
    info!("S3 artifact store initialized (bucket: {})", config.s3_bucket);

    let port = args.port.unwrap_or(config.port);
    let state = AppState {
        db,
        redis,
        artifacts,
        catalog: Arc::new(catalog),
    };

    spawn_worker(state.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "questionarios-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
