use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use pressmetrics_exporter::{ExporterConfig, ExporterState, exporter_router};
use pressmetrics_store::{RedbSampleStore, SampleStore};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const STORE_FILE: &str = "metrics.redb";

#[derive(Parser)]
#[command(name = "pressmetrics", about = "Prometheus exporter for WordPress sites")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "9117")]
    port: u16,

    #[arg(long, default_value = "./data")]
    data_dir: String,

    #[arg(long, env = "WORDPRESS_PATH", default_value = "/var/www/html")]
    wordpress_path: PathBuf,

    #[arg(long, default_value_t = 300)]
    window_seconds: u64,

    #[arg(long, default_value_t = 3600)]
    retention_seconds: u64,

    #[arg(long, default_value_t = 300)]
    purge_interval_seconds: u64,

    #[arg(long, default_value_t = 5000)]
    store_timeout_ms: u64,

    #[arg(long, env = "PHP_VERSION")]
    php_version: Option<String>,
}

impl Cli {
    fn exporter_config(&self) -> ExporterConfig {
        ExporterConfig {
            wordpress_path: self.wordpress_path.clone(),
            window: Duration::from_secs(self.window_seconds),
            retention: Duration::from_secs(self.retention_seconds),
            purge_interval: Duration::from_secs(self.purge_interval_seconds.max(1)),
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            runtime_version: self.php_version.clone(),
            ..ExporterConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env().add_directive("pressmetrics=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);
    let config = cli.exporter_config();

    let data_dir = PathBuf::from(&cli.data_dir);
    tokio::fs::create_dir_all(&data_dir).await?;
    let store: Arc<dyn SampleStore> = Arc::new(RedbSampleStore::open(&data_dir.join(STORE_FILE))?);
    info!(path = %data_dir.join(STORE_FILE).display(), "sample store ready");

    let purge_store = Arc::clone(&store);
    let retention = config.retention;
    let purge_interval = config.purge_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_interval);
        loop {
            interval.tick().await;
            let store = Arc::clone(&purge_store);
            match tokio::task::spawn_blocking(move || store.purge_older_than(retention)).await {
                Ok(Ok(removed)) => debug!(removed, "background retention sweep finished"),
                Ok(Err(err)) => warn!(error = %err, "background retention sweep failed"),
                Err(err) => warn!(error = %err, "background retention sweep panicked"),
            }
        }
    });
    info!(?purge_interval, ?retention, "retention sweeper enabled");

    info!(wordpress_path = %config.wordpress_path.display(), "serving metrics for wordpress");
    let state = Arc::new(ExporterState::new(config, store)?);
    let app = exporter_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("pressmetrics listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
