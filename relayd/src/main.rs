use clap::Parser;
use metrics_exporter_statsd::StatsdBuilder;
use relay::backends::ProcessEnv;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "relayd", about = "App Store notification fan-out relay")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, short, default_value = "relayd.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = config::Config::from_file(&cli.config)?;
    config.relay.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Keep the guard alive for the whole process so events get flushed
    let _sentry_guard = config.logging().map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    if let Some(metrics_config) = config.metrics() {
        let recorder = StatsdBuilder::from(&metrics_config.statsd_host, metrics_config.statsd_port)
            .with_queue_size(5000)
            .with_buffer_size(1024)
            .build(Some("relay"))?;
        metrics::set_global_recorder(recorder)
            .map_err(|e| format!("could not install metrics recorder: {e}"))?;
    }

    tracing::info!(config = %cli.config.display(), "Starting relay");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(relay::run(config.relay, Arc::new(ProcessEnv)))?;

    Ok(())
}
