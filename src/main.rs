use clap::Parser;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use smartfarm_sheets::adapters::config::{app_config::AppConfig, telemetry_config::TelemetryConfig};
use smartfarm_sheets::adapters::network::proxy::configure_process_proxy;
use smartfarm_sheets::prettyprint::prettyprint::PrettyFormatter;
use tracing::{error, info, instrument, warn};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

mod cli_adapter;
mod service_factory;

use cli_adapter::{Cli, CliAdapter};
use service_factory::ServiceFactory;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let telemetry = config
        .as_ref()
        .map(|config| config.telemetry.clone())
        .unwrap_or_default();
    setup_tracing(&telemetry)?;
    setup_panic_hook();

    info!("Starting smartfarm CLI");

    let adapter = match config {
        Ok(config) => {
            configure_process_proxy(&config.network).await;
            CliAdapter::new(
                ServiceFactory::create(&config.sheets),
                config.sheets.service_account.clone(),
            )
        }
        Err(report) if cli.command.is_offline() => {
            warn!("Configuration not loaded, running offline: {:?}", report);
            CliAdapter::offline()
        }
        Err(report) => {
            error!("Failed to load configuration: {:?}", report);
            opentelemetry::global::shutdown_tracer_provider();
            return Err(format!("{report:?}").into());
        }
    };

    let result = adapter.run(cli.command).await;
    match &result {
        Ok(()) => info!("CLI execution completed successfully"),
        Err(e) => error!("CLI execution failed: {e}"),
    }

    opentelemetry::global::shutdown_tracer_provider();
    result
}

fn setup_tracing(telemetry: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::terminal())
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::INFO);

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::log_file())
        .with_writer(std::fs::File::create(&telemetry.log_file)?)
        .with_ansi(false);

    let otel_layer = match &telemetry.otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "smartfarm"),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            Some(OpenTelemetryLayer::new(tracer))
        }
        None => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("smartfarm", tracing::Level::TRACE)
                .with_target("smartfarm_sheets", tracing::Level::TRACE),
        )
        .with(otel_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}
