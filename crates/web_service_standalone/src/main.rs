use chat_core::Config;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "verdi", about = "Persona-filtering chat proxy")]
struct Args {
    /// Address to bind
    #[arg(long, env = "APP_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "APP_PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();

    let config = Config::from_env();
    if config.api_key.is_none() {
        tracing::warn!("VERDI_API_KEY is not set; chat requests will fail until it is");
    }

    if let Err(e) = web_service::run(&args.host, args.port, config).await {
        tracing::error!("Failed to run web service: {}", e);
        std::process::exit(1);
    }
}
