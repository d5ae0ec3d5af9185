use anyhow::Result;
use clap::{Arg, Command};
use std::sync::Arc;
use tracing::info;

use lecture_tutor::api::{start_http_server, AppState};
use lecture_tutor::config::Config;
use lecture_tutor::gemini::client::HttpGeminiClient;
use lecture_tutor::gemini::{resolver, GenerativeBackend};
use lecture_tutor::pipeline::Tutor;
use lecture_tutor::transcript::TranscriptFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "lecture_tutor=info,warn".to_string()),
        )
        .init();

    let matches = Command::new("Lecture Tutor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Transcript-to-study-notes and quiz generation service")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to bind the HTTP server on (overrides config)"),
        )
        .get_matches();

    let config = Config::load()?;
    config.validate()?;

    let port = matches
        .get_one::<String>("port")
        .and_then(|p| p.parse().ok())
        .unwrap_or(config.server.port);

    // Missing credential is fatal; no partial startup.
    let api_key = Config::api_key_from_env()?;

    info!("Lecture Tutor starting...");

    let client = Arc::new(HttpGeminiClient::new(
        api_key,
        config.gemini.timeout_seconds,
    )?);

    // Pin the model binding for the process lifetime. Exhausting every
    // candidate aborts startup.
    let binding = resolver::resolve(client.as_ref(), &config.gemini.preferred_model).await?;
    info!("Resolved model binding: {}", binding);

    let backend: Arc<dyn GenerativeBackend> = client;
    let tutor = Arc::new(Tutor::new(backend, binding, config.limits.clone()));
    let fetcher = Arc::new(TranscriptFetcher::new(config.gemini.timeout_seconds));

    let state = AppState {
        tutor,
        fetcher,
        config: Arc::new(config),
    };

    start_http_server(state, port).await
}
