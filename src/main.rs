#![warn(clippy::pedantic)]

use std::process::ExitCode;
use std::sync::Arc;

use story::generator::GeminiStoryGenerator;
use story::narrator::GoogleNarrator;
use story::orchestrator::Orchestrator;
use tokio::net::TcpListener;
use tokio::signal;
use utilities::config::Config;
use utilities::{api_utils, logchamp};

mod apis;
mod story;
mod utilities;
mod web;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let config = Config::from_env();

    let log_file = config.as_ref().ok().and_then(|config| config.log_file.as_deref());
    if let Err(err) = logchamp::init(log_file) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = dotenv {
        if !err.not_found() {
            log::warn!("cannot load .env: {err}");
        }
    }

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let exit_code = match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    };

    log::logger().flush();
    exit_code
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let http_client = api_utils::http_client(&config)?;

    let orchestrator = Orchestrator::new(
        Arc::new(GeminiStoryGenerator::new(http_client.clone(), &config)),
        Arc::new(GoogleNarrator::new(http_client, &config)),
    );
    let app = web::router(Arc::new(orchestrator), config.max_upload_size);

    let listener = TcpListener::bind(config.bind_address).await?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown()).await?;
    log::info!("server stopped");

    Ok(())
}

async fn shutdown() {
    if let Err(err) = signal::ctrl_c().await {
        log::error!("cannot listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }

    log::warn!("Ctrl+C received");
}
