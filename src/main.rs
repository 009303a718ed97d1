use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use dirshare::api::routes;
use dirshare::build_info::{BUILD_VERSION, GIT_SHA};
use dirshare::config::{Cli, ServerConfig};
use dirshare::infrastructure::{
    broadcast::start_broadcast_loop, file_watcher::start_file_watcher, registry::ClientRegistry,
};
use dirshare::utils::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = init_logging("info");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    let config = ServerConfig::from_cli(cli)?;

    tracing::info!("Path: {:?}", config.root.as_path());
    tracing::info!("Build: {} ({})", GIT_SHA, BUILD_VERSION);

    let registry = Arc::new(ClientRegistry::new(config.delivery, config.client_buffer));
    tracing::info!("Live delivery mode: {:?}", registry.delivery());

    // No request is served unless the watch is in place.
    let (watcher, events) = start_file_watcher(&config.root)?;
    let broadcast = start_broadcast_loop(events, Arc::clone(&registry));

    let bind = (config.bind, config.port);
    let config_data = web::Data::new(config);
    let registry_data = web::Data::from(Arc::clone(&registry));

    tracing::info!("Starting server on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add((
                        "Content-Security-Policy",
                        [
                            "default-src 'self'",
                            "script-src 'self'",
                            "style-src 'self'",
                            "img-src 'self' data:",
                            "connect-src 'self' ws: wss:",
                            "object-src 'none'",
                            "base-uri 'self'",
                            "form-action 'self'",
                        ]
                        .join("; "),
                    ))
                    .add(("X-Content-Type-Options", "nosniff")),
            )
            .app_data(config_data.clone())
            .app_data(registry_data.clone())
            .configure(routes)
    })
    .bind(bind)
    .with_context(|| format!("Could not bind {}:{}", bind.0, bind.1))?
    .run()
    .await
    .context("HTTP server failed")?;

    drop(watcher);
    broadcast.abort();
    tracing::info!("Shut down");

    Ok(())
}
