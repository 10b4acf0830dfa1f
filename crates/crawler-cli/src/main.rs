mod config;
mod spiders;

use aws_config::BehaviorVersion;
use clap::Parser;
use crawler_api::state::AppState;
use crawler_engine::CrawlerEngine;
use crawler_fetch::{Fetcher, RetryConfig, RobotsConfig};
use crawler_render::NoopRenderer;
use crawler_scheduler::{Scheduler, SchedulerConfig, SiteEntry};
use crawler_storage::{PostgresContentRepository, S3ObjectStore, StoragePipeline};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crawler")]
#[command(about = "Multi-site RSS/web content crawler")]
struct Args {
    #[arg(long, default_value = "config/crawler.yml")]
    config: String,

    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!(config = %args.config, bind = %args.bind, "starting crawler");

    let app_config = config::load(std::path::Path::new(&args.config))?;

    let pool = sqlx::postgres::PgPoolOptions::new().max_connections(10).connect(&app_config.database_url).await?;
    let repository: Arc<dyn crawler_storage::ContentRepository> = Arc::new(PostgresContentRepository::new(pool));

    let aws_cfg = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let s3_client = match &app_config.s3_endpoint {
        Some(endpoint) => {
            let s3_cfg = aws_sdk_s3::config::Builder::from(&aws_cfg).endpoint_url(endpoint).force_path_style(true).build();
            aws_sdk_s3::Client::from_conf(s3_cfg)
        }
        None => aws_sdk_s3::Client::new(&aws_cfg),
    };
    let objects: Arc<dyn crawler_storage::ObjectStore> = Arc::new(S3ObjectStore::new(s3_client, app_config.s3_bucket.clone()));

    let pipeline = Arc::new(StoragePipeline::new(objects, repository.clone()));

    let fetcher = Arc::new(Fetcher::new(app_config.user_agent.clone(), RetryConfig::default())?.with_robots(RobotsConfig::default()));
    let renderer: Arc<dyn crawler_render::Renderer> = Arc::new(NoopRenderer);
    let engine = Arc::new(CrawlerEngine::new(fetcher, renderer, pipeline.clone()));

    let mut sites = HashMap::new();
    for (name, site_config) in &app_config.sites {
        let spider = spiders::build(site_config)?;
        sites.insert(name.clone(), SiteEntry { spider, config: site_config.clone() });
    }
    tracing::info!(site_count = sites.len(), "loaded site configuration");

    let scheduler = Arc::new(Scheduler::new(engine, sites, SchedulerConfig::default()));
    scheduler.bootstrap_from_sites()?;
    scheduler.start().await;

    let state = AppState::new(scheduler.clone(), pipeline, repository);
    let app = crawler_api::router(state);

    let addr: SocketAddr = args.bind.parse()?;
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown = shutdown_signal(scheduler.clone());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    Ok(())
}

async fn shutdown_signal(scheduler: Arc<Scheduler>) {
    let ctrl_c = async { tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler") };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping scheduler");
    scheduler.shutdown().await;
}
