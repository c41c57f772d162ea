use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use service::disease::{DiseaseSearchIndex, DiseaseService, SeaOrmDiseaseRepository, TantivyDiseaseIndex};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{routes, state::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router with the default CORS policy; used by `run_with_config` and by the HTTP tests.
pub fn app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

fn build_index(cfg: &configs::SearchConfig) -> anyhow::Result<Arc<dyn DiseaseSearchIndex>> {
    let index = match cfg.index_dir.as_deref() {
        Some(dir) => TantivyDiseaseIndex::open_or_create(Path::new(dir), cfg.writer_heap_bytes)?,
        None => {
            info!("using in-memory search index");
            TantivyDiseaseIndex::in_ram(cfg.writer_heap_bytes)?
        }
    };
    Ok(Arc::new(index))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Build the app from `cfg` and serve it until Ctrl+C.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    common::utils::logging::init_logging(&cfg.log.format);

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await.context("apply migrations")?;
        info!("database migrations applied");
    }

    let index = build_index(&cfg.search)?;
    let diseases = Arc::new(DiseaseService::new(Arc::new(SeaOrmDiseaseRepository::new(db)), index));
    if cfg.search.reindex_on_startup {
        let n = diseases.reindex_all().await?;
        info!(indexed = n, "search index rebuilt from database");
    }

    let state = ServerState::new(diseases, &cfg.app.name);
    let app = app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, app = %cfg.app.name, "starting disease registry");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
