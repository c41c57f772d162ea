use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // .env first so RUST_LOG and DATABASE_URL are visible to config loading
    dotenv().ok();

    // file first, environment as the fallback; logged once the subscriber is up
    let (cfg, file_error) = configs::load_or_env(&configs::default_path());
    let format = cfg.as_ref().map(|c| c.log.format.as_str()).unwrap_or("compact");
    common::utils::logging::init_logging(format);
    info!(service = "disease-registry", event = "logger_init", format, "tracing subscriber initialized");
    if let Some(e) = &file_error {
        warn!(service = "disease-registry", event = "config_fallback", error = %e, "config file unavailable, using environment");
    }
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "disease-registry", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "disease-registry",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg
        .server
        .worker_threads
        .or_else(|| std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "disease-registry", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "disease-registry",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "disease registry starting"
    );

    // Ctrl+C is handled inside run_with_config via graceful shutdown
    rt.block_on(async move {
        match server::startup::run_with_config(cfg).await {
            Ok(()) => {
                info!(service = "disease-registry", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "disease-registry", event = "run_failed", error = %e, "server exited with error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
