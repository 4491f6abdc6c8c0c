//! kestrel-shell: Headless frontend for kestrel
//!
//! Parses the command line, wires the lifecycle controller to headless
//! window surfaces, and drives the whole application on a single-threaded
//! runtime.

pub mod cli;
pub mod surface;

use anyhow::Context;

use crate::cli::Cli;
use crate::surface::HeadlessBackend;
use kestrel_app::config::{default_profile_dir, load_config, Config};
use kestrel_app::controller::LifecycleController;
use kestrel_app::meta::AppMetadata;
use kestrel_app::startup::{load_initial_state, RunMode};
use kestrel_app::store::{DiskStore, MemoryStore, SessionStore};

/// Run the headless application
pub fn run() -> anyhow::Result<()> {
    let args = Cli::parse_args();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&args.log_level),
    )
    .init();

    log::info!("Starting kestrel");

    let metadata = AppMetadata::parse("kestrel", env!("CARGO_PKG_VERSION"))
        .context("invalid build version")?;
    let mode = RunMode::from_env();

    let profile_dir = args.profile_dir.clone().or_else(default_profile_dir);

    let config = match &profile_dir {
        Some(dir) => load_config(dir).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {e}");
            Config::default()
        }),
        None => {
            log::warn!("No profile directory available, using default config");
            Config::default()
        }
    };

    let check_updates_on_launch = config.updates.enabled && !mode.is_test();

    let store: Box<dyn SessionStore> = match &profile_dir {
        Some(dir) if !args.ephemeral && !mode.is_test() => Box::new(DiskStore::in_profile(dir)),
        _ => Box::new(MemoryStore::new()),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(async move {
        let initial = load_initial_state(store.as_ref(), mode).await;

        let (mut controller, handle) = LifecycleController::new(
            config,
            metadata,
            mode,
            store,
            Box::new(HeadlessBackend::new()),
        );
        controller.set_initial_location(args.location.clone());
        if !args.ephemeral {
            if let Some(dir) = &profile_dir {
                controller.set_profile_dir(dir);
            }
        }
        controller.on_initialized(|ready| {
            log::info!(
                "Session up: {} windows ({} restored)",
                ready.windows,
                ready.restored
            );
        });

        // Ctrl-C asks the controller to shut down like any other source
        let signal_handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Interrupt received, shutting down");
                signal_handle.request_terminate();
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let signal_handle = handle.clone();
            tokio::spawn(async move {
                let mut term = match signal(SignalKind::terminate()) {
                    Ok(term) => term,
                    Err(e) => {
                        log::warn!("Cannot listen for SIGTERM: {e}");
                        return;
                    }
                };
                if term.recv().await.is_some() {
                    log::info!("Termination signal received, shutting down");
                    signal_handle.request_terminate();
                }
            });
        }

        controller.start(initial);
        if check_updates_on_launch {
            handle.check_for_updates();
        }
        let report = controller.run().await;

        log::info!(
            "Exited with {} snapshots collected (persisted: {})",
            report.collected,
            report.persisted
        );
    });

    Ok(())
}
