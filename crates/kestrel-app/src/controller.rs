//! Application lifecycle controller
//!
//! Owns the live windows, the application state, and the shutdown phase,
//! and runs the event loop everything else posts into. Startup replays the
//! saved session; shutdown collects state from every window open at that
//! moment, makes the one persistence attempt, and only then lets the
//! process go.

use std::mem;
use std::ops::ControlFlow;
use std::path::PathBuf;

use tokio::sync::mpsc;

use kestrel_core::ipc::{surface_channel, AppEvent, AppHandle, SurfaceRequest, UpdateStatus};
use kestrel_core::state::{AppState, WindowSnapshot};
use kestrel_core::window::{next_window_id, WindowBackend, WindowId, WindowRegistry, WindowSpec};

use crate::config::Config;
use crate::crash::CrashHerald;
use crate::menu::{create_menu_model, AppMenu};
use crate::meta::AppMetadata;
use crate::shutdown::{ShutdownBarrier, ShutdownPhase};
use crate::startup::RunMode;
use crate::store::SessionStore;
use crate::updater::UpdateChecker;

/// What initialization observers learn when startup replay completes
pub struct AppReady {
    /// Handle into the running application
    pub handle: AppHandle,
    /// Windows open after replay
    pub windows: usize,
    /// How many of them were restored from the saved session
    pub restored: usize,
}

type ReadyObserver = Box<dyn FnOnce(&AppReady)>;

/// What the run loop hands back when it ends
#[derive(Debug)]
pub struct ShutdownReport {
    /// Final application state, snapshots merged in
    pub state: AppState,
    /// Snapshots collected in the final round
    pub collected: usize,
    /// Whether the persistence attempt succeeded
    pub persisted: bool,
}

/// Orchestrates startup and shutdown of the whole application
pub struct LifecycleController {
    config: Config,
    metadata: AppMetadata,
    mode: RunMode,
    store: Box<dyn SessionStore>,
    backend: Box<dyn WindowBackend>,
    registry: WindowRegistry,
    state: AppState,
    phase: ShutdownPhase,
    handle: AppHandle,
    inbox: mpsc::UnboundedReceiver<AppEvent>,
    initial_location: Option<String>,
    profile_dir: Option<PathBuf>,
    ready_observers: Vec<ReadyObserver>,
    menu: AppMenu,
    update_checker: Option<UpdateChecker>,
    available_update: Option<String>,
    crash_herald: Option<CrashHerald>,
    collected: usize,
    persisted: bool,
}

impl LifecycleController {
    /// Create a controller and the handle that feeds its inbox
    pub fn new(
        config: Config,
        metadata: AppMetadata,
        mode: RunMode,
        store: Box<dyn SessionStore>,
        backend: Box<dyn WindowBackend>,
    ) -> (Self, AppHandle) {
        let (handle, inbox) = AppHandle::channel();
        let menu = create_menu_model(&metadata, None);

        let controller = Self {
            config,
            metadata,
            mode,
            store,
            backend,
            registry: WindowRegistry::new(),
            state: AppState::default(),
            phase: ShutdownPhase::Idle,
            handle: handle.clone(),
            inbox,
            initial_location: None,
            profile_dir: None,
            ready_observers: Vec::new(),
            menu,
            update_checker: None,
            available_update: None,
            crash_herald: None,
            collected: 0,
            persisted: false,
        };

        (controller, handle)
    }

    /// Location for one extra window opened at startup, after replay
    pub fn set_initial_location(&mut self, location: Option<String>) {
        self.initial_location = location;
    }

    /// Profile directory to watch for unclean exits
    pub fn set_profile_dir(&mut self, dir: impl Into<PathBuf>) {
        self.profile_dir = Some(dir.into());
    }

    /// Register an observer fired exactly once, after startup replay
    pub fn on_initialized(&mut self, observer: impl FnOnce(&AppReady) + 'static) {
        self.ready_observers.push(Box::new(observer));
    }

    /// Replace the whole application state
    pub fn set_state(&mut self, state: AppState) {
        self.state = state;
    }

    /// Current menu model
    pub fn menu(&self) -> &AppMenu {
        &self.menu
    }

    /// Bring the application up from the loaded state
    ///
    /// Replays one window per saved snapshot in saved order, then the
    /// command-line window if one was asked for, then a default window if
    /// neither produced any. Ends with at least one window open and the
    /// initialization observers fired.
    pub fn start(&mut self, mut initial: AppState) {
        let saved = initial.take_windows();
        self.set_state(initial);

        let restored = saved.len();
        for snapshot in saved {
            self.open_window(WindowSpec::restore(snapshot));
        }

        if let Some(location) = self.initial_location.take() {
            self.open_window(WindowSpec::at(location));
        } else if restored == 0 {
            let spec = self.default_window_spec();
            self.open_window(spec);
        }

        self.init_collaborators();

        let ready = AppReady {
            handle: self.handle.clone(),
            windows: self.registry.count(),
            restored,
        };
        for observer in self.ready_observers.drain(..) {
            observer(&ready);
        }

        log::info!(
            "{} initialized: {} windows ({} restored)",
            self.metadata.name,
            ready.windows,
            restored
        );
    }

    /// Run the event loop until shutdown completes
    pub async fn run(mut self) -> ShutdownReport {
        while let Some(event) = self.inbox.recv().await {
            if self.dispatch(event).await.is_break() {
                break;
            }
        }

        ShutdownReport {
            state: self.state,
            collected: self.collected,
            persisted: self.persisted,
        }
    }

    async fn dispatch(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::TerminateRequested => self.handle_terminate_request().await,
            AppEvent::StateReported { window, snapshot } => {
                self.handle_state_report(window, snapshot).await
            }
            AppEvent::WindowClosed(id) => self.handle_window_closed(id).await,
            AppEvent::OpenWindow(spec) => {
                self.open_window(spec);
                ControlFlow::Continue(())
            }
            AppEvent::Activated => {
                if self.registry.is_empty() {
                    let spec = self.default_window_spec();
                    self.open_window(spec);
                }
                ControlFlow::Continue(())
            }
            AppEvent::CheckForUpdates => {
                self.spawn_update_check();
                ControlFlow::Continue(())
            }
            AppEvent::UpdateStatus(status) => {
                self.handle_update_status(status);
                ControlFlow::Continue(())
            }
        }
    }

    /// Begin shutdown unless it has already gone past the point of no
    /// return
    async fn handle_terminate_request(&mut self) -> ControlFlow<()> {
        if self.phase.is_attempted() {
            return ControlFlow::Break(());
        }

        if self.registry.is_empty() {
            return self.finish_shutdown().await;
        }

        // Snapshot of who owes an answer: exactly the windows the request
        // reached. A repeat request while collecting starts the round over.
        let expected = self.registry.broadcast(SurfaceRequest::CaptureState);
        log::info!(
            "Shutdown requested, collecting state from {} windows",
            expected.len()
        );
        let barrier = ShutdownBarrier::new(expected);
        if barrier.is_satisfied() {
            return self.finish_shutdown().await;
        }
        self.phase = ShutdownPhase::Collecting(barrier);
        ControlFlow::Continue(())
    }

    async fn handle_state_report(
        &mut self,
        window: WindowId,
        snapshot: Option<WindowSnapshot>,
    ) -> ControlFlow<()> {
        let ShutdownPhase::Collecting(barrier) = &mut self.phase else {
            log::debug!("Ignoring state report from window {window} outside collection");
            return ControlFlow::Continue(());
        };

        if barrier.record(window, snapshot) {
            log::debug!(
                "Window {window} reported state, {} still pending",
                barrier.remaining()
            );
        } else {
            log::debug!("Discarding duplicate or unexpected state report from window {window}");
        }

        if barrier.is_satisfied() {
            return self.finish_shutdown().await;
        }
        ControlFlow::Continue(())
    }

    async fn handle_window_closed(&mut self, id: WindowId) -> ControlFlow<()> {
        if !self.registry.remove(id) {
            log::debug!("Close event for unknown window {id}");
            return ControlFlow::Continue(());
        }
        log::info!("Window {id} closed, {} remaining", self.registry.count());

        if let ShutdownPhase::Collecting(barrier) = &mut self.phase {
            barrier.forget(id);
            if barrier.is_satisfied() {
                return self.finish_shutdown().await;
            }
            return ControlFlow::Continue(());
        }

        if self.registry.is_empty()
            && matches!(self.phase, ShutdownPhase::Idle)
            && self.config.general.quit_when_all_windows_closed()
        {
            // Through the inbox, so one full turn separates the last close
            // from the terminate
            log::info!("Last window closed, requesting shutdown");
            self.handle.request_terminate();
        }
        ControlFlow::Continue(())
    }

    /// The only way into `PersistAttempted`: merge whatever was collected,
    /// make the one save attempt, end the loop
    async fn finish_shutdown(&mut self) -> ControlFlow<()> {
        if self.phase.is_attempted() {
            return ControlFlow::Break(());
        }

        let collected = match mem::replace(&mut self.phase, ShutdownPhase::PersistAttempted) {
            ShutdownPhase::Collecting(barrier) => barrier.into_snapshots(),
            _ => Vec::new(),
        };
        self.collected = collected.len();

        let mut state = self.state.clone();
        state.windows = collected;
        self.set_state(state);

        if self.mode.is_test() {
            log::debug!("Test run: skipping session persistence");
        } else {
            match self.store.save(&self.state).await {
                Ok(()) => {
                    self.persisted = true;
                    log::info!("Session persisted: {} windows", self.state.windows.len());
                }
                Err(e) => log::warn!("Failed to persist session, exiting anyway: {e}"),
            }
        }

        if let Some(herald) = &self.crash_herald {
            if let Err(e) = herald.mark_clean_exit() {
                log::warn!("Failed to clear crash sentinel: {e}");
            }
        }

        log::info!("Shutdown complete");
        ControlFlow::Break(())
    }

    fn open_window(&mut self, spec: WindowSpec) -> WindowId {
        let id = next_window_id();
        let (handle, channel) = surface_channel(id, self.handle.clone());
        self.registry.register(handle);
        self.backend.open_window(spec, channel);
        log::info!("Opened window {id}");
        id
    }

    fn default_window_spec(&self) -> WindowSpec {
        match &self.config.general.default_location {
            Some(location) => WindowSpec::at(location.clone()),
            None => WindowSpec::blank(),
        }
    }

    fn init_collaborators(&mut self) {
        // Crash detection only watches real profiles
        if !self.mode.is_test() {
            if let Some(dir) = &self.profile_dir {
                match CrashHerald::init(dir) {
                    Ok(herald) => self.crash_herald = Some(herald),
                    Err(e) => log::warn!("Crash detection unavailable: {e}"),
                }
            }
        }

        if self.config.updates.enabled {
            match UpdateChecker::new(&self.config.updates.repo, &self.metadata) {
                Ok(checker) => self.update_checker = Some(checker),
                Err(e) => log::warn!("Update checks unavailable: {e}"),
            }
        }
    }

    fn spawn_update_check(&self) {
        let Some(checker) = self.update_checker.clone() else {
            log::debug!("Update checks disabled, ignoring request");
            return;
        };
        let handle = self.handle.clone();

        tokio::spawn(async move {
            log::info!("Checking for updates");
            let status = match checker.check_for_update().await {
                Ok(Some(info)) => {
                    log::info!("Update available: {} ({})", info.version, info.name);
                    UpdateStatus::Available {
                        version: info.version,
                    }
                }
                Ok(None) => UpdateStatus::UpToDate,
                Err(e) => UpdateStatus::Failed(e.to_string()),
            };
            handle.send(AppEvent::UpdateStatus(status));
        });
    }

    fn handle_update_status(&mut self, status: UpdateStatus) {
        match status {
            UpdateStatus::UpToDate => log::info!("Already on the newest version"),
            UpdateStatus::Available { version } => {
                log::info!("Version {version} is available");
                self.available_update = Some(version);
                self.menu = create_menu_model(&self.metadata, self.available_update.as_deref());
            }
            UpdateStatus::Failed(reason) => log::warn!("Update check failed: {reason}"),
        }
    }
}
