//! kestrel-app: Platform-independent application logic for kestrel
//!
//! Everything between the windowing frontend and the disk: configuration,
//! session persistence, the lifecycle controller and its shutdown
//! protocol, update checks, and crash detection.

pub mod config;
pub mod controller;
pub mod crash;
pub mod menu;
pub mod meta;
pub mod shutdown;
pub mod startup;
pub mod store;
pub mod updater;

pub use config::{default_profile_dir, load_config, save_config, Config, ConfigError};
pub use controller::{AppReady, LifecycleController, ShutdownReport};
pub use crash::CrashHerald;
pub use menu::{create_menu_model, AppMenu, MenuAction, MenuItem};
pub use meta::{AppMetadata, MetadataError};
pub use shutdown::{ShutdownBarrier, ShutdownPhase};
pub use startup::{load_initial_state, RunMode};
pub use store::{DiskStore, MemoryStore, SessionStore, StoreError};
pub use updater::{UpdateChecker, UpdateError, UpdateInfo};
