//! kestrel-core: Application lifecycle model for kestrel
//!
//! This crate provides the building blocks the lifecycle controller is
//! assembled from:
//! - Serializable application and per-window state
//! - Window identity, the live-window registry, and the backend seam
//! - Channel plumbing between the controller and window surfaces

pub mod ipc;
pub mod state;
pub mod window;

pub use ipc::{surface_channel, AppEvent, AppHandle, SurfaceChannel, SurfaceRequest, UpdateStatus};
pub use state::{AppState, WindowSnapshot, FORMAT_VERSION};
pub use window::{
    next_window_id, WindowBackend, WindowHandle, WindowId, WindowRegistry, WindowSpec,
};
