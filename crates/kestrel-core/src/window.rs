//! Window identity and registry
//!
//! Tracks live window surfaces in creation order and carries the
//! controller-side request senders for them.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::ipc::{SurfaceChannel, SurfaceRequest};
use crate::state::WindowSnapshot;

/// Window identifier, unique for the lifetime of the process
pub type WindowId = u64;

/// Global window ID counter
static WINDOW_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique window ID
pub fn next_window_id() -> WindowId {
    WINDOW_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// What a window should show when it opens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSpec {
    /// Location to open, when one was asked for
    pub location: Option<String>,
    /// Saved state to restore, when resuming a previous session
    pub restore: Option<WindowSnapshot>,
}

impl WindowSpec {
    /// A window with nothing in particular to show
    pub fn blank() -> Self {
        Self::default()
    }

    /// A window opened at a location
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            restore: None,
        }
    }

    /// A window restoring saved state
    pub fn restore(snapshot: WindowSnapshot) -> Self {
        Self {
            location: None,
            restore: Some(snapshot),
        }
    }
}

/// Opens window surfaces on behalf of the controller
///
/// Frontends implement this. The controller hands over the surface side of
/// the window's channels and never touches the surface again except
/// through them.
pub trait WindowBackend {
    /// Bring up a surface for `spec`, wired to `channel`
    fn open_window(&mut self, spec: WindowSpec, channel: SurfaceChannel);
}

/// Controller-side handle to a live window surface
#[derive(Debug)]
pub struct WindowHandle {
    /// Unique window ID
    pub id: WindowId,
    requests: mpsc::UnboundedSender<SurfaceRequest>,
}

impl WindowHandle {
    pub(crate) fn new(id: WindowId, requests: mpsc::UnboundedSender<SurfaceRequest>) -> Self {
        Self { id, requests }
    }

    /// Send a request to this window's surface; false when the surface is gone
    pub fn send(&self, request: SurfaceRequest) -> bool {
        self.requests.send(request).is_ok()
    }
}

/// Live windows in creation order
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: Vec<WindowHandle>,
}

impl WindowRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly opened window
    pub fn register(&mut self, handle: WindowHandle) {
        log::trace!("registering window {}", handle.id);
        self.windows.push(handle);
    }

    /// Forget a window; returns false when the ID was not tracked
    pub fn remove(&mut self, id: WindowId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|w| w.id != id);
        if self.windows.len() < before {
            log::trace!("removed window {id}");
            true
        } else {
            false
        }
    }

    /// Number of live windows
    pub fn count(&self) -> usize {
        self.windows.len()
    }

    /// Whether no windows are open
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// IDs of all live windows, in creation order
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id).collect()
    }

    /// Send a request to one window; false when the window is unknown or gone
    pub fn send(&self, id: WindowId, request: SurfaceRequest) -> bool {
        match self.windows.iter().find(|w| w.id == id) {
            Some(handle) => handle.send(request),
            None => false,
        }
    }

    /// Send a request to every live window; returns the IDs it reached
    pub fn broadcast(&self, request: SurfaceRequest) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|w| w.send(request.clone()))
            .map(|w| w.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::{surface_channel, AppHandle};

    fn open(registry: &mut WindowRegistry, app: &AppHandle) -> (WindowId, SurfaceChannel) {
        let id = next_window_id();
        let (handle, channel) = surface_channel(id, app.clone());
        registry.register(handle);
        (id, channel)
    }

    #[test]
    fn test_window_id_generation() {
        let id1 = next_window_id();
        let id2 = next_window_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_register_and_remove() {
        let (app, _events) = AppHandle::channel();
        let mut registry = WindowRegistry::new();
        let (id, _channel) = open(&mut registry, &app);

        assert_eq!(registry.count(), 1);
        assert!(registry.remove(id));
        assert!(registry.is_empty());
        assert!(!registry.remove(id));
    }

    #[test]
    fn test_ids_in_creation_order() {
        let (app, _events) = AppHandle::channel();
        let mut registry = WindowRegistry::new();
        let (a, _ca) = open(&mut registry, &app);
        let (b, _cb) = open(&mut registry, &app);
        let (c, _cc) = open(&mut registry, &app);

        assert_eq!(registry.ids(), vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_live_surfaces() {
        let (app, _events) = AppHandle::channel();
        let mut registry = WindowRegistry::new();
        let (a, mut ca) = open(&mut registry, &app);
        let (_b, cb) = open(&mut registry, &app);
        drop(cb);

        assert_eq!(registry.broadcast(SurfaceRequest::CaptureState), vec![a]);
        assert_eq!(ca.next_request().await, Some(SurfaceRequest::CaptureState));
    }

    #[test]
    fn test_send_to_unknown_window() {
        let registry = WindowRegistry::new();
        assert!(!registry.send(9999, SurfaceRequest::Close));
    }
}
