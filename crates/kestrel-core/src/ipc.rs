//! Channel plumbing between the controller and window surfaces
//!
//! Requests flow controller to surface over a per-window pipe; everything
//! coming back shares one application inbox. Sends are fire-and-forget: a
//! missing receiver means the other side is already gone.

use tokio::sync::mpsc;

use crate::state::WindowSnapshot;
use crate::window::{WindowHandle, WindowId, WindowSpec};

/// Request sent from the controller to one window surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceRequest {
    /// Report current state for persistence
    CaptureState,
    /// Close the window
    Close,
}

/// Result of an update check, posted back to the application inbox
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateStatus {
    /// Already on the newest version
    UpToDate,
    /// A newer version is available
    Available {
        /// Version string of the newer release
        version: String,
    },
    /// The check itself failed
    Failed(String),
}

/// Event delivered to the application inbox
#[derive(Debug, PartialEq)]
pub enum AppEvent {
    /// A surface answered a capture request; `None` means it had nothing
    /// worth saving
    StateReported {
        window: WindowId,
        snapshot: Option<WindowSnapshot>,
    },
    /// A window surface is gone
    WindowClosed(WindowId),
    /// Someone asked the application to exit
    TerminateRequested,
    /// The application was activated with no particular target
    Activated,
    /// Open a new window
    OpenWindow(WindowSpec),
    /// Run an update check now
    CheckForUpdates,
    /// An update check finished
    UpdateStatus(UpdateStatus),
}

/// Cloneable handle for posting events to the application
#[derive(Debug, Clone)]
pub struct AppHandle {
    events: mpsc::UnboundedSender<AppEvent>,
}

impl AppHandle {
    /// Create the application inbox and a handle feeding it
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, inbox) = mpsc::unbounded_channel();
        (Self { events }, inbox)
    }

    /// Post an event to the inbox
    pub fn send(&self, event: AppEvent) {
        let _ = self.events.send(event);
    }

    /// Ask the application to begin shutting down
    pub fn request_terminate(&self) {
        self.send(AppEvent::TerminateRequested);
    }

    /// Open a new window
    pub fn open_window(&self, spec: WindowSpec) {
        self.send(AppEvent::OpenWindow(spec));
    }

    /// Signal activation with no windows to show for it
    pub fn activated(&self) {
        self.send(AppEvent::Activated);
    }

    /// Ask for an update check
    pub fn check_for_updates(&self) {
        self.send(AppEvent::CheckForUpdates);
    }
}

/// Surface-side endpoint of one window's channels
pub struct SurfaceChannel {
    id: WindowId,
    requests: mpsc::UnboundedReceiver<SurfaceRequest>,
    app: AppHandle,
}

impl SurfaceChannel {
    /// This window's ID
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Next request from the controller; `None` once the application side
    /// has gone away
    pub async fn next_request(&mut self) -> Option<SurfaceRequest> {
        self.requests.recv().await
    }

    /// Answer a capture request; sender identity travels with the report
    pub fn report_state(&self, snapshot: Option<WindowSnapshot>) {
        self.app.send(AppEvent::StateReported {
            window: self.id,
            snapshot,
        });
    }

    /// Announce that this window is closing
    ///
    /// Consumes the endpoint, so a surface can announce its close at most
    /// once.
    pub fn closed(self) {
        self.app.send(AppEvent::WindowClosed(self.id));
    }

    /// Handle for application-level requests
    pub fn app(&self) -> &AppHandle {
        &self.app
    }
}

/// Wire up a new window: controller-side handle plus surface-side endpoint
pub fn surface_channel(id: WindowId, app: AppHandle) -> (WindowHandle, SurfaceChannel) {
    let (requests_tx, requests_rx) = mpsc::unbounded_channel();
    (
        WindowHandle::new(id, requests_tx),
        SurfaceChannel {
            id,
            requests: requests_rx,
            app,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_state_report_carries_sender_id() {
        let (app, mut inbox) = AppHandle::channel();
        let (_handle, channel) = surface_channel(7, app);

        channel.report_state(Some(WindowSnapshot::new(json!({"location": "a"}))));

        match inbox.recv().await {
            Some(AppEvent::StateReported { window, snapshot }) => {
                assert_eq!(window, 7);
                assert_eq!(snapshot, Some(WindowSnapshot::new(json!({"location": "a"}))));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closed_announces_window_id() {
        let (app, mut inbox) = AppHandle::channel();
        let (_handle, channel) = surface_channel(3, app);

        channel.closed();

        assert_eq!(inbox.recv().await, Some(AppEvent::WindowClosed(3)));
    }

    #[tokio::test]
    async fn test_request_pipe_round_trip() {
        let (app, _inbox) = AppHandle::channel();
        let (handle, mut channel) = surface_channel(1, app);

        assert!(handle.send(SurfaceRequest::CaptureState));
        assert!(handle.send(SurfaceRequest::Close));

        assert_eq!(channel.next_request().await, Some(SurfaceRequest::CaptureState));
        assert_eq!(channel.next_request().await, Some(SurfaceRequest::Close));
    }

    #[test]
    fn test_send_after_inbox_dropped_is_ignored() {
        let (app, inbox) = AppHandle::channel();
        drop(inbox);

        app.request_terminate();
        app.activated();
    }

    #[tokio::test]
    async fn test_next_request_ends_when_handle_dropped() {
        let (app, _inbox) = AppHandle::channel();
        let (handle, mut channel) = surface_channel(2, app);
        drop(handle);

        assert_eq!(channel.next_request().await, None);
    }
}
