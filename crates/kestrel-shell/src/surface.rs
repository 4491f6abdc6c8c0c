//! Headless window surfaces
//!
//! Stand-in surfaces for frontends that render nothing. Each window runs
//! as a task that answers controller requests the way a real window
//! would: it reports what it shows and announces its own close.

use serde_json::json;

use kestrel_core::ipc::{SurfaceChannel, SurfaceRequest};
use kestrel_core::state::WindowSnapshot;
use kestrel_core::window::{WindowBackend, WindowSpec};

/// Backend that opens one headless surface task per window
#[derive(Debug, Default)]
pub struct HeadlessBackend;

impl HeadlessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl WindowBackend for HeadlessBackend {
    fn open_window(&mut self, spec: WindowSpec, channel: SurfaceChannel) {
        tokio::spawn(run_surface(spec, channel));
    }
}

/// What this surface reports when asked for state
///
/// Restored windows echo their snapshot, location windows describe the
/// location, blank windows have nothing worth saving.
fn capture(spec: &WindowSpec) -> Option<WindowSnapshot> {
    if let Some(snapshot) = &spec.restore {
        return Some(snapshot.clone());
    }
    spec.location
        .as_ref()
        .map(|location| WindowSnapshot::new(json!({ "location": location })))
}

async fn run_surface(spec: WindowSpec, mut channel: SurfaceChannel) {
    let id = channel.id();
    log::debug!("Surface {id} up");

    while let Some(request) = channel.next_request().await {
        match request {
            SurfaceRequest::CaptureState => channel.report_state(capture(&spec)),
            SurfaceRequest::Close => {
                log::debug!("Surface {id} closing");
                channel.closed();
                return;
            }
        }
    }
    log::debug!("Surface {id} disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::ipc::{surface_channel, AppEvent, AppHandle};

    fn open(backend: &mut HeadlessBackend, spec: WindowSpec, app: &AppHandle, id: u64) -> kestrel_core::window::WindowHandle {
        let (handle, channel) = surface_channel(id, app.clone());
        backend.open_window(spec, channel);
        handle
    }

    #[tokio::test]
    async fn test_restored_surface_echoes_snapshot() {
        let (app, mut events) = AppHandle::channel();
        let mut backend = HeadlessBackend::new();
        let snapshot = WindowSnapshot::new(json!({ "location": "a" }));
        let window = open(&mut backend, WindowSpec::restore(snapshot.clone()), &app, 1);

        assert!(window.send(SurfaceRequest::CaptureState));
        assert_eq!(
            events.recv().await,
            Some(AppEvent::StateReported {
                window: 1,
                snapshot: Some(snapshot),
            })
        );
    }

    #[tokio::test]
    async fn test_location_surface_reports_location() {
        let (app, mut events) = AppHandle::channel();
        let mut backend = HeadlessBackend::new();
        let window = open(&mut backend, WindowSpec::at("https://example.com"), &app, 2);

        assert!(window.send(SurfaceRequest::CaptureState));
        assert_eq!(
            events.recv().await,
            Some(AppEvent::StateReported {
                window: 2,
                snapshot: Some(WindowSnapshot::new(
                    json!({ "location": "https://example.com" })
                )),
            })
        );
    }

    #[tokio::test]
    async fn test_blank_surface_reports_nothing() {
        let (app, mut events) = AppHandle::channel();
        let mut backend = HeadlessBackend::new();
        let window = open(&mut backend, WindowSpec::blank(), &app, 3);

        assert!(window.send(SurfaceRequest::CaptureState));
        assert_eq!(
            events.recv().await,
            Some(AppEvent::StateReported {
                window: 3,
                snapshot: None,
            })
        );
    }

    #[tokio::test]
    async fn test_close_request_announces_close() {
        let (app, mut events) = AppHandle::channel();
        let mut backend = HeadlessBackend::new();
        let window = open(&mut backend, WindowSpec::blank(), &app, 4);

        assert!(window.send(SurfaceRequest::Close));
        assert_eq!(events.recv().await, Some(AppEvent::WindowClosed(4)));
    }
}
