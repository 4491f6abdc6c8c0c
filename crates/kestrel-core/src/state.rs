//! Application state model
//!
//! Serializable whole-application state: the per-window snapshots captured
//! at the last shutdown plus residual values owned by other subsystems.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current serialization format for persisted application state
pub const FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// Opaque per-window state reported by a surface
///
/// The payload belongs to the surface that produced it; the lifecycle side
/// only moves it around and persists it. Serialized transparently, so the
/// session file's window list is a plain array of payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowSnapshot {
    /// Payload owned by the surface that produced it
    pub payload: Value,
}

impl WindowSnapshot {
    /// Wrap a surface payload
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

/// Whole-application state (serializable for persistence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Serialization format version
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Per-window snapshots captured at the last shutdown, in arrival order
    #[serde(default)]
    pub windows: Vec<WindowSnapshot>,
    /// Application-level values owned by other subsystems, carried through
    /// persist and restore untouched
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            windows: Vec::new(),
            values: Map::new(),
        }
    }
}

impl AppState {
    /// Drain the saved window snapshots, leaving the residual state behind
    pub fn take_windows(&mut self) -> Vec<WindowSnapshot> {
        std::mem::take(&mut self.windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert_eq!(state.format_version, FORMAT_VERSION);
        assert!(state.windows.is_empty());
        assert!(state.values.is_empty());
    }

    #[test]
    fn test_take_windows_leaves_residual() {
        let mut state = AppState::default();
        state.windows.push(WindowSnapshot::new(json!({"location": "a"})));
        state.values.insert("theme".into(), json!("dark"));

        let windows = state.take_windows();
        assert_eq!(windows.len(), 1);
        assert!(state.windows.is_empty());
        assert_eq!(state.values.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_snapshot_serializes_transparently() {
        let state = AppState {
            windows: vec![
                WindowSnapshot::new(json!({"location": "a"})),
                WindowSnapshot::new(json!({"location": "b"})),
            ],
            ..Default::default()
        };

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["windows"][0], json!({"location": "a"}));
        assert_eq!(value["windows"][1]["location"], json!("b"));
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let state: AppState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.format_version, FORMAT_VERSION);
        assert!(state.windows.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut state = AppState::default();
        state.windows.push(WindowSnapshot::new(json!({"tabs": [1, 2]})));
        state.values.insert("visits".into(), json!(42));

        let text = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&text).unwrap();
        assert_eq!(back, state);
    }
}
