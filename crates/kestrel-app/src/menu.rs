//! Application menu model
//!
//! Platform-free menu template. Frontends render it however they render
//! menus; this side only decides what belongs in it.

use crate::meta::AppMetadata;

/// Action attached to a menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewWindow,
    CloseWindow,
    Quit,
    CheckForUpdates,
    About,
}

/// One entry in a menu
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Display label
    pub label: String,
    /// Action fired on selection (None for submenu headers)
    pub action: Option<MenuAction>,
    /// Child items (empty for leaf entries)
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    fn leaf(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action: Some(action),
            children: Vec::new(),
        }
    }

    fn submenu(label: impl Into<String>, children: Vec<MenuItem>) -> Self {
        Self {
            label: label.into(),
            action: None,
            children,
        }
    }
}

/// The application menu
#[derive(Debug, Clone)]
pub struct AppMenu {
    /// Top-level entries
    pub items: Vec<MenuItem>,
}

impl AppMenu {
    /// Find the first item carrying `action`
    pub fn find(&self, action: MenuAction) -> Option<&MenuItem> {
        fn walk(items: &[MenuItem], action: MenuAction) -> Option<&MenuItem> {
            for item in items {
                if item.action == Some(action) {
                    return Some(item);
                }
                if let Some(found) = walk(&item.children, action) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.items, action)
    }
}

/// Create the application menu model
///
/// When an update is known to be available, the Help entry says so instead
/// of offering another check.
pub fn create_menu_model(metadata: &AppMetadata, available_update: Option<&str>) -> AppMenu {
    let file_menu = vec![
        MenuItem::leaf("New Window", MenuAction::NewWindow),
        MenuItem::leaf("Close Window", MenuAction::CloseWindow),
        MenuItem::leaf("Quit", MenuAction::Quit),
    ];

    let update_label = match available_update {
        Some(version) => format!("Update to {version}..."),
        None => "Check for Updates...".to_string(),
    };

    let help_menu = vec![
        MenuItem::leaf(update_label, MenuAction::CheckForUpdates),
        MenuItem::leaf(
            format!("About {} {}", metadata.name, metadata.version),
            MenuAction::About,
        ),
    ];

    AppMenu {
        items: vec![
            MenuItem::submenu("File", file_menu),
            MenuItem::submenu("Help", help_menu),
        ],
    }
}
