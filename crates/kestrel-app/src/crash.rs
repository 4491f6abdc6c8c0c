//! Crash detection
//!
//! A sentinel file in the profile directory marks a running instance.
//! Finding one already there at startup means the previous run never
//! reached its clean shutdown. That fact is logged and kept available so
//! interested parties can react to it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sentinel file name inside the profile directory
const SENTINEL_FILE: &str = "running";

/// Watches for unclean exits across runs
#[derive(Debug)]
pub struct CrashHerald {
    sentinel: PathBuf,
    previous_run_crashed: bool,
}

impl CrashHerald {
    /// Install the sentinel for this run, noting whether the previous run
    /// left one behind
    pub fn init(profile_dir: &Path) -> io::Result<Self> {
        let sentinel = profile_dir.join(SENTINEL_FILE);

        let mut previous_run_crashed = false;
        match fs::symlink_metadata(&sentinel) {
            Ok(meta) if meta.is_symlink() => {
                // Never write through a planted symlink
                log::warn!("Sentinel path is a symlink, replacing it");
                fs::remove_file(&sentinel)?;
            }
            Ok(_) => {
                previous_run_crashed = true;
                let detail = fs::read_to_string(&sentinel).unwrap_or_default();
                log::warn!(
                    "Previous run exited uncleanly (sentinel left by PID {})",
                    detail.trim()
                );
            }
            Err(_) => {}
        }

        if let Some(parent) = sentinel.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&sentinel, format!("{}\n", std::process::id()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&sentinel, perms);
        }

        Ok(Self {
            sentinel,
            previous_run_crashed,
        })
    }

    /// Whether the previous run died without cleaning up
    pub fn previous_run_crashed(&self) -> bool {
        self.previous_run_crashed
    }

    /// Remove the sentinel; this run is ending on its own terms
    pub fn mark_clean_exit(&self) -> io::Result<()> {
        match fs::symlink_metadata(&self.sentinel) {
            Ok(meta) if meta.is_symlink() => {
                log::warn!("Sentinel path is a symlink, refusing to remove");
                Ok(())
            }
            Ok(_) => fs::remove_file(&self.sentinel),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
