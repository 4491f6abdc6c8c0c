//! kestrel - A session-restoring multi-window application shell
//!
//! This is the main entry point. It hands off to the shell frontend,
//! which owns the command line and the event loop.

fn main() {
    if let Err(e) = kestrel_shell::run() {
        eprintln!("kestrel: {e:#}");
        std::process::exit(1);
    }
}
