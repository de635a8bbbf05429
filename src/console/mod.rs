//! Operator-facing terminal output: banner and countdown line.
//!
//! Structured events go through `tracing`; this module only draws the
//! human-oriented extras. Tests use [`SilentConsole`].

use std::io::Write;

const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Render seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub trait Console: Send + Sync {
    fn banner(&self);

    /// Redraw the countdown line with `remaining` seconds left.
    fn countdown_tick(&self, label: &str, remaining: u64);

    /// Erase the countdown line.
    fn countdown_clear(&self);
}

/// Draws on stderr so stdout stays clean for piping.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn banner(&self) {
        let version = env!("CARGO_PKG_VERSION");
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{CYAN}╔════════════════════════════════════════╗{RESET}");
        let _ = writeln!(err, "{CYAN}║        reward-harvester v{version:<14}║{RESET}");
        let _ = writeln!(err, "{CYAN}║  faucet → reward → bridge, every round ║{RESET}");
        let _ = writeln!(err, "{CYAN}╚════════════════════════════════════════╝{RESET}");
        let _ = writeln!(err);
    }

    fn countdown_tick(&self, label: &str, remaining: u64) {
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "{HIDE_CURSOR}{CLEAR_LINE}{label}: {YELLOW}{}{RESET}",
            format_hms(remaining)
        );
        let _ = err.flush();
    }

    fn countdown_clear(&self) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "{CLEAR_LINE}{SHOW_CURSOR}");
        let _ = err.flush();
    }
}

/// Draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentConsole;

impl Console for SilentConsole {
    fn banner(&self) {}

    fn countdown_tick(&self, _label: &str, _remaining: u64) {}

    fn countdown_clear(&self) {}
}
