//! Status color mapping for CLI output.
//!
//! `console` disables styling when stdout is not a terminal or `NO_COLOR` is set.

use console::{style, StyledObject};

/// Styled rendering of a schedule status or session state.
pub fn colorize_status(status: &str) -> StyledObject<&str> {
    match status.to_lowercase().as_str() {
        "scheduled" | "update_ready" => style(status).green().bold(),
        "create_ready" => style(status).blue(),
        "not scheduled" => style(status).dim(),
        "drifted" | "load_failed" => style(status).red().bold(),
        _ => style(status),
    }
}
