//! Display primitives shared by CLI command output.

pub mod colors;
pub mod table;

pub use colors::colorize_status;
pub use table::{list_table, render_list};
