//! Log output in the `[tool] LEVEL message` format.

use log::{Level, LevelFilter};
use std::fmt;
use std::io::Write;

/// Render one log line (without the trailing newline).
pub fn format_line(tool: &str, level: Level, args: &fmt::Arguments<'_>) -> String {
    format!("[{}] {} {}", tool, level, args)
}

/// Install the global logger. DEBUG is shown only in verbose mode.
pub fn init(tool: &str, verbose: bool) {
    let tool = tool.to_string();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(move |buf, record| {
            writeln!(buf, "{}", format_line(&tool, record.level(), record.args()))
        })
        .init();
}
