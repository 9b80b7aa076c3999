//! Colored terminal output helpers.
//!
//! The `format_*` functions build the plain layout; the `print_*` functions
//! add styling and write it out. Status lines go to stdout, except warnings
//! and errors which go to stderr.

use owo_colors::OwoColorize;
use std::fmt::Display;

const KV_PAD_WIDTH: usize = 30;
const HEADER_PAD_WIDTH: usize = 10;

/// Format a key label padded with dots to a fixed total width.
#[must_use]
pub fn format_kv_label(key: &str) -> String {
    let pad = ".".repeat(KV_PAD_WIDTH.saturating_sub(key.len() + 2));
    format!("{key} {pad}:")
}

/// Format the indentation used for continuation lines of a KV slice.
#[must_use]
pub fn format_kv_indent() -> String {
    " ".repeat(KV_PAD_WIDTH)
}

/// Format a header label surrounded by `=` padding.
#[must_use]
pub fn format_header(label: &str) -> String {
    let pad = "=".repeat(HEADER_PAD_WIDTH);
    format!("{pad} {label} {pad}")
}

/// Print a bold key label followed by its value.
pub fn print_kv(key: &str, value: impl Display) {
    println!("{} {value}", format_kv_label(key).bold());
}

/// Print a key with several values. The first value shares the key's line,
/// the rest are indented to line up under it.
pub fn print_kv_slice<S: AsRef<str>>(key: &str, values: &[S]) {
    for (i, value) in values.iter().enumerate() {
        if i == 0 {
            println!("{} {}", format_kv_label(key).bold(), value.as_ref());
        } else {
            println!("{} {}", format_kv_indent(), value.as_ref());
        }
    }
}

/// Print a bold header label.
pub fn print_header(label: &str) {
    println!("{}", format_header(label).bold());
}

/// Print an info message.
pub fn print_info(msg: impl Display) {
    println!("{} {msg}", "[info]   ".blue().bold());
}

/// Print a success message.
pub fn print_success(msg: impl Display) {
    println!("{} {msg}", "[success]".green().bold());
}

/// Print a warning message.
pub fn print_warning(msg: impl Display) {
    eprintln!("{} {msg}", "[warning]".yellow().bold());
}

/// Print an error message.
pub fn print_error(msg: impl Display) {
    eprintln!("{} {msg}", "[error]  ".red().bold());
}

/// Print a fatal message.
///
/// Exiting is left to the caller so that destructors still run.
pub fn print_fatal(msg: impl Display) {
    eprintln!("{} {msg}", "[fatal]  ".red().bold());
}
