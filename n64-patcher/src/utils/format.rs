//! Formatting utilities

use console::style;
use humansize::{BINARY, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Format an image offset as fixed-width hex
pub fn format_offset(offset: u64) -> String {
    format!("0x{offset:08X}")
}

/// Green check mark followed by `message`
pub fn pass_line(message: &str) -> String {
    format!("{} {message}", style("✓").green())
}

/// Red cross followed by `message`
pub fn fail_line(message: &str) -> String {
    format!("{} {message}", style("✗").red())
}
