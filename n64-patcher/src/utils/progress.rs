//! Progress indicator utilities

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for indeterminate progress
///
/// Hidden when `quiet` is set so scripted runs only see results.
pub fn create_spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
