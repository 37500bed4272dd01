//! Console output: one line per provisioning step and a byte progress bar
//! for downloads.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use multipy::fetch::ProgressCallback;
use multipy::provision::ProvisionProgressCallback;
use multipy::ProvisionStage;

const BAR_TEMPLATE: &str =
    "  {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Format a step line, e.g. `==> Installing 3.13-t`.
pub fn format_step(message: &str) -> String {
    format!("==> {}", message)
}

/// Print a step line.
pub fn step(stage: ProvisionStage, message: &str) {
    let line = format_step(message);
    match stage {
        ProvisionStage::Complete => println!("{}", style(line).green().bold()),
        _ => println!("{}", style(line).bold()),
    }
}

/// A hidden download bar; it appears once bytes start flowing.
pub fn download_bar() -> ProgressBar {
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

/// Byte progress callback driving `bar`.
pub fn byte_progress(bar: ProgressBar) -> ProgressCallback {
    Box::new(move |done, total| {
        if total > 0 {
            bar.set_length(total);
        }
        bar.set_position(done);
        if total > 0 && done >= total {
            bar.finish_and_clear();
        }
    })
}

/// Step callback that prints each step and resets `bar` before downloads.
pub fn step_printer(bar: ProgressBar) -> ProvisionProgressCallback {
    Box::new(move |stage: ProvisionStage, message: &str| {
        if stage == ProvisionStage::Downloading {
            bar.reset();
        } else if !bar.is_finished() {
            bar.finish_and_clear();
        }
        bar.suspend(|| step(stage, message));
    })
}
