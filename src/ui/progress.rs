//! Download progress with CI fallback

use indicatif::{ProgressBar, ProgressBarIter, ProgressStyle};
use std::io::Read;
use std::time::Duration;

/// Byte progress for the bootstrap archive download.
///
/// A bar when the length is known, a spinner otherwise, hidden entirely
/// when output is not interactive.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    pub fn new(visible: bool, total: Option<u64>) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar().template(
                    "  {spinner:.green} Downloading  {bar:24.green/dim} {bytes}/{total_bytes} {elapsed:.dim}",
                ) {
                    bar.set_style(style.progress_chars("━╸─"));
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("  {spinner:.green} Downloading {bytes}")
                {
                    bar.set_style(style);
                }
                bar
            }
        };
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar }
    }

    /// Track bytes read through `reader`
    pub fn wrap<R: Read>(&self, reader: R) -> ProgressBarIter<R> {
        self.bar.wrap_read(reader)
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}
