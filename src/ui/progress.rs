//! Load progress with CI fallback

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressStyle};

/// Counts finished loads in a round
///
/// Shows an indicatif bar in interactive mode and stays silent otherwise;
/// the per-slot report printed afterwards covers plain output.
pub struct LoadProgress {
    bar: Option<ProgressBar>,
}

impl LoadProgress {
    pub fn new(ctx: &UiContext, label: &str, total: usize) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .progress_chars("━╸─"),
                );
            }
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            bar
        });
        Self { bar }
    }

    /// Record one finished load
    pub fn finished(&self, url: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(url.to_string());
            bar.inc(1);
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
