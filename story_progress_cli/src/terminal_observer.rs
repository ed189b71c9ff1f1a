use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use story_progress_core::{render, ProgressObserver, UiState};

/// Renders the story's progress as a single indicatif bar.
///
/// The bar ticks while an upload or save is in flight, shows the retry
/// prompt after a failed save, and is finished or abandoned by the host
/// once replay ends.
#[derive(Clone)]
pub struct TerminalProgressObserver {
    bar: ProgressBar,
}

impl TerminalProgressObserver {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        Self { bar }
    }

    /// Leave the bar in its final shape for `state`.
    pub fn finish(&self, state: &UiState) {
        let view = render(state, |_| ());
        self.bar.set_position(view.progress_percent.round() as u64);
        if state.is_upload_failed {
            self.bar.abandon_with_message("upload failed");
        } else if let Some(prompt) = view.retry_prompt {
            self.bar.abandon_with_message(prompt.replace('\n', " "));
        } else {
            self.bar.finish_with_message("done");
        }
    }
}

impl ProgressObserver for TerminalProgressObserver {
    fn on_state_changed(&self, state: &UiState) {
        let view = render(state, |content| {
            if content.is_upload_in_progress {
                "uploading"
            } else if content.is_save_in_progress {
                "saving"
            } else if content.is_save_failed || content.is_upload_failed {
                "failed"
            } else {
                "idle"
            }
        });

        self.bar.set_position(view.progress_percent.round() as u64);
        if view.show_spinner {
            self.bar.enable_steady_tick(Duration::from_millis(100));
        } else {
            self.bar.disable_steady_tick();
        }
        match view.retry_prompt {
            Some(prompt) => self.bar.set_message(prompt.replace('\n', " ")),
            None => self.bar.set_message(view.content),
        }
    }
}
