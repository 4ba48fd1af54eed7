//! Per-repository spinners for the parallel commands

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use ngm_git::TaskObserver;
use std::time::Duration;

/// One spinner line per repository, driven by [`TaskObserver`] callbacks
pub struct Spinners {
    multi: MultiProgress,
    bars: Vec<ProgressBar>,
    labels: Vec<String>,
}

impl Spinners {
    /// Spinners for `labels`, drawn on stderr when `visible`
    pub fn new(labels: Vec<String>, visible: bool) -> Self {
        let multi = if visible {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bars = labels
            .iter()
            .map(|label| {
                let bar = multi.add(ProgressBar::new_spinner());
                bar.set_style(style.clone());
                bar.set_message(format!("{label} (waiting)"));
                bar
            })
            .collect();

        Spinners {
            multi,
            bars,
            labels,
        }
    }

    /// Remove every line so command output starts on a clean terminal
    pub fn clear(&self) {
        if let Err(e) = self.multi.clear() {
            tracing::debug!(error = %e, "failed to clear progress lines");
        }
    }

    #[cfg(test)]
    fn bar(&self, index: usize) -> &ProgressBar {
        &self.bars[index]
    }
}

impl TaskObserver for Spinners {
    fn started(&self, index: usize) {
        if let (Some(bar), Some(label)) = (self.bars.get(index), self.labels.get(index)) {
            bar.set_message(label.clone());
            bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    fn finished(&self, index: usize, ok: bool) {
        if let (Some(bar), Some(label)) = (self.bars.get(index), self.labels.get(index)) {
            let mark = if ok { "✔" } else { "✗" };
            bar.finish_with_message(format!("{mark} {label}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lifecycle() {
        let spinners = Spinners::new(vec!["a".into(), "b".into()], false);
        assert_eq!(spinners.bar(0).message(), "a (waiting)");

        spinners.started(0);
        assert_eq!(spinners.bar(0).message(), "a");
        spinners.finished(0, true);
        spinners.finished(1, false);

        assert!(spinners.bar(0).is_finished());
        assert_eq!(spinners.bar(0).message(), "✔ a");
        assert_eq!(spinners.bar(1).message(), "✗ b");
        spinners.clear();
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let spinners = Spinners::new(vec!["a".into()], false);
        spinners.started(5);
        spinners.finished(5, true);
        assert!(!spinners.bar(0).is_finished());
    }
}
