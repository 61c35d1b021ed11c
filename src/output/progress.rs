//! Busy spinner driven by the orchestrator's busy signal.

use crate::pipeline::Phase;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spinner shown on stderr while a classification is in flight.
///
/// Stops when dropped.
pub struct BusySpinner {
    task: Option<JoinHandle<()>>,
}

impl BusySpinner {
    /// Follow `busy` and label the spinner with the current `phase`.
    ///
    /// Must be called from within a tokio runtime when `enabled`.
    pub fn start(
        mut busy: watch::Receiver<bool>,
        mut phase: watch::Receiver<Phase>,
        enabled: bool,
    ) -> Self {
        if !enabled {
            return Self { task: None };
        }

        let task = tokio::spawn(async move {
            let mut bar: Option<ProgressBar> = None;
            loop {
                tokio::select! {
                    changed = busy.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let is_busy = *busy.borrow_and_update();
                        if is_busy && bar.is_none() {
                            bar = Some(create_spinner(*phase.borrow()));
                        } else if !is_busy && let Some(b) = bar.take() {
                            b.finish_and_clear();
                        }
                    }
                    changed = phase.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let current = *phase.borrow_and_update();
                        if let Some(b) = &bar {
                            b.set_message(current.to_string());
                        }
                    }
                }
            }
            if let Some(b) = bar {
                b.finish_and_clear();
            }
        });

        Self { task: Some(task) }
    }
}

impl Drop for BusySpinner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn create_spinner(phase: Phase) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(phase.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
