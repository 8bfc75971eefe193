//! Periodic progress output for a dispatcher run.
//!
//! The reporter never touches the counter itself; it subscribes to the
//! dispatcher's `watch` channel and stops once the sending side is dropped.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// One `[INFO] <n> jars processed` line per interval on stdout.
    #[default]
    Lines,
    /// An indicatif spinner updated on every completion.
    Bar,
    Silent,
}

#[derive(Debug, Clone)]
pub struct ProgressReporter {
    mode: ProgressMode,
    interval: Duration,
    noun: String,
}

impl ProgressReporter {
    pub fn new(mode: ProgressMode, interval: Duration) -> Self {
        Self {
            mode,
            interval: interval.max(Duration::from_millis(1)),
            noun: "jars".to_string(),
        }
    }

    pub fn silent() -> Self {
        Self::new(ProgressMode::Silent, Duration::from_secs(1))
    }

    /// What is being counted, e.g. `jars`.
    pub fn with_noun(mut self, noun: impl Into<String>) -> Self {
        self.noun = noun.into();
        self
    }

    /// Report the counter every interval until the sender is dropped.
    ///
    /// Returns the last value published.
    pub async fn watch(&self, mut rx: watch::Receiver<u64>) -> u64 {
        let bar = (self.mode == ProgressMode::Bar).then(|| self.spinner());

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.mode == ProgressMode::Lines {
                        println!("{} {}", "[INFO]".cyan(), self.message(*rx.borrow()));
                    }
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if let Some(bar) = &bar {
                        bar.set_message(self.message(*rx.borrow()));
                    }
                }
            }
        }

        let last = *rx.borrow();
        if let Some(bar) = bar {
            bar.finish_with_message(self.message(last));
        }
        last
    }

    fn message(&self, count: u64) -> String {
        format!("{} {} processed", count, self.noun)
    }

    fn spinner(&self) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(self.message(0));
        bar
    }
}
