/*!
 * Heartbeat reporter.
 *
 * Runs as its own task next to the scheduler and renders the latest
 * `SchedulerStatus` every interval, either as a timestamped log line or as an
 * indicatif progress bar. It only ever reads the watch channel, so a slow
 * terminal never holds up the scheduler.
 */

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app_config::{ProgressConfig, ProgressStyleKind};
use crate::scheduler::{Phase, SchedulerStatus};

/// Renders scheduler status at a fixed interval
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    style: ProgressStyleKind,
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(style: ProgressStyleKind, interval: Duration) -> Self {
        Self {
            style,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &ProgressConfig) -> Self {
        Self::new(config.style, Duration::from_millis(config.interval_ms))
    }

    /// Start the reporter task; `None` when reporting is off
    ///
    /// The task ends once the status reaches `Done` or the sender is dropped,
    /// and yields the number of heartbeats it emitted.
    pub fn spawn(self, status: watch::Receiver<SchedulerStatus>) -> Option<JoinHandle<usize>> {
        match self.style {
            ProgressStyleKind::Off => None,
            _ => Some(tokio::spawn(self.report(status))),
        }
    }

    async fn report(self, mut status: watch::Receiver<SchedulerStatus>) -> usize {
        let bar = match self.style {
            ProgressStyleKind::Bar => Some(create_progress_bar(status.borrow().total)),
            _ => None,
        };

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut beats = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = status.borrow_and_update().clone();
                    self.emit(&snapshot, bar.as_ref());
                    beats += 1;
                    if snapshot.phase == Phase::Done {
                        break;
                    }
                }
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = status.borrow_and_update().clone();
                    if snapshot.phase == Phase::Done {
                        self.emit(&snapshot, bar.as_ref());
                        beats += 1;
                        break;
                    }
                }
            }
        }

        if let Some(bar) = bar {
            bar.finish_with_message("done");
        }
        beats
    }

    fn emit(&self, snapshot: &SchedulerStatus, bar: Option<&ProgressBar>) {
        match bar {
            Some(bar) => {
                bar.set_length(snapshot.total as u64);
                bar.set_position(snapshot.cursor as u64);
                bar.set_message(snapshot.activity.clone());
            }
            None => info!("{}", heartbeat_line(snapshot)),
        }
    }
}

/// One heartbeat line: timestamp, phase, position and activity
pub fn heartbeat_line(snapshot: &SchedulerStatus) -> String {
    format!(
        "[{}] {} {}/{} {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        snapshot.phase,
        snapshot.cursor,
        snapshot.total,
        snapshot.activity
    )
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} folders ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}
