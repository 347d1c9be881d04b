use std::future::Future;

use chrono::{DateTime, Datelike, Local, NaiveTime, Weekday};
use tokio::task::JoinHandle;
use tracing::debug;

/// A recurring wall-clock firing time for a housekeeping job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily { hour: u32, minute: u32 },
    Weekly { weekday: Weekday, hour: u32, minute: u32 },
}

impl Schedule {
    pub fn daily(hour: u32, minute: u32) -> Self {
        Schedule::Daily { hour, minute }
    }

    pub fn weekly(weekday: Weekday, hour: u32, minute: u32) -> Self {
        Schedule::Weekly {
            weekday,
            hour,
            minute,
        }
    }

    /// The next firing strictly after `after`.
    ///
    /// A day whose wall-clock time does not exist (DST spring-forward gap)
    /// is skipped rather than approximated.
    pub fn next_after(&self, after: DateTime<Local>) -> DateTime<Local> {
        let (hour, minute) = match *self {
            Schedule::Daily { hour, minute } => (hour, minute),
            Schedule::Weekly { hour, minute, .. } => (hour, minute),
        };
        let time = NaiveTime::from_hms_opt(hour, minute, 0).expect("valid wall-clock time");

        let mut date = after.date_naive();
        loop {
            let day_matches = match *self {
                Schedule::Daily { .. } => true,
                Schedule::Weekly { weekday, .. } => date.weekday() == weekday,
            };

            if day_matches {
                if let Some(at) = date.and_time(time).and_local_timezone(Local).earliest() {
                    if at > after {
                        return at;
                    }
                }
            }

            date = date.succ_opt().expect("date out of range");
        }
    }
}

/// Run `job` on the given schedule until the returned handle is aborted.
///
/// The loop recomputes the next firing after every run, so a job that takes
/// a while simply pushes its next occurrence out; runs never overlap.
pub fn spawn<F, Fut>(name: &'static str, schedule: Schedule, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = schedule.next_after(now);
            let wait = (next - now).to_std().unwrap_or_default();
            debug!(task = name, at = %next, "next run scheduled");
            tokio::time::sleep(wait).await;
            job().await;
        }
    })
}
