//! Periodic job orchestration.
//!
//! # Responsibility
//! - Hold an explicit table of `(Trigger, job)` pairs.
//! - Run due jobs on the caller's thread, one after another.
//!
//! # Invariants
//! - Jobs never overlap: `run_pending` is sequential.
//! - A failing job is logged and rescheduled like a successful one.
//! - Missed firings are not replayed; a job that was due several times
//!   runs once and moves to its next future slot.

use crate::clock::Clock;
use chrono::{DateTime, Duration, Local, NaiveTime};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default sleep between `run_pending` passes.
pub const DEFAULT_TICK: std::time::Duration = std::time::Duration::from_secs(60);

pub type JobError = Box<dyn Error + Send + Sync>;
pub type JobFn = Box<dyn FnMut() -> Result<(), JobError> + Send>;

/// When a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every interval, first firing one interval after registration.
    Every(std::time::Duration),
    /// Once a day at local wall-clock time.
    DailyAt(NaiveTime),
}

impl Trigger {
    /// First firing strictly after `now`.
    pub fn next_after(&self, now: DateTime<Local>) -> DateTime<Local> {
        match self {
            Self::Every(interval) => {
                let step = Duration::from_std(*interval).unwrap_or_else(|_| Duration::days(1));
                now + step
            }
            Self::DailyAt(at) => next_daily(now, *at),
        }
    }
}

impl Display for Trigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Every(interval) => write!(f, "every {}s", interval.as_secs()),
            Self::DailyAt(at) => write!(f, "daily at {}", at.format("%H:%M")),
        }
    }
}

fn next_daily(now: DateTime<Local>, at: NaiveTime) -> DateTime<Local> {
    let mut date = now.date_naive();
    // Today, tomorrow, and one spare day in case a DST gap swallows `at`.
    for _ in 0..3 {
        if let Some(candidate) = date.and_time(at).and_local_timezone(Local).earliest() {
            if candidate > now {
                return candidate;
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    now + Duration::days(1)
}

struct Job {
    name: String,
    trigger: Trigger,
    next_run: DateTime<Local>,
    run: JobFn,
}

/// Clock-driven job table.
pub struct Orchestrator<C: Clock> {
    clock: C,
    jobs: Vec<Job>,
}

impl<C: Clock> Orchestrator<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            jobs: Vec::new(),
        }
    }

    /// Registers a job; its first firing is computed from the current time.
    pub fn add_job<F>(&mut self, name: impl Into<String>, trigger: Trigger, job: F) -> &mut Self
    where
        F: FnMut() -> Result<(), JobError> + Send + 'static,
    {
        let name = name.into();
        let next_run = trigger.next_after(self.clock.now());
        info!(
            "event=job_register module=scheduler status=ok job={} trigger={} next_run={}",
            name,
            trigger,
            next_run.to_rfc3339()
        );
        self.jobs.push(Job {
            name,
            trigger,
            next_run,
            run: Box::new(job),
        });
        self
    }

    /// `(name, next_run)` for every registered job, in registration order.
    pub fn schedule(&self) -> Vec<(String, DateTime<Local>)> {
        self.jobs
            .iter()
            .map(|job| (job.name.clone(), job.next_run))
            .collect()
    }

    /// Runs every due job in registration order. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        for job in self.jobs.iter_mut().filter(|job| job.next_run <= now) {
            match (job.run)() {
                Ok(()) => info!(
                    "event=job_run module=scheduler status=ok job={}",
                    job.name
                ),
                Err(err) => error!(
                    "event=job_run module=scheduler status=error job={} error={}",
                    job.name, err
                ),
            }
            job.next_run = job.trigger.next_after(self.clock.now());
            ran += 1;
        }
        ran
    }

    /// Runs pending jobs, then sleeps `tick`, forever.
    pub fn run(&mut self, tick: std::time::Duration) -> ! {
        info!(
            "event=scheduler_loop module=scheduler status=start jobs={} tick_secs={}",
            self.jobs.len(),
            tick.as_secs()
        );
        loop {
            self.run_pending();
            std::thread::sleep(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Orchestrator, Trigger};
    use crate::clock::ManualClock;
    use chrono::{Duration, Local, NaiveTime, TimeZone, Timelike};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_job(
        counter: &Arc<AtomicUsize>,
    ) -> impl FnMut() -> Result<(), super::JobError> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn daily_trigger_rolls_to_tomorrow_after_its_time() {
        let at = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let before = Local.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let after = Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();

        assert_eq!(Trigger::DailyAt(at).next_after(before).hour(), 9);
        assert_eq!(
            Trigger::DailyAt(at).next_after(before).date_naive(),
            before.date_naive()
        );
        assert_eq!(
            Trigger::DailyAt(at).next_after(after).date_naive(),
            after.date_naive().succ_opt().unwrap()
        );
    }

    #[test]
    fn run_pending_fires_due_jobs_once_per_slot() {
        let start = Local.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let interval = Arc::new(AtomicUsize::new(0));
        let daily = Arc::new(AtomicUsize::new(0));

        let mut orchestrator = Orchestrator::new(clock.clone());
        orchestrator
            .add_job(
                "poll",
                Trigger::Every(std::time::Duration::from_secs(30 * 60)),
                counter_job(&interval),
            )
            .add_job(
                "reminder",
                Trigger::DailyAt(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
                counter_job(&daily),
            );

        assert_eq!(orchestrator.run_pending(), 0);

        clock.advance(Duration::minutes(30));
        assert_eq!(orchestrator.run_pending(), 1);
        assert_eq!(orchestrator.run_pending(), 0);

        clock.advance(Duration::minutes(30));
        assert_eq!(orchestrator.run_pending(), 2);
        assert_eq!(interval.load(Ordering::SeqCst), 2);
        assert_eq!(daily.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_job_does_not_block_the_next_one() {
        let start = Local.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let after = Arc::new(AtomicUsize::new(0));
        let every_minute = Trigger::Every(std::time::Duration::from_secs(60));

        let mut orchestrator = Orchestrator::new(clock.clone());
        orchestrator
            .add_job("broken", every_minute, || Err("mailbox offline".into()))
            .add_job("after", every_minute, counter_job(&after));

        clock.advance(Duration::minutes(5));
        assert_eq!(orchestrator.run_pending(), 2);
        assert_eq!(after.load(Ordering::SeqCst), 1);

        let (_, next_run) = orchestrator.schedule().remove(0);
        assert_eq!(next_run, start + Duration::minutes(6));
    }
}
