use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::timestamp::now_millis;

/// How often the loop polls for due tiers.
const POLL_PERIOD: Duration = Duration::from_secs(1);

/// The fixed interval buckets recurring jobs can be registered into.
/// A job belongs to exactly one tier for its lifetime; there is no
/// unregister operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    FiveSeconds,
    Minute,
    Hour,
    Day,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::FiveSeconds, Tier::Minute, Tier::Hour, Tier::Day];

    pub fn period_millis(self) -> u64 {
        match self {
            Tier::FiveSeconds => 5_000,
            Tier::Minute => 60_000,
            Tier::Hour => 3_600_000,
            Tier::Day => 86_400_000,
        }
    }

    fn index(self) -> usize {
        match self {
            Tier::FiveSeconds => 0,
            Tier::Minute => 1,
            Tier::Hour => 2,
            Tier::Day => 3,
        }
    }
}

pub type Job = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Default)]
struct TierSlot {
    jobs: Vec<Job>,
    // Epoch millis of the last firing. Starts at 0 so the first pass fires
    // immediately; the daemon sees a heartbeat right after startup.
    last_fired_ms: u64,
}

/// Single background execution loop shared by all recurring jobs.
///
/// One mutex guards the whole registry. It is held only while appending a
/// job or collecting the due ones, never across job execution, so a slow
/// job cannot block concurrent registration.
pub struct Scheduler {
    slots: Mutex<[TierSlot; 4]>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            slots: Mutex::new(Default::default()),
        }
    }

    /// Registers a recurring job. Execution order within a tier is
    /// registration order. Safe to call while the loop is firing.
    pub fn add_job(&self, tier: Tier, job: impl Fn() + Send + Sync + 'static) {
        let mut slots = lock_unpoisoned(&self.slots);
        slots[tier.index()].jobs.push(Arc::new(job));
    }

    /// One pass over the tiers at wall-clock `now_ms`. Fires every tier
    /// whose period has elapsed, at most once per tier regardless of how
    /// many periods went by (no catch-up burst). Returns the number of jobs
    /// executed.
    ///
    /// The last-fired time is advanced *before* the jobs run, so a slow job
    /// delays only the detection of later tiers within this same pass.
    pub fn run_due(&self, now_ms: u64) -> usize {
        let mut due: Vec<Job> = Vec::new();
        {
            let mut slots = lock_unpoisoned(&self.slots);
            for tier in Tier::ALL {
                let slot = &mut slots[tier.index()];
                // saturating_sub absorbs clock regressions; last_fired_ms
                // never moves backwards.
                if now_ms.saturating_sub(slot.last_fired_ms) >= tier.period_millis() {
                    slot.last_fired_ms = now_ms;
                    due.extend(slot.jobs.iter().cloned());
                }
            }
        }

        for job in &due {
            // A faulty job must not take the loop down or starve the rest.
            if catch_unwind(AssertUnwindSafe(|| job())).is_err() {
                tracing::warn!("scheduled job panicked; continuing with remaining jobs");
            }
        }
        due.len()
    }

    /// The background loop. Runs for the remaining life of the process;
    /// there is no stop operation.
    pub async fn run(self: Arc<Self>) {
        let mut cadence = tokio::time::interval(POLL_PERIOD);
        cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            cadence.tick().await;
            self.run_due(now_millis());
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        // A job panic can never poison this mutex (jobs run outside the
        // lock), but don't let a poisoned registry kill the loop either.
        Err(poisoned) => poisoned.into_inner(),
    }
}
