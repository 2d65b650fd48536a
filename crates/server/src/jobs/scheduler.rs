//! In-process timer for the weekly email pass.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use super::weekly_emails::{last_weekly_run, process_weekly_emails};
use crate::AppState;

/// Run [`process_weekly_emails`] every `period` until `shutdown` flips.
///
/// The first pass is due one `period` after the last recorded run, so
/// restarts neither skip nor repeat a cycle. With no recorded run it starts
/// right away.
pub async fn run_scheduler(
    state: AppState,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let first = first_delay(last_weekly_run(&state.db), period, Utc::now());
    info!(
        every_secs = period.as_secs(),
        first_in_secs = first.as_secs(),
        "weekly email scheduler started"
    );
    let mut tick = interval_at(Instant::now() + first, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                if let Err(e) = process_weekly_emails(&state, Utc::now()).await {
                    error!("weekly email pass failed: {e:#}");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("weekly email scheduler stopped");
}

/// Time until the next pass is due, given when the last one ran.
pub fn first_delay(
    last_run: Option<DateTime<Utc>>,
    period: Duration,
    now: DateTime<Utc>,
) -> Duration {
    let Some(last_run) = last_run else {
        return Duration::ZERO;
    };
    let Ok(step) = chrono::Duration::from_std(period) else {
        return period;
    };
    // A negative remainder means the pass is overdue.
    (last_run + step - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
        .min(period)
}

/// Scheduler period for `hours`, or `None` when the loop is disabled.
pub fn period_from_hours(hours: u64) -> Option<Duration> {
    (hours > 0).then(|| Duration::from_secs(hours.saturating_mul(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: Duration = Duration::from_secs(168 * 3600);

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn zero_hours_disables_the_loop() {
        assert_eq!(period_from_hours(0), None);
        assert_eq!(period_from_hours(168), Some(WEEK));
    }

    #[test]
    fn first_pass_runs_immediately_without_history() {
        assert_eq!(first_delay(None, WEEK, at("2026-03-10T09:00:00Z")), Duration::ZERO);
    }

    #[test]
    fn restart_keeps_the_weekly_cadence() {
        let last = Some(at("2026-03-08T09:00:00Z"));
        // Two days into the cycle: five days left.
        assert_eq!(
            first_delay(last, WEEK, at("2026-03-10T09:00:00Z")),
            Duration::from_secs(5 * 24 * 3600)
        );
        // Past due: run now.
        assert_eq!(
            first_delay(last, WEEK, at("2026-03-20T09:00:00Z")),
            Duration::ZERO
        );
        // A clock that moved backwards never waits more than one period.
        assert_eq!(first_delay(last, WEEK, at("2026-03-01T09:00:00Z")), WEEK);
    }
}
