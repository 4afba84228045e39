use std::time::Duration;

use chrono::NaiveDateTime;

use crate::alarm::model::TargetTime;
use crate::time_provider::Clock;

/// Blocks until the clock's time of day reaches `target`, checking at most
/// every `poll_interval`. A target that has already passed today fires on the
/// first check. Returns the clock reading at which the target was reached.
pub fn wait_until<C, S>(
    clock: &C,
    target: TargetTime,
    poll_interval: Duration,
    mut sleep: S,
) -> NaiveDateTime
where
    C: Clock + ?Sized,
    S: FnMut(Duration),
{
    let due = target.as_naive_time();
    loop {
        let now = clock.now();
        let time_of_day = now.time();
        if time_of_day >= due {
            log::info!("target {target} reached at {}", now.format("%H:%M:%S"));
            return now;
        }

        let remaining = (due - time_of_day).to_std().unwrap_or(Duration::ZERO);
        let step = next_sleep(remaining, poll_interval);
        log::debug!(
            "waiting for {target}: {}s remaining, sleeping {}s",
            remaining.as_secs(),
            step.as_secs_f64()
        );
        sleep(step);
    }
}

/// Never oversleeps the deadline and never spins.
fn next_sleep(remaining: Duration, poll_interval: Duration) -> Duration {
    remaining
        .min(poll_interval)
        .max(Duration::from_millis(1))
}
