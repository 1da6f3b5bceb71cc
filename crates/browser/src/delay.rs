use agent_core::config::DelayRange;
use rand::Rng;
use std::time::Duration;

/// Picks a duration uniformly from `range`. A reversed or negative range is clamped.
pub fn pick_delay(range: &DelayRange) -> Duration {
    let min = range.min_secs.max(0.0);
    let max = range.max_secs.max(min);
    if max <= min {
        return Duration::from_secs_f64(min);
    }
    let secs = rand::thread_rng().gen_range(min..=max);
    Duration::from_secs_f64(secs)
}

pub async fn random_delay(range: &DelayRange) {
    let delay = pick_delay(range);
    if !delay.is_zero() {
        log::debug!("Sleeping for {:.2}s", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}
