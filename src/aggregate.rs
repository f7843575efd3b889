use crate::models::{ChatAnalysisResult, Contributor, SummaryStats};
use std::time::Duration;

/// The service always reports a week; the daily average divides by this
/// regardless of how many dates came back.
pub const REPORTED_DAYS: u64 = 7;

pub const RAMP_DURATION: Duration = Duration::from_millis(1500);
pub const RAMP_TICK: Duration = Duration::from_millis(16);

pub fn summarize(result: &ChatAnalysisResult) -> SummaryStats {
    let total_messages = result
        .active_users_count
        .iter()
        .fold(0u64, |acc, count| acc.saturating_add(*count));
    let peak_activity = result.active_users_count.iter().copied().max().unwrap_or(0);

    SummaryStats {
        total_messages,
        active_users: result.active_users_four_days.len() as u64,
        peak_activity,
        average_daily: rounded_div(total_messages, REPORTED_DAYS),
    }
}

// Half-up rounding without going through floats.
fn rounded_div(numerator: u64, denominator: u64) -> u64 {
    numerator / denominator + u64::from(numerator % denominator * 2 >= denominator)
}

pub fn contributors(result: &ChatAnalysisResult) -> Vec<Contributor> {
    result
        .active_users_four_days
        .iter()
        .enumerate()
        .map(|(index, name)| Contributor {
            rank: index + 1,
            badge: format!("#{}", index + 1),
            name: name.clone(),
        })
        .collect()
}

/// Maps a final value and the time since it became known to the value on screen.
pub trait Animator: Send + Sync {
    fn frame(&self, target: u64, elapsed: Duration) -> u64;

    fn is_settled(&self, elapsed: Duration) -> bool;

    fn frame_stats(&self, target: &SummaryStats, elapsed: Duration) -> SummaryStats {
        SummaryStats {
            total_messages: self.frame(target.total_messages, elapsed),
            active_users: self.frame(target.active_users, elapsed),
            peak_activity: self.frame(target.peak_activity, elapsed),
            average_daily: self.frame(target.average_daily, elapsed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Animator for Immediate {
    fn frame(&self, target: u64, _elapsed: Duration) -> u64 {
        target
    }

    fn is_settled(&self, _elapsed: Duration) -> bool {
        true
    }
}

/// Counts up from zero in equal increments, one per tick, clamping at the target.
/// Once the nominal duration has passed the target is reported as is.
#[derive(Debug, Clone, Copy)]
pub struct LinearRamp {
    pub duration: Duration,
    pub tick: Duration,
}

impl Default for LinearRamp {
    fn default() -> Self {
        Self {
            duration: RAMP_DURATION,
            tick: RAMP_TICK,
        }
    }
}

impl LinearRamp {
    fn steps_per_run(&self) -> f64 {
        self.duration.as_secs_f64() / self.tick.as_secs_f64()
    }

    pub fn ticks_elapsed(&self, elapsed: Duration) -> u64 {
        (elapsed.as_millis() / self.tick.as_millis().max(1)) as u64
    }

    pub fn total_ticks(&self) -> u64 {
        self.steps_per_run().ceil() as u64
    }
}

impl Animator for LinearRamp {
    fn frame(&self, target: u64, elapsed: Duration) -> u64 {
        if self.is_settled(elapsed) {
            return target;
        }
        let increment = target as f64 / self.steps_per_run();
        let current = self.ticks_elapsed(elapsed) as f64 * increment;
        if current >= target as f64 {
            target
        } else {
            current.floor() as u64
        }
    }

    fn is_settled(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}
