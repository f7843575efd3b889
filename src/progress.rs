//! Synthetic upload progress.
//!
//! The value shown while an upload is running is cosmetic: it climbs on a timer
//! and has no relation to bytes actually sent.

use crate::session::SessionToken;
use crate::state::AppState;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;
use tracing::debug;

pub const TICK: Duration = Duration::from_millis(100);
const MIN_STEP: f64 = 5.0;
const MAX_STEP: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    #[default]
    Animated,
    /// No timers at all; cosmetic values jump straight to their end state.
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SyntheticProgress {
    value: f64,
}

impl SyntheticProgress {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_complete(&self) -> bool {
        self.value >= 100.0
    }

    pub fn advance(&mut self, step: f64) -> f64 {
        self.value = (self.value + step.max(0.0)).min(100.0);
        self.value
    }

    pub fn finish(&mut self) {
        self.value = 100.0;
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

pub fn random_step<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(MIN_STEP..MAX_STEP)
}

/// Ticks the session's progress until it completes or the upload identified
/// by `token` is no longer the current one.
pub fn spawn_progress(state: AppState, token: SessionToken) {
    if state.pacing == Pacing::Instant {
        return;
    }

    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut interval = tokio::time::interval(TICK);
        // The first tick of a tokio interval fires immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let step = random_step(&mut rng);
            let mut session = state.session.lock().await;
            if !session.advance_progress(token, step) {
                debug!(token = token.0, "progress ticker stopped");
                break;
            }
        }
    });
}
