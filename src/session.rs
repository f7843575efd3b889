use crate::aggregate::{contributors, summarize, Animator, Immediate, LinearRamp};
use crate::chart::build_chart;
use crate::models::{AnimationSpec, ChatAnalysisResult, SummaryStats, ViewKind, ViewSnapshot};
use crate::progress::{Pacing, SyntheticProgress};
use crate::transfer::TransferError;
use crate::upload::InputRejection;
use chrono::{DateTime, Local};
use std::{fmt, time::Instant};
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Identifies one upload attempt. Outcomes carrying an older token are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(pub u64);

#[derive(Debug, Clone)]
pub enum ViewState {
    Idle,
    Uploading {
        token: SessionToken,
    },
    Error {
        message: String,
    },
    Loaded {
        result: ChatAnalysisResult,
        summary: SummaryStats,
        loaded_at: Instant,
        analyzed_at: DateTime<Local>,
    },
}

impl ViewState {
    pub fn kind(&self) -> ViewKind {
        match self {
            Self::Idle => ViewKind::Idle,
            Self::Uploading { .. } => ViewKind::Uploading,
            Self::Error { .. } => ViewKind::Error,
            Self::Loaded { .. } => ViewKind::Loaded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    UploadInProgress,
    ResultShown,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UploadInProgress => f.write_str("an upload is already in progress"),
            Self::ResultShown => f.write_str("a result is shown; choose \"upload another\" first"),
        }
    }
}

impl std::error::Error for TransitionError {}

pub struct Session {
    state: ViewState,
    file_name: String,
    progress: SyntheticProgress,
    next_token: u64,
    cancel: Option<oneshot::Sender<()>>,
    pacing: Pacing,
    animator: Box<dyn Animator>,
}

impl Session {
    pub fn new(pacing: Pacing) -> Self {
        let animator: Box<dyn Animator> = match pacing {
            Pacing::Animated => Box::new(LinearRamp::default()),
            Pacing::Instant => Box::new(Immediate),
        };
        Self {
            state: ViewState::Idle,
            file_name: String::new(),
            progress: SyntheticProgress::default(),
            next_token: 1,
            cancel: None,
            pacing,
            animator,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn view(&self) -> ViewKind {
        self.state.kind()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn progress(&self) -> f64 {
        self.progress.value()
    }

    /// Idle or Error → Uploading. The receiver fires when the attempt is abandoned.
    pub fn begin_upload(
        &mut self,
        file_name: &str,
    ) -> Result<(SessionToken, oneshot::Receiver<()>), TransitionError> {
        match self.state {
            ViewState::Uploading { .. } => return Err(TransitionError::UploadInProgress),
            ViewState::Loaded { .. } => return Err(TransitionError::ResultShown),
            ViewState::Idle | ViewState::Error { .. } => {}
        }

        let token = SessionToken(self.next_token);
        self.next_token += 1;
        let (tx, rx) = oneshot::channel();
        self.cancel = Some(tx);
        self.file_name = file_name.to_string();
        self.progress.reset();
        self.state = ViewState::Uploading { token };
        info!(token = token.0, file = %self.file_name, "upload started");
        Ok((token, rx))
    }

    /// Uploading → Loaded or Error. Returns false when the outcome was discarded.
    pub fn complete(
        &mut self,
        token: SessionToken,
        outcome: Result<ChatAnalysisResult, TransferError>,
    ) -> bool {
        if !self.is_current(token) {
            warn!(token = token.0, "discarding outcome of an abandoned upload");
            return false;
        }

        self.cancel = None;
        self.progress.finish();
        self.state = match outcome {
            Ok(result) => {
                if !result.is_aligned() {
                    warn!(
                        dates = result.dates.len(),
                        active = result.active_users_count.len(),
                        new = result.new_users_count.len(),
                        "analysis series are not aligned with dates"
                    );
                }
                let summary = summarize(&result);
                info!(token = token.0, total = summary.total_messages, contributors = summary.active_users, "analysis loaded");
                ViewState::Loaded {
                    result,
                    summary,
                    loaded_at: Instant::now(),
                    analyzed_at: Local::now(),
                }
            }
            Err(err) => {
                warn!(token = token.0, error = %err, "analysis failed");
                ViewState::Error {
                    message: err.to_string(),
                }
            }
        };
        true
    }

    /// Moves the cosmetic progress along. Returns false once there is nothing left to tick.
    pub fn advance_progress(&mut self, token: SessionToken, step: f64) -> bool {
        if !self.is_current(token) || self.progress.is_complete() {
            return false;
        }
        self.progress.advance(step);
        !self.progress.is_complete()
    }

    pub fn reject_input(&mut self, rejection: &InputRejection) -> Result<(), TransitionError> {
        match self.state {
            ViewState::Uploading { .. } => Err(TransitionError::UploadInProgress),
            ViewState::Loaded { .. } => Err(TransitionError::ResultShown),
            ViewState::Idle | ViewState::Error { .. } => {
                info!(reason = %rejection, "input rejected");
                self.state = ViewState::Error {
                    message: rejection.to_string(),
                };
                Ok(())
            }
        }
    }

    /// Back to Idle from anywhere. An upload still in flight is abandoned.
    pub fn upload_another(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
            info!("in-flight upload abandoned");
        }
        self.state = ViewState::Idle;
        self.file_name.clear();
        self.progress.reset();
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> ViewSnapshot {
        let mut snapshot = ViewSnapshot {
            view: self.view(),
            file_name: self.file_name.clone(),
            loading: matches!(self.state, ViewState::Uploading { .. }),
            show_upload_area: matches!(self.state, ViewState::Idle | ViewState::Error { .. }),
            error: None,
            progress: self.progress.value(),
            result: None,
            summary: None,
            displayed: None,
            chart: None,
            contributors: Vec::new(),
            analyzed_at: None,
            animation: None,
        };

        match &self.state {
            ViewState::Idle | ViewState::Uploading { .. } => {}
            ViewState::Error { message } => snapshot.error = Some(message.clone()),
            ViewState::Loaded {
                result,
                summary,
                loaded_at,
                analyzed_at,
            } => {
                let elapsed = now.saturating_duration_since(*loaded_at);
                snapshot.displayed = Some(self.animator.frame_stats(summary, elapsed));
                snapshot.summary = Some(*summary);
                snapshot.chart = Some(build_chart(
                    &result.dates,
                    &result.active_users_count,
                    &result.new_users_count,
                ));
                snapshot.contributors = contributors(result);
                snapshot.analyzed_at = Some(analyzed_at.format("%Y-%m-%d %H:%M").to_string());
                if self.pacing == Pacing::Animated && !self.animator.is_settled(elapsed) {
                    let ramp = LinearRamp::default();
                    snapshot.animation = Some(AnimationSpec {
                        duration_ms: ramp.duration.as_millis() as u64,
                        tick_ms: ramp.tick.as_millis() as u64,
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                }
                snapshot.result = Some(result.clone());
            }
        }

        snapshot
    }

    fn is_current(&self, token: SessionToken) -> bool {
        matches!(self.state, ViewState::Uploading { token: current } if current == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn week_result() -> ChatAnalysisResult {
        ChatAnalysisResult {
            dates: (1..=7).map(|day| format!("2024-03-{day:02}")).collect(),
            active_users_count: vec![10, 20, 30, 5, 0, 15, 25],
            new_users_count: vec![1, 0, 2, 0, 0, 1, 0],
            active_users_four_days: vec!["Alice".into(), "Bob".into(), "Carol".into()],
        }
    }

    #[test]
    fn starts_idle_with_upload_area() {
        let session = Session::new(Pacing::Instant);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.view, ViewKind::Idle);
        assert!(snapshot.show_upload_area);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.file_name, "");
    }

    #[test]
    fn successful_upload_loads_once() {
        let mut session = Session::new(Pacing::Instant);
        let (token, _rx) = session.begin_upload("chat.txt").unwrap();
        assert_eq!(session.view(), ViewKind::Uploading);
        let snapshot = session.snapshot();
        assert!(snapshot.loading);
        assert!(!snapshot.show_upload_area);

        assert!(session.complete(token, Ok(week_result())));
        assert_eq!(session.view(), ViewKind::Loaded);
        assert!(!session.complete(token, Ok(week_result())));
        assert_eq!(session.view(), ViewKind::Loaded);

        let snapshot = session.snapshot();
        assert!(!snapshot.show_upload_area);
        assert_eq!(snapshot.progress, 100.0);
        let summary = snapshot.summary.unwrap();
        assert_eq!(summary.total_messages, 105);
        assert_eq!(snapshot.displayed, Some(summary));
        let badges: Vec<_> = snapshot.contributors.iter().map(|c| c.badge.clone()).collect();
        assert_eq!(badges, vec!["#1", "#2", "#3"]);
        assert!(snapshot.chart.is_some());
        assert!(snapshot.animation.is_none());
    }

    #[test]
    fn failed_upload_shows_error_once() {
        let mut session = Session::new(Pacing::Instant);
        let (token, _rx) = session.begin_upload("chat.txt").unwrap();
        assert!(session.complete(token, Err(TransferError::AnalysisFailed)));
        assert!(!session.complete(token, Err(TransferError::AnalysisFailed)));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.view, ViewKind::Error);
        assert_eq!(snapshot.error.as_deref(), Some("Failed to analyze chat file"));
        assert!(snapshot.show_upload_area);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.file_name, "chat.txt");
    }

    #[test]
    fn error_allows_retry() {
        let mut session = Session::new(Pacing::Instant);
        let (token, _rx) = session.begin_upload("chat.txt").unwrap();
        session.complete(token, Err(TransferError::transport("connection refused")));
        let (retry, _rx) = session.begin_upload("chat.txt").unwrap();
        assert_ne!(retry, token);
        assert_eq!(session.view(), ViewKind::Uploading);
    }

    #[test]
    fn second_upload_while_loading_is_refused() {
        let mut session = Session::new(Pacing::Instant);
        let _first = session.begin_upload("a.txt").unwrap();
        assert_eq!(
            session.begin_upload("b.txt").unwrap_err(),
            TransitionError::UploadInProgress
        );
        assert_eq!(session.file_name(), "a.txt");
    }

    #[test]
    fn loaded_requires_upload_another_first() {
        let mut session = Session::new(Pacing::Instant);
        let (token, _rx) = session.begin_upload("a.txt").unwrap();
        session.complete(token, Ok(week_result()));
        assert_eq!(session.begin_upload("b.txt").unwrap_err(), TransitionError::ResultShown);
    }

    #[test]
    fn upload_another_resets_to_idle() {
        let mut session = Session::new(Pacing::Instant);
        let (token, _rx) = session.begin_upload("chat.txt").unwrap();
        session.complete(token, Ok(week_result()));

        session.upload_another();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.view, ViewKind::Idle);
        assert_eq!(snapshot.file_name, "");
        assert!(snapshot.error.is_none());
        assert!(snapshot.result.is_none());
        assert!(snapshot.summary.is_none());
        assert!(snapshot.contributors.is_empty());
        assert!(snapshot.show_upload_area);
    }

    #[test]
    fn upload_another_cancels_and_discards_late_outcome() {
        let mut session = Session::new(Pacing::Instant);
        let (token, mut cancelled) = session.begin_upload("slow.txt").unwrap();
        session.upload_another();
        assert!(cancelled.try_recv().is_ok());

        assert!(!session.complete(token, Ok(week_result())));
        assert_eq!(session.view(), ViewKind::Idle);
    }

    #[test]
    fn late_outcome_does_not_clobber_newer_upload() {
        let mut session = Session::new(Pacing::Instant);
        let (stale, _rx) = session.begin_upload("first.txt").unwrap();
        session.upload_another();
        let (fresh, _rx) = session.begin_upload("second.txt").unwrap();

        assert!(!session.complete(stale, Err(TransferError::AnalysisFailed)));
        assert_eq!(session.view(), ViewKind::Uploading);
        assert!(session.complete(fresh, Ok(week_result())));
        assert_eq!(session.file_name(), "second.txt");
    }

    #[test]
    fn rejection_sets_error_and_keeps_upload_area() {
        let mut session = Session::new(Pacing::Instant);
        session.reject_input(&InputRejection::WrongType).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.view, ViewKind::Error);
        assert_eq!(snapshot.error.as_deref(), Some("Please upload a .txt file"));
        assert!(snapshot.show_upload_area);
    }

    #[test]
    fn rejection_is_refused_while_uploading() {
        let mut session = Session::new(Pacing::Instant);
        let _upload = session.begin_upload("chat.txt").unwrap();
        assert_eq!(
            session.reject_input(&InputRejection::WrongType).unwrap_err(),
            TransitionError::UploadInProgress
        );
    }

    #[test]
    fn progress_only_ticks_for_current_upload() {
        let mut session = Session::new(Pacing::Animated);
        let (token, _rx) = session.begin_upload("chat.txt").unwrap();
        assert!(session.advance_progress(token, 10.0));
        assert_eq!(session.progress(), 10.0);
        assert!(!session.advance_progress(SessionToken(token.0 + 1), 10.0));
        assert_eq!(session.progress(), 10.0);
        assert!(!session.advance_progress(token, 200.0));
        assert_eq!(session.progress(), 100.0);
    }

    #[test]
    fn animated_snapshot_ramps_then_settles() {
        let mut session = Session::new(Pacing::Animated);
        let (token, _rx) = session.begin_upload("chat.txt").unwrap();
        session.complete(token, Ok(week_result()));
        let ViewState::Loaded { loaded_at, .. } = session.state() else {
            panic!("expected loaded state");
        };
        let loaded_at = *loaded_at;

        let early = session.snapshot_at(loaded_at);
        assert_eq!(early.displayed.unwrap().total_messages, 0);
        assert!(early.animation.is_some());

        let settled = session.snapshot_at(loaded_at + Duration::from_millis(1500));
        assert_eq!(settled.displayed, settled.summary);
        assert!(settled.animation.is_none());
    }
}
