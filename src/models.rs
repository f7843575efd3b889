use serde::{Deserialize, Serialize};

/// Per-day activity as reported by the analysis service.
///
/// Absent members decode as empty sequences. The three per-day series are
/// expected to be index-aligned with `dates`; see [`ChatAnalysisResult::is_aligned`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChatAnalysisResult {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub active_users_count: Vec<u64>,
    #[serde(default)]
    pub new_users_count: Vec<u64>,
    #[serde(default, rename = "active_users_4days")]
    pub active_users_four_days: Vec<String>,
}

impl ChatAnalysisResult {
    pub fn is_aligned(&self) -> bool {
        self.dates.len() == self.active_users_count.len()
            && self.dates.len() == self.new_users_count.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SummaryStats {
    pub total_messages: u64,
    pub active_users: u64,
    pub peak_activity: u64,
    pub average_daily: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub rank: usize,
    pub badge: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Idle,
    Uploading,
    Error,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimationSpec {
    pub duration_ms: u64,
    pub tick_ms: u64,
    pub elapsed_ms: u64,
}

/// Everything the page needs to draw one frame of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub view: ViewKind,
    pub file_name: String,
    pub loading: bool,
    pub show_upload_area: bool,
    pub error: Option<String>,
    pub progress: f64,
    pub result: Option<ChatAnalysisResult>,
    pub summary: Option<SummaryStats>,
    pub displayed: Option<SummaryStats>,
    pub chart: Option<crate::chart::ChartDescriptor>,
    pub contributors: Vec<Contributor>,
    pub analyzed_at: Option<String>,
    pub animation: Option<AnimationSpec>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub source: Option<String>,
}
