use crate::progress::Pacing;
use crate::session::Session;
use crate::transfer::Analyzer;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn Analyzer>,
    pub session: Arc<Mutex<Session>>,
    pub pacing: Pacing,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn Analyzer>, pacing: Pacing) -> Self {
        Self {
            analyzer,
            session: Arc::new(Mutex::new(Session::new(pacing))),
            pacing,
        }
    }
}
