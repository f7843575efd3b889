pub mod aggregate;
pub mod app;
pub mod chart;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod session;
pub mod state;
pub mod transfer;
pub mod ui;
pub mod upload;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use transfer::{Analyzer, HttpAnalyzer};
