use crate::models::ChatAnalysisResult;
use crate::upload::{CandidateFile, PLAIN_TEXT};
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use std::{fmt, future::Future, pin::Pin, time::Duration};
use tracing::{info, warn};
use url::Url;

pub const FILE_FIELD: &str = "file";
const ANALYSIS_FAILED: &str = "Failed to analyze chat file";
const FALLBACK_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The service answered with a non-success status. Its body is not read.
    AnalysisFailed,
    Transport(String),
    MalformedResponse(String),
}

impl TransferError {
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Transport(FALLBACK_MESSAGE.to_string())
        } else {
            Self::Transport(message)
        }
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnalysisFailed => f.write_str(ANALYSIS_FAILED),
            Self::Transport(message) => f.write_str(message),
            Self::MalformedResponse(reason) => write!(f, "The analysis service sent an unreadable response: {reason}"),
        }
    }
}

impl std::error::Error for TransferError {}

pub type AnalyzeFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatAnalysisResult, TransferError>> + Send + 'a>>;

/// Sends one chat export for analysis and returns the decoded result.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, file: CandidateFile) -> AnalyzeFuture<'_>;
}

pub struct HttpAnalyzer {
    client: Client,
    endpoint: Url,
}

impl HttpAnalyzer {
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, TransferError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransferError::transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, file: CandidateFile) -> Result<ChatAnalysisResult, TransferError> {
        let size = file.bytes.len();
        // Browsers occasionally declare types reqwest cannot parse; those go out as plain text.
        let mime = file
            .content_type
            .as_deref()
            .filter(|declared| Part::bytes(Vec::new()).mime_str(declared).is_ok())
            .unwrap_or(PLAIN_TEXT)
            .to_string();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(&mime)
            .map_err(|err| TransferError::transport(err.to_string()))?;
        let form = Form::new().part(FILE_FIELD, part);

        info!(file = %file.file_name, bytes = size, endpoint = %self.endpoint, "sending chat export for analysis");
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|err| TransferError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "analysis service rejected the upload");
            return Err(TransferError::AnalysisFailed);
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| TransferError::transport(err.to_string()))?;
        decode_result(&body)
    }
}

impl Analyzer for HttpAnalyzer {
    fn analyze(&self, file: CandidateFile) -> AnalyzeFuture<'_> {
        Box::pin(self.post(file))
    }
}

pub fn decode_result(body: &[u8]) -> Result<ChatAnalysisResult, TransferError> {
    serde_json::from_slice(body).map_err(|err| TransferError::MalformedResponse(err.to_string()))
}
