use std::fmt;

pub const PLAIN_TEXT: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadSource {
    #[default]
    Picker,
    Drop,
}

impl UploadSource {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("drop") => Self::Drop,
            _ => Self::Picker,
        }
    }
}

/// A file as handed over by the browser, before any transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn is_plain_text(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|value| value.split(';').next())
            .map(|essence| essence.trim().eq_ignore_ascii_case(PLAIN_TEXT))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRejection {
    NoFile,
    WrongType,
}

impl fmt::Display for InputRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFile => f.write_str("Please choose a file to upload"),
            Self::WrongType => f.write_str("Please upload a .txt file"),
        }
    }
}

impl std::error::Error for InputRejection {}

/// Picks the one file an upload action works on.
///
/// Only the first entry counts. Drops must declare `text/plain`; picker
/// selections were already filtered by the OS chooser and are not checked again.
pub fn select_file(
    source: UploadSource,
    files: impl IntoIterator<Item = CandidateFile>,
) -> Result<CandidateFile, InputRejection> {
    let file = files.into_iter().next().ok_or(InputRejection::NoFile)?;
    match source {
        UploadSource::Drop if !file.is_plain_text() => Err(InputRejection::WrongType),
        _ => Ok(file),
    }
}
