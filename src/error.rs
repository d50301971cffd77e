use thiserror::Error;

/// Front-end error carried up to `main`, with the process exit code to use.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the sheet ingestion pipeline.
///
/// Only `AllCandidatesExhausted` ever leaves `SheetSource::fetch_data`; the
/// other kinds describe a single candidate and send the loop to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("transport failure on '{candidate}': {message}")]
    TransportFailure { candidate: String, message: String },
    #[error("invalid payload from '{candidate}': {reason}")]
    InvalidPayload { candidate: String, reason: String },
    #[error("no records parsed from '{candidate}'")]
    NoRecordsParsed { candidate: String },
    #[error("all {attempts} data sources failed: {last}")]
    AllCandidatesExhausted { attempts: usize, last: String },
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::new(4, format!("Failed to load sheet data: {err}"))
    }
}
