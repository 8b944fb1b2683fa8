use thiserror::Error;

/// Failures of the question-generation pipeline. None of them are retried by
/// the pipeline itself; the HTTP layer turns them into a 500 with the display
/// message, so messages stay short and never carry prompt or payload text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("upstream completion failed: {0}")]
    Upstream(String),

    #[error("malformed completion: {0}")]
    MalformedResponse(String),

    #[error("correct answer {0:?} is not among the options")]
    InconsistentAnswer(String),

    #[error("could not persist record: {0}")]
    Persistence(color_eyre::Report),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Upstream(_) => "upstream",
            GenerationError::MalformedResponse(_) => "malformed_response",
            GenerationError::InconsistentAnswer(_) => "inconsistent_answer",
            GenerationError::Persistence(_) => "persistence",
        }
    }
}
