/// Alias for `Result<T, WodError>`.
pub type WodResult<T> = Result<T, WodError>;

/// Errors raised while parsing wizard identifiers and progress data.
#[derive(Debug, thiserror::Error)]
pub enum WodError {
    /// The archetype name does not match any known archetype.
    #[error("unknown archetype: \"{0}\"")]
    UnknownArchetype(String),

    /// The step identifier does not match any wizard step.
    #[error("unknown step: \"{0}\"")]
    UnknownStep(String),

    /// The priority tier name is not primary, secondary, or tertiary.
    #[error("unknown priority tier: \"{0}\"")]
    UnknownTier(String),

    /// The freebie spend category is not recognized.
    #[error("unknown spend kind: \"{0}\"")]
    UnknownSpendKind(String),

    /// Saved progress could not be decoded.
    #[error("invalid progress data: {0}")]
    InvalidProgress(#[from] serde_json::Error),
}
