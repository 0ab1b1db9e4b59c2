use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutofillError {
    /// Caller supplied no tab, no credential or no frame page details
    #[error("Nothing to autofill: {0}")]
    NothingToAutofill(&'static str),

    /// Every frame was skipped or produced an empty script
    #[error("Did not autofill.")]
    DidNotAutofill,

    /// Credential file could not be read
    #[error("failed to read credential '{path}': {source}")]
    CredentialRead {
        path: String,
        source: std::io::Error,
    },

    /// Credential YAML could not be parsed
    #[error("credential parse error ({context}): {source}")]
    CredentialParse {
        context: String,
        source: serde_yaml::Error,
    },

    /// Snapshot JSON could not be read or parsed
    #[error("snapshot error ({context}): {message}")]
    Snapshot { context: String, message: String },
}

pub type Result<T> = std::result::Result<T, AutofillError>;
