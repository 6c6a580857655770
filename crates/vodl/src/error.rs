#[derive(Debug, thiserror::Error)]
pub enum VodError {
    #[error("playlist parse error: {reason}")]
    Parse { reason: String },

    #[error("malformed playlist: {reason}")]
    MalformedPlaylist { reason: String },

    #[error("source quality not found")]
    SourceQualityNotFound,

    #[error("quality '{requested}' not found, available qualities are: {available}")]
    QualityNotFound { requested: String, available: String },

    #[error("{segments} segments were given {targets} download targets")]
    TargetMismatch { segments: usize, targets: usize },

    #[error("choice {choice} is out of range 1..={max}")]
    InvalidChoice { choice: usize, max: usize },

    #[error("rendition selection failed: {reason}")]
    Selection { reason: String },

    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl VodError {
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPlaylist {
            reason: reason.into(),
        }
    }

    pub fn selection(reason: impl Into<String>) -> Self {
        Self::Selection {
            reason: reason.into(),
        }
    }

    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means an upstream invariant is broken and the run
    /// must stop, as opposed to a condition the user can fix by retrying with
    /// different input.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::MalformedPlaylist { .. } | Self::TargetMismatch { .. } => true,
            Self::Parse { .. }
            | Self::SourceQualityNotFound
            | Self::QualityNotFound { .. }
            | Self::InvalidChoice { .. }
            | Self::Selection { .. }
            | Self::InvalidUrl { .. }
            | Self::Io { .. } => false,
        }
    }
}
