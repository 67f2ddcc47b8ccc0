use thiserror::Error;

/// Failure classes of the remote catalog, as the user-facing flows see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationRejected,
    ReferentialConflictSoft,
    ReferentialConflictHard,
    DuplicateKey,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The server rejected the payload; the message is meant for the user.
    #[error("{0}")]
    ValidationRejected(String),
    /// Deletion blocked by existing offerings; a forced delete cascades.
    #[error("course has been offered in {}", join_years(.years_offered))]
    OfferedConflict { years_offered: Vec<i32> },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("record already exists")]
    DuplicateKey,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

impl ServiceError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationRejected(_) => ErrorKind::ValidationRejected,
            Self::OfferedConflict { .. } => ErrorKind::ReferentialConflictSoft,
            Self::Conflict(_) => ErrorKind::ReferentialConflictHard,
            Self::DuplicateKey => ErrorKind::DuplicateKey,
            Self::Transport(_) | Self::Server { .. } => ErrorKind::Transport,
        }
    }
}

pub fn join_years(years: &[i32]) -> String {
    years
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
