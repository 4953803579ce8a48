use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("cannot prepare data directory at {path}: {source}")]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("username '{0}' is already taken")]
    DuplicateUser(String),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("gif file does not exist: {0}")]
    GifNotFound(String),

    #[error("shared file does not exist: {0}")]
    SharedFileMissing(String),

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("invalid admin passcode")]
    InvalidPasscode,

    #[error("failed to archive {path}: {source}")]
    ArchiveIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no username given (pass --as or set FLOCKCHAT_USER)")]
    NoIdentity,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Setup { .. } => "setup_error",
            Self::EmptyUsername => "empty_username",
            Self::DuplicateUser(_) => "duplicate_user",
            Self::UserNotFound(_) => "user_not_found",
            Self::EmptyMessage => "empty_message",
            Self::GifNotFound(_) => "gif_not_found",
            Self::SharedFileMissing(_) => "shared_file_missing",
            Self::NonUtf8Path(_) => "non_utf8_path",
            Self::InvalidPasscode => "invalid_passcode",
            Self::ArchiveIo { .. } => "archive_io_error",
            Self::NoIdentity => "no_identity",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
