use std::fmt;

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LangCacheError {
    #[error("missing config file lang-cache.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid application identifier: {0}")]
    InvalidApplicationId(String),

    #[error("invalid applet identifier: {0}")]
    InvalidAppletId(String),

    #[error("invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("failed to build API client: {0}")]
    ClientSetup(String),

    #[error("{failed} language file(s) could not be generated")]
    ItemsFailed { failed: usize },
}

/// What went wrong on the remote side of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The call produced no usable envelope (network, timeout, undecodable body).
    Transport,
    /// The envelope status was something other than `OK`.
    Status {
        error_type: Option<String>,
        error_code: Option<String>,
    },
    /// Status was `OK` but the payload was the `false` sentinel.
    EmptyContent,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::Transport => write!(f, "transport"),
            RemoteErrorKind::Status { .. } => write!(f, "status"),
            RemoteErrorKind::EmptyContent => write!(f, "empty-content"),
        }
    }
}

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn status(
        error_type: Option<String>,
        error_code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: RemoteErrorKind::Status {
                error_type,
                error_code,
            },
            message: message.into(),
        }
    }

    pub fn empty_content() -> Self {
        Self {
            kind: RemoteErrorKind::EmptyContent,
            message: "Wrong content!".to_string(),
        }
    }

    /// Prefixes the message with the call the error belongs to, keeping the kind.
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum WriteError {
    #[error("folder {0} is not writable")]
    NotWritable(Utf8PathBuf),

    #[error("unable to create folder {path}: {source}")]
    CreateDir {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("file {path} couldn't be locked: {source}")]
    Locked {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("unable to write data to file {path}: wrote {written} of {expected} bytes")]
    ShortWrite {
        path: Utf8PathBuf,
        written: usize,
        expected: usize,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("there are no available languages for the {0} applet")]
    NoAppletLanguages(String),

    #[error("there are no configured languages for the {0} application")]
    NoApplicationLanguages(String),
}
