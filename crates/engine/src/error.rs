use rekt_registry::CallMode;
use rekt_types::Verb;
use rekt_util::http::JsonParseError;
use thiserror::Error;

/// Failure of a single generated operation call.
///
/// Argument problems are detected before any network I/O. Everything after
/// the request leaves the process is reported as [`CallError::Transport`],
/// [`CallError::Remote`], or [`CallError::Decode`].
#[derive(Debug, Error)]
pub enum CallError {
    #[error("{operation}: missing required argument '{argument}'")]
    MissingArgument { operation: String, argument: String },

    #[error("{operation}: unknown argument '{argument}'")]
    UnknownArgument { operation: String, argument: String },

    #[error("{operation}: verb {verb} has no argument placement")]
    UnsupportedVerb { operation: String, verb: Verb },

    /// The service answered with a status outside the 2xx range.
    #[error("{operation}: remote returned HTTP {status}: {body}")]
    Remote { operation: String, status: u16, body: String },

    #[error("{operation}: request failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: {source}")]
    Decode {
        operation: String,
        #[source]
        source: JsonParseError,
    },

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("operation '{operation}' is {mode:?}; use {hint}")]
    ModeMismatch {
        operation: String,
        mode: CallMode,
        hint: &'static str,
    },

    /// The worker pool shut down before the operation completed.
    #[error("{operation}: abandoned before completion")]
    Abandoned { operation: String },

    #[error("async runtime unavailable: {0}")]
    Runtime(#[from] std::io::Error),
}

impl CallError {
    /// HTTP status of a [`CallError::Remote`] failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Name of the operation that failed, when known.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::MissingArgument { operation, .. }
            | Self::UnknownArgument { operation, .. }
            | Self::UnsupportedVerb { operation, .. }
            | Self::Remote { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Decode { operation, .. }
            | Self::ModeMismatch { operation, .. }
            | Self::Abandoned { operation } => Some(operation),
            Self::UnknownOperation(_) | Self::Runtime(_) => None,
        }
    }
}
