use std::io;

use tonic::{Code, Status};

pub type Result<T, E = BenchError> = std::result::Result<T, E>;

/// Everything that can end a benchmark run.
///
/// None of these are retried. A run that hits any of them produces no report.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// A parameter or option could not be turned into a usable value.
    #[error("invalid value {value:?} for {name}: {reason}")]
    Config {
        name: String,
        value: String,
        reason: String,
    },

    /// The channel to the store could not be established.
    #[error("unable to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The call never got an answer from the store.
    #[error("{op} failed at the transport layer: {status}")]
    Transport { op: &'static str, status: Status },

    /// The store answered and refused the call.
    #[error("{op} rejected by the store: {status}")]
    Application { op: &'static str, status: Status },

    #[error("unable to build request: {0}")]
    Request(String),

    #[error("key {key:?} is still present after the reset")]
    KeyPresent { key: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    pub fn config(name: &str, value: &str, reason: impl ToString) -> Self {
        Self::Config {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn connect<E>(addr: &str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Connect {
            addr: addr.to_string(),
            source: source.into(),
        }
    }

    /// Sorts a failed call into transport or application failure by its code.
    pub fn from_status(op: &'static str, status: Status) -> Self {
        match status.code() {
            Code::Unavailable | Code::Cancelled | Code::DeadlineExceeded | Code::Unknown => {
                Self::Transport { op, status }
            }
            _ => Self::Application { op, status },
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Connect { .. })
    }
}
