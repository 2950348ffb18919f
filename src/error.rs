use thiserror::Error;

/// Errors surfaced by the thermostat accessors.
///
/// Everything that goes wrong while talking to the device collapses into
/// [`Error::Communication`]; callers never see the difference between an
/// offline device, a bad status and a malformed body.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("communication failure: {url} ({}): {reason}", status_text(*.status))]
    Communication {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn communication(
        url: impl Into<String>,
        status: Option<u16>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Error::Communication {
            url: url.into(),
            status,
            reason: reason.to_string(),
        }
    }

    /// HTTP status of a communication failure, if the device answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Communication { status, .. } => *status,
            Error::Config(_) => None,
        }
    }

    pub fn is_communication(&self) -> bool {
        matches!(self, Error::Communication { .. })
    }
}

fn status_text(status: Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
