#![forbid(unsafe_code)]

//! Error kinds surfaced by the engine.
//!
//! | Kind | Raised by | State after |
//! |------|-----------|-------------|
//! | [`TransportError`] | fetch collaborator | unchanged, retriable |
//! | [`TemplateError`] | render sink | unchanged, later calls unaffected |
//! | [`ConfigError`] | constructor | nothing wired |

use crate::scroller::RequestId;
use std::fmt;

/// The fetch collaborator failed (network, HTTP status, undecodable body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error with a human-readable cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The cause reported by the collaborator.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error fetching data: {}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// The caller-supplied template broke the one-root-element contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateError {
    /// The template produced no top-level element, so there is nothing to
    /// stamp a page id on.
    EmptyFragment,
    /// The template produced more than one top-level element.
    MultipleRoots(usize),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFragment => {
                write!(f, "template produced no element; unable to set page id")
            }
            Self::MultipleRoots(n) => {
                write!(f, "template produced {n} top-level elements, expected exactly one")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Invalid or missing configuration, detected at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required option was not supplied.
    MissingField(&'static str),
    /// An option was supplied with an unusable value.
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required option: {field}"),
            Self::Invalid { field, reason } => write!(f, "invalid option {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Any failure of a scroller operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollerError {
    Transport(TransportError),
    Template(TemplateError),
    Configuration(ConfigError),
    /// A completion arrived for a request that is not in flight (already
    /// completed, or never issued).
    UnknownRequest(RequestId),
}

impl fmt::Display for ScrollerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{e}"),
            Self::Template(e) => write!(f, "{e}"),
            Self::Configuration(e) => write!(f, "{e}"),
            Self::UnknownRequest(id) => write!(f, "no fetch in flight with id {id}"),
        }
    }
}

impl std::error::Error for ScrollerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Template(e) => Some(e),
            Self::Configuration(e) => Some(e),
            Self::UnknownRequest(_) => None,
        }
    }
}

impl From<TransportError> for ScrollerError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<TemplateError> for ScrollerError {
    fn from(e: TemplateError) -> Self {
        Self::Template(e)
    }
}

impl From<ConfigError> for ScrollerError {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            TransportError::new("503").to_string(),
            "error fetching data: 503"
        );
        assert_eq!(
            ConfigError::MissingField("url").to_string(),
            "missing required option: url"
        );
        assert!(
            TemplateError::MultipleRoots(2)
                .to_string()
                .contains("2 top-level")
        );
    }

    #[test]
    fn scroller_error_wraps_sources() {
        use std::error::Error as _;
        let err: ScrollerError = TemplateError::EmptyFragment.into();
        assert!(err.source().is_some());
        let err = ScrollerError::UnknownRequest(RequestId(9));
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "no fetch in flight with id #9");
    }
}
