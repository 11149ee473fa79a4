use std::fmt;

/// Coarse grouping used when deciding how a failure is shown to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Recovered inline next to the input, no network call made.
    Validation,
    /// Network, HTTP status or body problems.
    Transport,
    /// Server answered with `success: false`.
    Application,
}

#[derive(Debug)]
pub enum PageError {
    /// Phone value incomplete or malformed
    Validation(String),

    /// Request could not be sent or the response could not be read
    Transport { endpoint: String, message: String },

    /// Non-2xx status with a body that is not the expected JSON
    Http { endpoint: String, status: u16 },

    /// Response body failed to parse
    JsonParse { context: String, source: serde_json::Error },

    /// Server reported `success: false`
    Application(String),

    /// In-flight request was superseded by a newer submission
    Cancelled,

    /// Element required by the page contract is missing
    ElementNotFound { element: String, context: String },

    /// Bad configuration value (URL, form record)
    Config(String),
}

impl PageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PageError::Validation(_) => ErrorKind::Validation,
            PageError::Application(_) => ErrorKind::Application,
            _ => ErrorKind::Transport,
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::Validation(msg) => {
                write!(f, "Validation failed: {}", msg)
            }
            PageError::Transport { endpoint, message } => {
                write!(f, "Request to {} failed: {}", endpoint, message)
            }
            PageError::Http { endpoint, status } => {
                write!(f, "{} answered with HTTP {}", endpoint, status)
            }
            PageError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            PageError::Application(msg) => {
                write!(f, "Server rejected submission: {}", msg)
            }
            PageError::Cancelled => {
                write!(f, "Submission cancelled by a newer request")
            }
            PageError::ElementNotFound { element, context } => {
                write!(f, "Element '{}' not found: {}", element, context)
            }
            PageError::Config(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::JsonParse { source, .. } => Some(source),
            _ => None,
        }
    }
}
