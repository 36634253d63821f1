//! Error types for chatterbox.
//!
//! Errors fall into three groups.  Precondition failures (`EmptyInput`, `Busy`,
//! `NoFeatureSelected`, `UnsupportedFileType`) are raised synchronously by the
//! session controller before any request is issued and never mutate state.
//! Transport failures (`Network`, `HttpStatus`, `MalformedResponse`,
//! `Application`) are produced when a request settles unsuccessfully.  The
//! remaining variants cover the ambient plumbing: persistence, configuration and
//! client construction.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::types::Severity;

/// The main error type for chatterbox.
#[derive(Clone, Debug)]
pub enum Error {
    /// The message was empty after trimming.
    EmptyInput,

    /// A request is already in flight.
    Busy,

    /// An upload was attempted without a current feature.
    NoFeatureSelected,

    /// The uploaded file's extension is not on the allow-list.
    UnsupportedFileType {
        /// The lowercased extension that was rejected.
        extension: String,
    },

    /// The request never produced an HTTP response.
    Network {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The server answered with a non-2xx status.
    HttpStatus {
        /// HTTP status code.
        status_code: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body did not have the expected shape.
    MalformedResponse {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The backend answered with a non-success status and an error message.
    Application {
        /// Error message reported by the backend.
        message: String,
    },

    /// Error during JSON or YAML serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// HTTP client construction error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// Invalid configuration.
    Config {
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Creates a new unsupported file type error.
    pub fn unsupported_file_type(extension: impl Into<String>) -> Self {
        Error::UnsupportedFileType {
            extension: extension.into(),
        }
    }

    /// Creates a new network error.
    pub fn network(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Network {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP status error.
    pub fn http_status(status_code: u16, body: impl Into<String>) -> Self {
        Error::HttpStatus {
            status_code,
            body: body.into(),
        }
    }

    /// Creates a new malformed response error.
    pub fn malformed_response(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::MalformedResponse {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new application error.
    pub fn application(message: impl Into<String>) -> Self {
        Error::Application {
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns true if this error was raised by a controller precondition.
    ///
    /// Precondition failures are reported before any state is touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::EmptyInput
                | Error::Busy
                | Error::NoFeatureSelected
                | Error::UnsupportedFileType { .. }
        )
    }

    /// Returns true if this error came from settling a request.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network { .. }
                | Error::HttpStatus { .. }
                | Error::MalformedResponse { .. }
                | Error::Application { .. }
        )
    }

    /// Returns true if this error is a busy rejection.
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Busy)
    }

    /// Returns true if this error is an empty input rejection.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::EmptyInput)
    }

    /// Returns true if this error is a network error.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// Returns true if this error is an application error.
    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application { .. })
    }

    /// Returns true if this error is a malformed response.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Error::MalformedResponse { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// The notice severity used when this error is surfaced to the user.
    pub fn severity(&self) -> Severity {
        match self {
            Error::Busy => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "Please enter a message"),
            Error::Busy => write!(f, "Please wait for the current request to complete"),
            Error::NoFeatureSelected => write!(f, "Please select a feature first"),
            Error::UnsupportedFileType { extension } => {
                write!(f, "File type not supported: {extension}")
            }
            Error::Network { message, .. } => write!(f, "Network error: {message}"),
            Error::HttpStatus { status_code, body } => {
                if body.is_empty() {
                    write!(f, "HTTP {status_code}")
                } else {
                    write!(f, "HTTP {status_code}: {body}")
                }
            }
            Error::MalformedResponse { message, .. } => {
                write!(f, "Malformed response: {message}")
            }
            Error::Application { message } => write!(f, "{message}"),
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => write!(f, "I/O error: {message}"),
            Error::HttpClient { message, .. } => write!(f, "HTTP client error: {message}"),
            Error::Url { message, .. } => write!(f, "URL error: {message}"),
            Error::Config { message } => write!(f, "Configuration error: {message}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Network { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::MalformedResponse { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::serialization(format!("YAML error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for chatterbox operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_errors_are_classified() {
        assert!(Error::EmptyInput.is_precondition());
        assert!(Error::Busy.is_precondition());
        assert!(Error::NoFeatureSelected.is_precondition());
        assert!(Error::unsupported_file_type("exe").is_precondition());
        assert!(!Error::application("nope").is_precondition());
    }

    #[test]
    fn transport_errors_are_classified() {
        assert!(Error::network("refused", None).is_transport());
        assert!(Error::http_status(502, "bad gateway").is_transport());
        assert!(Error::malformed_response("missing response", None).is_transport());
        assert!(Error::application("quota").is_transport());
        assert!(!Error::Busy.is_transport());
        assert!(!Error::config("bad").is_transport());
    }

    #[test]
    fn busy_is_a_warning() {
        assert_eq!(Error::Busy.severity(), Severity::Warning);
        assert_eq!(Error::EmptyInput.severity(), Severity::Error);
        assert_eq!(Error::http_status(500, "").severity(), Severity::Error);
    }

    #[test]
    fn display_messages() {
        assert_eq!(Error::EmptyInput.to_string(), "Please enter a message");
        assert_eq!(
            Error::unsupported_file_type("exe").to_string(),
            "File type not supported: exe"
        );
        assert_eq!(
            Error::http_status(404, "not here").to_string(),
            "HTTP 404: not here"
        );
        assert_eq!(Error::http_status(503, "").to_string(), "HTTP 503");
        assert_eq!(Error::application("model offline").to_string(), "model offline");
        assert_eq!(Error::http_status(418, "").status_code(), Some(418));
        assert_eq!(Error::Busy.status_code(), None);
    }

    #[test]
    fn io_error_exposes_source() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(error::Error::source(&err).is_some());
    }
}
