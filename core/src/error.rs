use std::fmt;

/// The error type for awsfetch operations.
///
/// Every error carries a [`ErrorKind`], a human readable message, a list of
/// context entries (like `path: ~/.aws/config` or `profile: dev`) and an
/// optional source error.
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<String>,
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration file does not exist.
    ConfigNotFound,

    /// A configuration file exists but could not be parsed.
    ConfigInvalid,

    /// A configuration file exists but the requested profile is absent.
    ProfileNotFound,

    /// No usable credentials could be resolved or fetched.
    CredentialNotFound,

    /// An operation was attempted in a state that does not permit it.
    InvalidState,

    /// Request cannot be built or signed.
    RequestInvalid,

    /// A response body could not be decoded into a known shape.
    ResponseInvalid,

    /// The service answered with a classified error.
    Service,

    /// The service answered with a non-success status that could not be classified.
    HttpStatus,

    /// No response was obtained at all (connect failure, timeout, reset).
    Transport,

    /// Unexpected errors.
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "the source error has been set");

        self.source = Some(source.into());
        self
    }

    /// Add a context entry, for example `profile: dev`.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message without context.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all context entries attached to this error.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Returns the value of the first context entry starting with `key: `.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.iter().find_map(|c| {
            c.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix(": "))
        })
    }

    /// Borrow the source error, if any.
    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }
}

// Convenience constructors
impl Error {
    /// Create a config not found error
    pub fn config_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigNotFound, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a profile not found error
    pub fn profile_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProfileNotFound, message)
    }

    /// Create a credential not found error
    pub fn credential_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialNotFound, message)
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a response invalid error
    pub fn response_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseInvalid, message)
    }

    /// Create a service error
    pub fn service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, message)
    }

    /// Create an http status error
    pub fn http_status(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpStatus, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ {} }}", self.context.join(", "))?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use display format for alternate debug output, e.g. `{:#?}`.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            return de.finish();
        }

        write!(f, "{} ({})", self.message, self.kind)?;
        for ctx in &self.context {
            write!(f, "\n    {ctx}")?;
        }
        if let Some(source) = &self.source {
            write!(f, "\n\nSource:\n    {source:#}")?;
        }

        Ok(())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConfigNotFound => write!(f, "config not found"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::ProfileNotFound => write!(f, "profile not found"),
            ErrorKind::CredentialNotFound => write!(f, "credentials not found"),
            ErrorKind::InvalidState => write!(f, "invalid state"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::ResponseInvalid => write!(f, "invalid response"),
            ErrorKind::Service => write!(f, "service error"),
            ErrorKind::HttpStatus => write!(f, "http error"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref())
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
