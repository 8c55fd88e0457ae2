use backtrace::Backtrace;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for Artemis operations
///
/// Each kind names a category of failure so callers can match on it instead of
/// parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use artemis::errors::{ArtemisError, ErrorKind, ArtemisResult};
///
/// fn example() -> ArtemisResult<()> {
///     Err(ArtemisError::new("No field 'nme' on Person", ErrorKind::DynamicQueryError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A repository method could not be turned into a query: unknown field,
    /// malformed method name, wrong number of parameters, missing callback
    /// on an asynchronous find, or an unrecognized method.
    DynamicQueryError,
    /// Error mapping an entity to or from its document representation
    ObjectMappingError,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// No repository of the requested type was registered
    RepositoryNotFound,
    /// The store cannot execute this kind of literal query
    UnsupportedQuery,
    /// Error raised by the backing store
    BackendError,
    /// The store has already been closed
    StoreAlreadyClosed,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DynamicQueryError => write!(f, "Dynamic query error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::RepositoryNotFound => write!(f, "Repository not found"),
            ErrorKind::UnsupportedQuery => write!(f, "Unsupported query"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom Artemis error type.
///
/// `ArtemisError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured where it was created.
///
/// # Examples
///
/// ```rust,ignore
/// use artemis::errors::{ArtemisError, ErrorKind};
///
/// let cause = ArtemisError::new("connection refused", ErrorKind::BackendError);
/// let err = ArtemisError::new_with_cause("find failed", ErrorKind::BackendError, cause);
/// ```
#[derive(Clone)]
pub struct ArtemisError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<ArtemisError>>,
    backtrace: Arc<Mutex<Backtrace>>,
}

impl ArtemisError {
    /// Creates a new `ArtemisError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        ArtemisError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    /// Creates a new `ArtemisError` that wraps a cause.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: ArtemisError) -> Self {
        ArtemisError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&ArtemisError> {
        self.cause.as_deref()
    }
}

impl Display for ArtemisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for ArtemisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}\nCaused by: {:?}", self.error_kind, self.message, cause),
            None => {
                let mut backtrace = self.backtrace.lock();
                backtrace.resolve();
                write!(f, "{}: {}\n{:?}", self.error_kind, self.message, backtrace)
            }
        }
    }
}

impl Error for ArtemisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Artemis operations.
pub type ArtemisResult<T> = Result<T, ArtemisError>;

#[cfg(feature = "serde")]
impl serde::de::Error for ArtemisError {
    fn custom<T: Display>(msg: T) -> Self {
        ArtemisError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for ArtemisError {
    fn custom<T: Display>(msg: T) -> Self {
        ArtemisError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<regex::Error> for ArtemisError {
    fn from(err: regex::Error) -> Self {
        ArtemisError::new(
            &format!("Invalid pattern: {}", err),
            ErrorKind::DynamicQueryError,
        )
    }
}

impl From<std::fmt::Error> for ArtemisError {
    fn from(err: std::fmt::Error) -> Self {
        ArtemisError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<String> for ArtemisError {
    fn from(msg: String) -> Self {
        ArtemisError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for ArtemisError {
    fn from(msg: &str) -> Self {
        ArtemisError::new(msg, ErrorKind::InternalError)
    }
}
