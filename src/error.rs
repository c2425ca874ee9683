//! Error types for the bean container.

use std::fmt;

/// Bean container errors
///
/// Only [`Circular`](DiError::Circular), [`DepthExceeded`](DiError::DepthExceeded)
/// and [`NullResult`](DiError::NullResult) ever reach a caller of
/// [`Container::get_bean`](crate::Container::get_bean). The remaining variants
/// describe construction failures; they are reported to observers and the log,
/// then absorbed into a "no instance" outcome that surfaces as `NullResult`.
///
/// # Examples
///
/// ```rust
/// use bean_ioc::DiError;
///
/// let circular = DiError::Circular(vec!["A", "B", "A"]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
///
/// let null = DiError::NullResult("app::Repo");
/// assert_eq!(null.to_string(), "app::Repo instantiation produced no result");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// Circular dependency detected (chain from first-pushed to the repeated type)
    Circular(Vec<&'static str>),
    /// Resolution completed without producing an instance
    NullResult(&'static str),
    /// No constructor with the requested parameter types
    MissingConstructor {
        bean: &'static str,
        params: Vec<&'static str>,
    },
    /// The no-argument constructor exists but is not accessible
    InaccessibleConstructor(&'static str),
    /// A constructor returned an error or panicked
    ConstructorFailed {
        bean: &'static str,
        reason: String,
    },
    /// A provider method returned an error or panicked
    ProviderFailed {
        bean: &'static str,
        method: &'static str,
        reason: String,
    },
    /// An injection point is final and cannot be written
    FinalField {
        bean: &'static str,
        field: &'static str,
    },
    /// Stored or produced value does not have the expected type
    TypeMismatch(&'static str),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
}

impl DiError {
    /// Whether this error terminates a resolution instead of being absorbed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DiError::Circular(_) | DiError::DepthExceeded(_))
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::NullResult(name) => write!(f, "{} instantiation produced no result", name),
            DiError::MissingConstructor { bean, params } => {
                write!(f, "No constructor ({}) found for {}", params.join(", "), bean)
            }
            DiError::InaccessibleConstructor(name) => {
                write!(f, "No-argument constructor of {} is not accessible", name)
            }
            DiError::ConstructorFailed { bean, reason } => {
                write!(f, "Constructor of {} failed: {}", bean, reason)
            }
            DiError::ProviderFailed { bean, method, reason } => {
                write!(f, "Provider {} for {} failed: {}", method, bean, reason)
            }
            DiError::FinalField { bean, field } => {
                write!(f, "Cannot inject final field {}.{}", bean, field)
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;

/// Boxed error returned by provider methods and constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
