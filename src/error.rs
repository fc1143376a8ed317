use std::fmt;

/// Errors raised by the mapping core.
///
/// The taxonomy is small and closed, so a plain enum is used instead of an
/// error-trait hierarchy. The REST layer maps each variant onto an HTTP
/// status via [`Error::http_status`]; this crate has no HTTP dependency.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A SCIM filter string could not be parsed. The position is a byte
    /// offset into the original filter string.
    InvalidFilter { position: usize, message: String },
    /// A value transformation was applied to a data type it does not
    /// support, or to a malformed value.
    UnsupportedConversion(String),
    /// The mapping configuration is invalid.
    Configuration(String),
    /// A bug in the mapping core.
    Internal(String),
}

impl Error {
    pub fn invalid_filter(position: usize, message: impl Into<String>) -> Self {
        Error::InvalidFilter {
            position,
            message: message.into(),
        }
    }

    /// The HTTP status the REST layer should surface for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidFilter { .. } => 400,
            Error::UnsupportedConversion(_) => 400,
            Error::Configuration(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// The SCIM `scimType` keyword for error responses, where one applies.
    pub fn scim_type(&self) -> Option<&'static str> {
        match self {
            Error::InvalidFilter { .. } => Some("invalidFilter"),
            Error::UnsupportedConversion(_) => Some("invalidValue"),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidFilter { position, message } => {
                write!(f, "Invalid filter at position {}: {}", position, message)
            }
            Error::UnsupportedConversion(e) => write!(f, "Unsupported conversion: {}", e),
            Error::Configuration(e) => write!(f, "Configuration error: {}", e),
            Error::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(Error::invalid_filter(3, "oops").http_status(), 400);
        assert_eq!(
            Error::UnsupportedConversion("bad".to_string()).http_status(),
            400
        );
        assert_eq!(Error::Configuration("bad".to_string()).http_status(), 500);
        assert_eq!(Error::Internal("bug".to_string()).http_status(), 500);
    }

    #[test]
    fn test_display_includes_position() {
        let err = Error::invalid_filter(12, "expected a value");
        assert_eq!(
            err.to_string(),
            "Invalid filter at position 12: expected a value"
        );
    }

    #[test]
    fn test_scim_type() {
        assert_eq!(
            Error::invalid_filter(0, "x").scim_type(),
            Some("invalidFilter")
        );
        assert_eq!(Error::Internal("x".to_string()).scim_type(), None);
    }
}
