//! Exit codes of `graphql-paginate`.
//!
//! Scripts and CI jobs can tell a document problem apart from a broken
//! project setup by the code alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every document compiled
    Success = 0,
    /// At least one document was left as authored
    DocumentErrors = 1,
    /// Missing or invalid config file
    ConfigError = 2,
    /// Schema could not be read, parsed or validated
    SchemaError = 3,
    /// File read or write failure
    IoError = 4,
    /// A document file is not valid GraphQL
    ParseError = 5,
}

impl ExitCode {
    /// Exit the process with this exit code.
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::DocumentErrors => write!(f, "document errors"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::SchemaError => write!(f, "schema error"),
            Self::IoError => write!(f, "I/O error"),
            Self::ParseError => write!(f, "parse error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::DocumentErrors.code(), 1);
        assert_eq!(ExitCode::ConfigError.code(), 2);
        assert_eq!(ExitCode::SchemaError.code(), 3);
        assert_eq!(ExitCode::IoError.code(), 4);
        assert_eq!(ExitCode::ParseError.code(), 5);
        assert_eq!(ExitCode::SchemaError.to_string(), "schema error");
    }
}
