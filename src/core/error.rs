//! Error handling for duecite
//!
//! This module provides the error types and user-friendly error reporting used
//! across the crate. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`DueError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **User input**: [`DueError::BibtexParse`], [`DueError::MissingPath`],
//!   [`DueError::UnsupportedFormat`], [`DueError::InvalidSource`]
//! - **Instrumentation**: [`DueError::EntryNotFound`], [`DueError::MemberNotFound`],
//!   [`DueError::UnitNotFound`], [`DueError::CollectorBusy`]. These are normally absorbed by
//!   [`never_fail`](crate::core::never_fail) rather than shown to users.
//! - **Fatal setup**: [`DueError::InjectionModuleFailed`]
//! - **Persistence and configuration**: [`DueError::SnapshotParse`],
//!   [`DueError::ConfigError`], [`DueError::UnsupportedOutput`]
//!
//! Common library errors convert automatically:
//! - [`std::io::Error`] → [`DueError::IoError`]
//! - [`serde_json::Error`] → [`DueError::JsonError`]
//! - [`toml::de::Error`] → [`DueError::TomlError`]
//! - [`semver::Error`] → [`DueError::SemverError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use duecite::core::{DueError, ErrorContext, user_friendly_error};
//!
//! let context = ErrorContext::new(DueError::MissingPath)
//!     .with_suggestion("Pass a path such as 'numpy' or 'scipy.cluster:linkage'");
//! context.display();
//!
//! let ctx = user_friendly_error(anyhow::anyhow!("Something went wrong"));
//! println!("{ctx}");
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for duecite operations
///
/// Each variant describes one failure mode and carries the values a user
/// needs to locate the problem (keys, paths, module names).
#[derive(Error, Debug)]
pub enum DueError {
    /// A BibTeX record did not start with a `@type{key,` header
    #[error("Failed to parse BibTeX entry header: {excerpt}")]
    BibtexParse {
        /// The first line of the offending record
        excerpt: String,
    },

    /// A citation was requested without a structural path
    #[error("Citation requires a path (e.g. 'package.module:function')")]
    MissingPath,

    /// A citation referenced an entry key that was never added
    #[error("Entry '{key}' is not known to the collector")]
    EntryNotFound {
        /// The key that was looked up
        key: String,
    },

    /// A reference file with an extension we cannot load
    #[error("Unsupported reference source format: {source_path}")]
    UnsupportedFormat {
        /// The path that was given
        source_path: String,
    },

    /// A reference source that is not a usable path
    #[error("Invalid reference source: {source_path}")]
    InvalidSource {
        /// The path that was given
        source_path: String,
    },

    /// An output name in the configuration that no writer exists for
    #[error("Unsupported output '{name}'")]
    UnsupportedOutput {
        /// The requested output name
        name: String,
    },

    /// A unit was requested that the runtime has no definition for
    #[error("Unit '{unit}' is not available")]
    UnitNotFound {
        /// The dotted unit name
        unit: String,
    },

    /// A member was addressed inside a unit that does not define it
    #[error("Member '{member}' not found in unit '{unit}'")]
    MemberNotFound {
        /// The dotted unit name
        unit: String,
        /// The member name within the unit
        member: String,
    },

    /// The live collector was already borrowed when a citation came in
    ///
    /// Happens when a wrapped member runs inside a closure holding the
    /// collector, e.g. one passed to `CollectorHandle::with`.
    #[error("Collector is busy, {operation} was dropped")]
    CollectorBusy {
        /// The operation that could not run
        operation: String,
    },

    /// A lazy registration module failed while registering its records
    ///
    /// This indicates a packaging defect in the registration module itself
    /// and is raised loudly instead of being absorbed.
    #[error("Failed to import injection module {module}: {reason}")]
    InjectionModuleFailed {
        /// The registration module name (e.g. `builtin::scipy`)
        module: String,
        /// The underlying failure
        reason: String,
    },

    /// A collector snapshot could not be read back
    #[error("Invalid collector snapshot {file}: {reason}")]
    SnapshotParse {
        /// The snapshot file
        file: String,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration file or environment value problem
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Semver parsing error
    #[error("Semver parsing error: {0}")]
    SemverError(#[from] semver::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for DueError {
    fn clone(&self) -> Self {
        match self {
            Self::BibtexParse {
                excerpt,
            } => Self::BibtexParse {
                excerpt: excerpt.clone(),
            },
            Self::MissingPath => Self::MissingPath,
            Self::EntryNotFound {
                key,
            } => Self::EntryNotFound {
                key: key.clone(),
            },
            Self::UnsupportedFormat {
                source_path,
            } => Self::UnsupportedFormat {
                source_path: source_path.clone(),
            },
            Self::InvalidSource {
                source_path,
            } => Self::InvalidSource {
                source_path: source_path.clone(),
            },
            Self::UnsupportedOutput {
                name,
            } => Self::UnsupportedOutput {
                name: name.clone(),
            },
            Self::UnitNotFound {
                unit,
            } => Self::UnitNotFound {
                unit: unit.clone(),
            },
            Self::MemberNotFound {
                unit,
                member,
            } => Self::MemberNotFound {
                unit: unit.clone(),
                member: member.clone(),
            },
            Self::CollectorBusy {
                operation,
            } => Self::CollectorBusy {
                operation: operation.clone(),
            },
            Self::InjectionModuleFailed {
                module,
                reason,
            } => Self::InjectionModuleFailed {
                module: module.clone(),
                reason: reason.clone(),
            },
            Self::SnapshotParse {
                file,
                reason,
            } => Self::SnapshotParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::SemverError(e) => Self::Other {
                message: format!("Semver parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context with user-friendly messages and suggestions
///
/// Wraps a [`DueError`] with optional details (shown in yellow) and an
/// actionable suggestion (shown in green).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DueError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`DueError`]
    #[must_use]
    pub const fn new(error: DueError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Known [`DueError`] variants get tailored suggestions; IO and TOML errors
/// are classified; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(due_error) = error.downcast_ref::<DueError>() {
        return create_error_context(due_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DueError::Other {
                    message: format!("{error}"),
                })
                .with_suggestion("Check that the file exists. Run your program with DUECITE_ENABLE=1 to produce a snapshot")
                .with_details("The collector snapshot or reference file could not be found");
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DueError::Other {
                    message: format!("{error}"),
                })
                .with_suggestion("Check file permissions and ownership")
                .with_details("duecite does not have permission to read or write the file");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(DueError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in ~/.duecite/config.toml");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DueError::Other {
        message,
    })
}

fn create_error_context(error: DueError) -> ErrorContext {
    match &error {
        DueError::BibtexParse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Each record must start with '@type{key,' e.g. '@article{smith2020,'")
            .with_details("Records without a citation key cannot be addressed by citations"),
        DueError::MissingPath => ErrorContext::new(error)
            .with_suggestion("Pass a path such as 'numpy' or 'scipy.cluster.hierarchy:linkage'"),
        DueError::EntryNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Add the entry first with 'duecite add <file.bib>' or pass the entry itself"),
        DueError::UnsupportedFormat {
            ..
        } => ErrorContext::new(error).with_suggestion("Only BibTeX (.bib) files can be loaded"),
        DueError::UnsupportedOutput {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Valid outputs are: stdout, stderr, json")
            .with_details("Outputs are read from DUECITE_OUTPUTS or the 'outputs' config key"),
        DueError::InjectionModuleFailed {
            ..
        } => ErrorContext::new(error)
            .with_details("An injection module failed while registering its citations")
            .with_suggestion("Set DUECITE_ALLOW_FAIL=1 to see the underlying error"),
        DueError::SnapshotParse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Delete the snapshot file and run your program again to regenerate it"),
        DueError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check ~/.duecite/config.toml and the DUECITE_* environment variables"),
        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DueError::MemberNotFound {
            unit: "scipy.cluster".to_string(),
            member: "linkage".to_string(),
        };
        assert_eq!(error.to_string(), "Member 'linkage' not found in unit 'scipy.cluster'");

        let error = DueError::InjectionModuleFailed {
            module: "builtin::numpy".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to import injection module builtin::numpy: boom");
    }

    #[test]
    fn test_error_context() {
        let ctx = ErrorContext::new(DueError::MissingPath)
            .with_suggestion("Give a path")
            .with_details("Paths are required");

        assert_eq!(ctx.suggestion, Some("Give a path".to_string()));
        assert_eq!(ctx.details, Some("Paths are required".to_string()));

        let display = format!("{ctx}");
        assert!(display.contains("Citation requires a path"));
        assert!(display.contains("Suggestion: Give a path"));
    }

    #[test]
    fn test_user_friendly_error_due_error() {
        let error = anyhow::Error::from(DueError::UnsupportedOutput {
            name: "pickle".to_string(),
        });
        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, DueError::UnsupportedOutput { .. }));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic_includes_chain() {
        let error = anyhow::anyhow!("root cause").context("while loading");
        let ctx = user_friendly_error(error);
        let message = ctx.error.to_string();
        assert!(message.contains("while loading"));
        assert!(message.contains("root cause"));
    }

    #[test]
    fn test_error_clone_converts_io_error() {
        let error = DueError::from(std::io::Error::other("disk gone"));
        match error.clone() {
            DueError::Other {
                message,
            } => assert!(message.contains("disk gone")),
            other => panic!("Expected Other, got {other:?}"),
        }
    }
}
